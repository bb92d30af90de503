//! The external JSON request/response format.
//!
//! An input document carries up to five sections: `base_requests`,
//! `render_settings`, `routing_settings`, `serialization_settings` and
//! `stat_requests`. Every array element is validated on its own; elements
//! of unknown type or with missing/mistyped fields are skipped silently,
//! so newer request kinds pass through old binaries without breaking the
//! batch. Responses are emitted in request order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::catalogue::TransportCatalogue;
use crate::errors::Result;
use crate::map_renderer::{MapRenderer, RenderSettings};
use crate::router::{RoutingSettings, TransportRouter};
use crate::serialization::SerializeSettings;
use crate::svg::{Color, Point};

// ===========================================================================
// INPUT DOCUMENT
// ===========================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InputDocument {
    base_requests: Vec<Value>,
    render_settings: Option<Value>,
    routing_settings: Option<Value>,
    serialization_settings: Option<Value>,
    stat_requests: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum BaseRequest {
    Stop(StopBaseRequest),
    Bus(BusBaseRequest),
}

#[derive(Debug, Deserialize)]
struct StopBaseRequest {
    name: String,
    latitude: f64,
    longitude: f64,
    road_distances: BTreeMap<String, u32>,
}

#[derive(Debug, Deserialize)]
struct BusBaseRequest {
    name: String,
    is_roundtrip: bool,
    stops: Vec<String>,
}

/// The three accepted color spellings: a CSS name, `[r, g, b]`, or
/// `[r, g, b, a]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ColorSpec {
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl From<ColorSpec> for Color {
    fn from(spec: ColorSpec) -> Self {
        match spec {
            ColorSpec::Named(name) => Color::Named(name),
            ColorSpec::Rgb(r, g, b) => Color::Rgb(r, g, b),
            ColorSpec::Rgba(r, g, b, opacity) => Color::Rgba(r, g, b, opacity),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenderSettingsDoc {
    width: f64,
    height: f64,
    padding: f64,
    line_width: f64,
    stop_radius: f64,
    bus_label_font_size: u32,
    bus_label_offset: (f64, f64),
    stop_label_font_size: u32,
    stop_label_offset: (f64, f64),
    underlayer_color: Option<ColorSpec>,
    underlayer_width: f64,
    color_palette: Vec<ColorSpec>,
}

impl From<RenderSettingsDoc> for RenderSettings {
    fn from(doc: RenderSettingsDoc) -> Self {
        RenderSettings {
            size: Point::new(doc.width, doc.height),
            padding: doc.padding,
            line_width: doc.line_width,
            stop_radius: doc.stop_radius,
            bus_label_font_size: doc.bus_label_font_size,
            bus_label_offset: Point::new(doc.bus_label_offset.0, doc.bus_label_offset.1),
            stop_label_font_size: doc.stop_label_font_size,
            stop_label_offset: Point::new(doc.stop_label_offset.0, doc.stop_label_offset.1),
            underlayer_color: doc.underlayer_color.map(Color::from).unwrap_or_default(),
            underlayer_width: doc.underlayer_width,
            color_palette: doc.color_palette.into_iter().map(Color::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RoutingSettingsDoc {
    bus_wait_time: u32,
    /// km/h in the document; converted to m/min on intake.
    bus_velocity: f64,
}

#[derive(Debug, Deserialize)]
struct SerializationSettingsDoc {
    file: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum StatRequest {
    Bus { id: i64, name: String },
    Stop { id: i64, name: String },
    Map { id: i64 },
    Route { id: i64, from: String, to: String },
}

// ===========================================================================
// RESPONSES
// ===========================================================================

#[derive(Debug, Serialize)]
struct BusResponse {
    request_id: i64,
    curvature: f64,
    route_length: u32,
    stop_count: usize,
    unique_stop_count: usize,
}

#[derive(Debug, Serialize)]
struct StopResponse {
    request_id: i64,
    buses: Vec<String>,
}

#[derive(Debug, Serialize)]
struct MapResponse {
    request_id: i64,
    map: String,
}

#[derive(Debug, Serialize)]
struct RouteResponse {
    request_id: i64,
    total_time: f64,
    items: Vec<RouteItem>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum RouteItem {
    Wait { stop_name: String, time: u32 },
    Bus { bus: String, span_count: u32, time: f64 },
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    request_id: i64,
    error_message: String,
}

impl ErrorResponse {
    fn not_found(request_id: i64) -> Value {
        to_value(ErrorResponse {
            request_id,
            error_message: "not found".to_string(),
        })
    }
}

fn to_value(response: impl Serialize) -> Value {
    serde_json::to_value(response).unwrap_or(Value::Null)
}

// ===========================================================================
// READER
// ===========================================================================

/// A parsed input document plus the dispatch of its stat requests.
pub struct JsonIO {
    doc: InputDocument,
}

impl JsonIO {
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        let doc = serde_json::from_reader(reader)?;
        Ok(Self { doc })
    }

    pub fn from_str(data: &str) -> Result<Self> {
        let doc = serde_json::from_str(data)?;
        Ok(Self { doc })
    }

    /// Populates the catalogue from `base_requests`: stops first, then
    /// routes, then road distances, so later passes only reference stops
    /// that already exist.
    pub fn load_data(&self, catalogue: &mut TransportCatalogue) -> Result<()> {
        let requests: Vec<Option<BaseRequest>> = self
            .doc
            .base_requests
            .iter()
            .map(|value| serde_json::from_value(value.clone()).ok())
            .collect();

        for request in requests.iter().flatten() {
            if let BaseRequest::Stop(stop) = request {
                catalogue.add_stop(
                    &stop.name,
                    crate::geo::Coordinates::new(stop.latitude, stop.longitude),
                );
            }
        }
        for request in requests.iter().flatten() {
            if let BaseRequest::Bus(bus) = request {
                let route_type = if bus.is_roundtrip {
                    crate::models::RouteType::Circle
                } else {
                    crate::models::RouteType::Linear
                };
                catalogue.add_route(&bus.name, route_type, &bus.stops)?;
            }
        }
        for request in requests.iter().flatten() {
            if let BaseRequest::Stop(stop) = request {
                for (to, &meters) in &stop.road_distances {
                    catalogue.set_distance(&stop.name, to, meters)?;
                }
            }
        }
        Ok(())
    }

    pub fn render_settings(&self) -> Option<RenderSettings> {
        let value = self.doc.render_settings.clone()?;
        serde_json::from_value::<RenderSettingsDoc>(value)
            .ok()
            .map(RenderSettings::from)
    }

    pub fn routing_settings(&self) -> Option<RoutingSettings> {
        let value = self.doc.routing_settings.clone()?;
        serde_json::from_value::<RoutingSettingsDoc>(value)
            .ok()
            .map(|doc| RoutingSettings::from_external(doc.bus_wait_time, doc.bus_velocity))
    }

    pub fn serialize_settings(&self) -> Option<SerializeSettings> {
        let value = self.doc.serialization_settings.clone()?;
        serde_json::from_value::<SerializationSettingsDoc>(value)
            .ok()
            .map(|doc| SerializeSettings { path: doc.file })
    }

    /// Answers every recognizable stat request, in input order. Lookup
    /// misses become `{request_id, error_message: "not found"}`.
    pub fn answer_requests(
        &self,
        catalogue: &TransportCatalogue,
        render_settings: &RenderSettings,
        router: &TransportRouter,
    ) -> Vec<Value> {
        self.doc
            .stat_requests
            .iter()
            .filter_map(|value| serde_json::from_value::<StatRequest>(value.clone()).ok())
            .map(|request| answer_request(request, catalogue, render_settings, router))
            .collect()
    }
}

fn answer_request(
    request: StatRequest,
    catalogue: &TransportCatalogue,
    render_settings: &RenderSettings,
    router: &TransportRouter,
) -> Value {
    match request {
        StatRequest::Bus { id, name } => match catalogue.get_route_info(&name) {
            Ok(info) => to_value(BusResponse {
                request_id: id,
                curvature: info.curvature,
                route_length: info.route_length,
                stop_count: info.stop_count,
                unique_stop_count: info.unique_stop_count,
            }),
            Err(_) => ErrorResponse::not_found(id),
        },
        StatRequest::Stop { id, name } => match catalogue.get_buses_on_stop(&name) {
            Ok(buses) => to_value(StopResponse {
                request_id: id,
                buses: buses.into_iter().map(str::to_string).collect(),
            }),
            Err(_) => ErrorResponse::not_found(id),
        },
        StatRequest::Map { id } => {
            let renderer = MapRenderer::new(render_settings.clone());
            to_value(MapResponse {
                request_id: id,
                map: renderer.render_map(catalogue).render(),
            })
        }
        StatRequest::Route { id, from, to } => {
            match router.build_route(catalogue, &from, &to) {
                Ok(Some(edges)) => {
                    let wait_time = router.settings().wait_time;
                    let mut total_time = 0.0;
                    let mut items = Vec::with_capacity(edges.len() * 2);
                    for edge in edges {
                        total_time += edge.total_time;
                        items.push(RouteItem::Wait {
                            stop_name: edge.stop_from,
                            time: wait_time,
                        });
                        items.push(RouteItem::Bus {
                            bus: edge.bus_name,
                            span_count: edge.span_count,
                            time: edge.total_time - f64::from(wait_time),
                        });
                    }
                    to_value(RouteResponse {
                        request_id: id,
                        total_time,
                        items,
                    })
                }
                Ok(None) | Err(_) => ErrorResponse::not_found(id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::RoutingSettings;
    use serde_json::json;

    const INPUT: &str = r#"{
        "base_requests": [
            {"type": "Stop", "name": "A", "latitude": 55.0, "longitude": 37.0,
             "road_distances": {"B": 900}},
            {"type": "Stop", "name": "B", "latitude": 55.01, "longitude": 37.01,
             "road_distances": {}},
            {"type": "Bus", "name": "11", "is_roundtrip": false, "stops": ["A", "B"]},
            {"type": "Teleport", "name": "future tech"}
        ],
        "routing_settings": {"bus_wait_time": 6, "bus_velocity": 40},
        "serialization_settings": {"file": "base.db"},
        "stat_requests": [
            {"id": 1, "type": "Bus", "name": "11"},
            {"id": 2, "type": "Bus", "name": "ghost"},
            {"id": 3, "type": "Stop", "name": "B"},
            {"id": 4, "type": "Route", "from": "A", "to": "B"},
            {"id": 5, "type": "Quantum", "name": "??"}
        ]
    }"#;

    fn loaded() -> (JsonIO, TransportCatalogue) {
        let json = JsonIO::from_str(INPUT).unwrap();
        let mut catalogue = TransportCatalogue::new();
        json.load_data(&mut catalogue).unwrap();
        (json, catalogue)
    }

    #[test]
    fn loads_catalogue_and_settings() {
        let (json, catalogue) = loaded();
        assert_eq!(catalogue.stops().len(), 2);
        assert_eq!(catalogue.routes().len(), 1);
        assert_eq!(catalogue.get_distance("A", "B").unwrap(), 900);

        let routing = json.routing_settings().unwrap();
        assert_eq!(routing.wait_time, 6);
        assert!((routing.velocity - 40.0 * 1000.0 / 60.0).abs() < 1e-9);
        assert_eq!(
            json.serialize_settings().unwrap().path,
            PathBuf::from("base.db")
        );
        assert!(json.render_settings().is_none());
    }

    #[test]
    fn answers_follow_request_order_and_skip_unknown_types() {
        let (json, catalogue) = loaded();
        let router =
            TransportRouter::new(&catalogue, RoutingSettings::from_external(6, 40.0)).unwrap();
        let answers =
            json.answer_requests(&catalogue, &RenderSettings::default(), &router);

        // The Quantum request is dropped, everything else answers in order.
        assert_eq!(answers.len(), 4);
        assert_eq!(
            answers[0],
            json!({
                "request_id": 1,
                "curvature": catalogue.get_route_info("11").unwrap().curvature,
                "route_length": 1800,
                "stop_count": 3,
                "unique_stop_count": 2
            })
        );
        assert_eq!(
            answers[1],
            json!({"request_id": 2, "error_message": "not found"})
        );
        assert_eq!(answers[2], json!({"request_id": 3, "buses": ["11"]}));

        let route = &answers[3];
        assert_eq!(route["request_id"], 4);
        assert!((route["total_time"].as_f64().unwrap() - 7.35).abs() < 1e-9);
        let items = route["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], json!({"type": "Wait", "stop_name": "A", "time": 6}));
        assert_eq!(items[1]["type"], "Bus");
        assert_eq!(items[1]["bus"], "11");
        assert_eq!(items[1]["span_count"], 1);
        assert!((items[1]["time"].as_f64().unwrap() - 1.35).abs() < 1e-9);
    }

    #[test]
    fn color_spellings_deserialize_into_the_sum_type() {
        let doc: RenderSettingsDoc = serde_json::from_value(json!({
            "width": 600, "height": 400, "padding": 50,
            "underlayer_color": [255, 255, 255, 0.85],
            "color_palette": ["green", [255, 160, 0], [12, 13, 14, 0.5]]
        }))
        .unwrap();
        let settings = RenderSettings::from(doc);
        assert_eq!(settings.underlayer_color, Color::Rgba(255, 255, 255, 0.85));
        assert_eq!(
            settings.color_palette,
            vec![
                Color::Named("green".to_string()),
                Color::Rgb(255, 160, 0),
                Color::Rgba(12, 13, 14, 0.5)
            ]
        );
        // Unset fields fall back to defaults.
        assert_eq!(settings.line_width, 0.0);
    }

    #[test]
    fn stop_request_without_road_distances_is_skipped() {
        let json = JsonIO::from_str(
            r#"{"base_requests": [
                {"type": "Stop", "name": "A", "latitude": 55.0, "longitude": 37.0}
            ]}"#,
        )
        .unwrap();
        let mut catalogue = TransportCatalogue::new();
        json.load_data(&mut catalogue).unwrap();
        assert_eq!(catalogue.stops().len(), 0);
    }
}
