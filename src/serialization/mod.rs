//! Binary persistence of the catalogue, render settings and router state.
//!
//! One length-delimited protobuf record per file, written and read with
//! buffered IO. Deserialization restores in dependency order: stops,
//! routes, distances, render settings, then the router (settings, graph,
//! vertex table, shortest-path table), which comes back already
//! initialized without re-running preprocessing.

pub mod schema;

use prost::Message;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::PathBuf;

use crate::catalogue::TransportCatalogue;
use crate::errors::{Error, Result};
use crate::graph::{self, DirectedWeightedGraph};
use crate::map_renderer::RenderSettings;
use crate::models::{RouteId, RouteType, StopId};
use crate::router::{RouteInternalData, RoutingSettings, TransportRouter};
use crate::svg::{Color, Point};

#[derive(Clone, Debug, PartialEq)]
pub struct SerializeSettings {
    pub path: PathBuf,
}

/// Writes and reads the persisted state. Holds nothing besides the target
/// path, so consecutive calls never see each other's state.
pub struct Serializator {
    settings: SerializeSettings,
}

impl Serializator {
    pub fn new(settings: SerializeSettings) -> Self {
        Self { settings }
    }

    /// Serializes the catalogue and, when present, render settings and
    /// router state into the configured file.
    pub fn serialize(
        &self,
        catalogue: &TransportCatalogue,
        render_settings: Option<&RenderSettings>,
        router: Option<&TransportRouter>,
    ) -> Result<()> {
        let blob = schema::TransportCatalogueBlob {
            schema_version: schema::SCHEMA_VERSION,
            catalogue: Some(save_catalogue(catalogue)),
            render_settings: render_settings.map(save_render_settings),
            router: router.map(save_router),
        };

        let io_err = |source| Error::Io {
            path: self.settings.path.clone(),
            source,
        };
        let file = File::create(&self.settings.path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&blob.encode_to_vec()).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
        Ok(())
    }

    /// Reads the configured file back into a catalogue plus whatever
    /// optional state the blob carries.
    pub fn deserialize(
        &self,
    ) -> Result<(TransportCatalogue, Option<RenderSettings>, Option<TransportRouter>)> {
        let io_err = |source| Error::Io {
            path: self.settings.path.clone(),
            source,
        };
        let file = File::open(&self.settings.path).map_err(io_err)?;
        let mut buffer = Vec::new();
        BufReader::new(file)
            .read_to_end(&mut buffer)
            .map_err(io_err)?;
        let blob = schema::TransportCatalogueBlob::decode(&buffer[..])?;

        if blob.schema_version != schema::SCHEMA_VERSION {
            return Err(Error::SchemaVersion {
                found: blob.schema_version,
                expected: schema::SCHEMA_VERSION,
            });
        }

        let mut catalogue = TransportCatalogue::new();
        if let Some(p_catalogue) = &blob.catalogue {
            load_catalogue(p_catalogue, &mut catalogue)?;
        }
        let render_settings = blob.render_settings.as_ref().map(load_render_settings);
        let router = match &blob.router {
            Some(p_router) => Some(load_router(p_router, &catalogue)?),
            None => None,
        };
        Ok((catalogue, render_settings, router))
    }
}

// ===========================================================================
// CATALOGUE
// ===========================================================================

fn save_catalogue(catalogue: &TransportCatalogue) -> schema::Catalogue {
    let stops = catalogue
        .stops()
        .iter()
        .enumerate()
        .map(|(id, stop)| schema::Stop {
            id: id as u32,
            name: stop.name.clone(),
            lat: stop.coordinates.lat,
            lng: stop.coordinates.lng,
        })
        .collect();

    let routes = catalogue
        .routes()
        .iter()
        .enumerate()
        .map(|(id, route)| schema::Route {
            id: id as u32,
            name: route.name.clone(),
            route_type: save_route_type(route.route_type),
            stop_ids: route.stops.iter().map(|stop| stop.0 as u32).collect(),
        })
        .collect();

    // Sorted by id pair so the same catalogue always yields the same blob.
    let mut distances: Vec<schema::Distance> = catalogue
        .distances()
        .iter()
        .map(|(&(from, to), &meters)| schema::Distance {
            from_id: from.0 as u32,
            to_id: to.0 as u32,
            meters,
        })
        .collect();
    distances.sort_unstable_by_key(|d| (d.from_id, d.to_id));

    schema::Catalogue {
        stops,
        routes,
        distances,
    }
}

fn load_catalogue(p_catalogue: &schema::Catalogue, catalogue: &mut TransportCatalogue) -> Result<()> {
    // Stops first: their blob order is the arena order every id refers to.
    for p_stop in &p_catalogue.stops {
        catalogue.add_stop(
            &p_stop.name,
            crate::geo::Coordinates::new(p_stop.lat, p_stop.lng),
        );
    }
    for p_route in &p_catalogue.routes {
        let route_type = match schema::RouteType::try_from(p_route.route_type) {
            Ok(schema::RouteType::Linear) => RouteType::Linear,
            Ok(schema::RouteType::Circle) => RouteType::Circle,
            _ => {
                return Err(Error::SchemaInvalid(format!(
                    "route '{}' has unknown type {}",
                    p_route.name, p_route.route_type
                )));
            }
        };
        let mut stop_names = Vec::with_capacity(p_route.stop_ids.len());
        for &stop_id in &p_route.stop_ids {
            stop_names.push(stop_name(p_catalogue, stop_id)?);
        }
        catalogue.add_route(&p_route.name, route_type, &stop_names)?;
    }

    for p_distance in &p_catalogue.distances {
        catalogue.set_distance(
            stop_name(p_catalogue, p_distance.from_id)?,
            stop_name(p_catalogue, p_distance.to_id)?,
            p_distance.meters,
        )?;
    }
    Ok(())
}

fn save_route_type(route_type: RouteType) -> i32 {
    let p_route_type = match route_type {
        RouteType::Linear => schema::RouteType::Linear,
        RouteType::Circle => schema::RouteType::Circle,
    };
    p_route_type as i32
}

fn stop_name(p_catalogue: &schema::Catalogue, id: u32) -> Result<&str> {
    p_catalogue
        .stops
        .get(id as usize)
        .map(|p_stop| p_stop.name.as_str())
        .ok_or_else(|| Error::SchemaInvalid(format!("stop id {id} out of range")))
}

// ===========================================================================
// RENDER SETTINGS
// ===========================================================================

fn save_point(point: Point) -> schema::Point {
    schema::Point {
        x: point.x,
        y: point.y,
    }
}

fn load_point(p_point: &Option<schema::Point>) -> Point {
    p_point
        .as_ref()
        .map(|p| Point::new(p.x, p.y))
        .unwrap_or_default()
}

fn save_color(color: &Color) -> schema::Color {
    let variant = match color {
        Color::None => None,
        Color::Named(name) => Some(schema::ColorVariant::Named(name.clone())),
        Color::Rgb(r, g, b) => Some(schema::ColorVariant::Rgb(schema::Rgb {
            r: u32::from(*r),
            g: u32::from(*g),
            b: u32::from(*b),
        })),
        Color::Rgba(r, g, b, opacity) => Some(schema::ColorVariant::Rgba(schema::Rgba {
            r: u32::from(*r),
            g: u32::from(*g),
            b: u32::from(*b),
            opacity: *opacity,
        })),
    };
    schema::Color { variant }
}

fn load_color(p_color: &schema::Color) -> Color {
    match &p_color.variant {
        None => Color::None,
        Some(schema::ColorVariant::Named(name)) => Color::Named(name.clone()),
        Some(schema::ColorVariant::Rgb(rgb)) => {
            Color::Rgb(rgb.r as u8, rgb.g as u8, rgb.b as u8)
        }
        Some(schema::ColorVariant::Rgba(rgba)) => {
            Color::Rgba(rgba.r as u8, rgba.g as u8, rgba.b as u8, rgba.opacity)
        }
    }
}

fn save_render_settings(settings: &RenderSettings) -> schema::RenderSettings {
    schema::RenderSettings {
        size: Some(save_point(settings.size)),
        padding: settings.padding,
        line_width: settings.line_width,
        stop_radius: settings.stop_radius,
        bus_label_font_size: settings.bus_label_font_size,
        bus_label_offset: Some(save_point(settings.bus_label_offset)),
        stop_label_font_size: settings.stop_label_font_size,
        stop_label_offset: Some(save_point(settings.stop_label_offset)),
        underlayer_color: Some(save_color(&settings.underlayer_color)),
        underlayer_width: settings.underlayer_width,
        color_palette: settings.color_palette.iter().map(save_color).collect(),
    }
}

fn load_render_settings(p_settings: &schema::RenderSettings) -> RenderSettings {
    RenderSettings {
        size: load_point(&p_settings.size),
        padding: p_settings.padding,
        line_width: p_settings.line_width,
        stop_radius: p_settings.stop_radius,
        bus_label_font_size: p_settings.bus_label_font_size,
        bus_label_offset: load_point(&p_settings.bus_label_offset),
        stop_label_font_size: p_settings.stop_label_font_size,
        stop_label_offset: load_point(&p_settings.stop_label_offset),
        underlayer_color: p_settings
            .underlayer_color
            .as_ref()
            .map(load_color)
            .unwrap_or_default(),
        underlayer_width: p_settings.underlayer_width,
        color_palette: p_settings.color_palette.iter().map(load_color).collect(),
    }
}

// ===========================================================================
// TRANSPORT ROUTER
// ===========================================================================

fn save_router(router: &TransportRouter) -> schema::TransportRouter {
    let settings = router.settings();
    let graph = router.graph();

    let edges = graph
        .edges()
        .iter()
        .map(|edge| schema::Edge {
            from: edge.from as u32,
            to: edge.to as u32,
            bus_id: edge.weight.bus.0 as u32,
            span_count: edge.weight.span_count,
            total_time: edge.weight.total_time,
        })
        .collect();
    let incidence_lists = graph
        .incidence_lists()
        .iter()
        .map(|list| schema::IncidenceList {
            edge_ids: list.iter().map(|&id| id as u32).collect(),
        })
        .collect();

    let routes_internal_data = router
        .routes_internal_data()
        .iter()
        .map(|row| schema::RoutesInternalDataRow {
            entries: row
                .iter()
                .map(|entry| schema::OptionalRouteInternalData {
                    data: entry.map(|data| schema::RouteInternalData {
                        total_time: data.total_time,
                        prev_edge: data.prev_edge.map(|edge| edge as u32),
                    }),
                })
                .collect(),
        })
        .collect();

    schema::TransportRouter {
        settings: Some(schema::RoutingSettings {
            wait_time: settings.wait_time,
            velocity: settings.velocity,
        }),
        graph: Some(schema::Graph {
            edges,
            incidence_lists,
        }),
        vertex_to_stop: router
            .vertex_to_stop()
            .iter()
            .map(|stop| stop.0 as u32)
            .collect(),
        routes_internal_data,
    }
}

fn load_router(
    p_router: &schema::TransportRouter,
    catalogue: &TransportCatalogue,
) -> Result<TransportRouter> {
    let p_settings = p_router
        .settings
        .as_ref()
        .ok_or_else(|| Error::SchemaInvalid("router blob without settings".to_string()))?;
    let settings = RoutingSettings {
        wait_time: p_settings.wait_time,
        velocity: p_settings.velocity,
    };

    let stop_count = catalogue.stops().len();
    let mut vertex_to_stop = Vec::with_capacity(p_router.vertex_to_stop.len());
    for &stop_id in &p_router.vertex_to_stop {
        if stop_id as usize >= stop_count {
            return Err(Error::SchemaInvalid(format!(
                "router references stop id {stop_id} out of range"
            )));
        }
        vertex_to_stop.push(StopId(stop_id as usize));
    }
    let vertex_count = vertex_to_stop.len();

    let p_graph = p_router
        .graph
        .as_ref()
        .ok_or_else(|| Error::SchemaInvalid("router blob without graph".to_string()))?;
    let route_count = catalogue.routes().len();
    let mut edges = Vec::with_capacity(p_graph.edges.len());
    for p_edge in &p_graph.edges {
        if p_edge.from as usize >= vertex_count || p_edge.to as usize >= vertex_count {
            return Err(Error::SchemaInvalid(format!(
                "graph edge {} -> {} out of vertex range",
                p_edge.from, p_edge.to
            )));
        }
        if p_edge.bus_id as usize >= route_count {
            return Err(Error::SchemaInvalid(format!(
                "graph edge references route id {} out of range",
                p_edge.bus_id
            )));
        }
        edges.push(graph::Edge {
            from: p_edge.from as usize,
            to: p_edge.to as usize,
            weight: graph::RouteWeight {
                bus: RouteId(p_edge.bus_id as usize),
                span_count: p_edge.span_count,
                total_time: p_edge.total_time,
            },
        });
    }
    if p_graph.incidence_lists.len() != vertex_count {
        return Err(Error::SchemaInvalid(format!(
            "graph has {} incidence lists for {} vertices",
            p_graph.incidence_lists.len(),
            vertex_count
        )));
    }
    let incidence_lists = p_graph
        .incidence_lists
        .iter()
        .map(|list| list.edge_ids.iter().map(|&id| id as usize).collect())
        .collect();
    let graph = DirectedWeightedGraph::from_parts(edges, incidence_lists);

    if p_router.routes_internal_data.len() != vertex_count {
        return Err(Error::SchemaInvalid(format!(
            "shortest-path table has {} rows for {} vertices",
            p_router.routes_internal_data.len(),
            vertex_count
        )));
    }
    let routes_internal_data = p_router
        .routes_internal_data
        .iter()
        .map(|row| {
            row.entries
                .iter()
                .map(|entry| {
                    entry.data.as_ref().map(|data| RouteInternalData {
                        total_time: data.total_time,
                        prev_edge: data.prev_edge.map(|edge| edge as usize),
                    })
                })
                .collect()
        })
        .collect();

    Ok(TransportRouter::from_parts(
        settings,
        vertex_to_stop,
        graph,
        routes_internal_data,
    ))
}
