//! Round-trip coverage for the binary codec: a populated catalogue, render
//! settings and a preprocessed router are serialized to a real file, read
//! back, and must answer every query exactly like the original.

use std::fs;
use std::path::PathBuf;

use crate::catalogue::TransportCatalogue;
use crate::errors::Error;
use crate::geo::Coordinates;
use crate::json_io::JsonIO;
use crate::map_renderer::RenderSettings;
use crate::models::RouteType;
use crate::router::{RoutingSettings, TransportRouter};
use crate::serialization::{schema, SerializeSettings, Serializator};
use crate::svg::{Color, Point};
use prost::Message;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

fn build_catalogue() -> TransportCatalogue {
    let mut catalogue = TransportCatalogue::new();
    catalogue.add_stop("Biryulyovo Zapadnoye", Coordinates::new(55.611087, 37.20829));
    catalogue.add_stop("Biryusinka", Coordinates::new(55.595884, 37.209755));
    catalogue.add_stop("Universam", Coordinates::new(55.632761, 37.333324));
    catalogue.add_stop("Prazhskaya", Coordinates::new(55.611717, 37.603831));
    catalogue
        .add_route(
            "256",
            RouteType::Circle,
            &["Biryulyovo Zapadnoye", "Biryusinka", "Universam", "Biryulyovo Zapadnoye"],
        )
        .unwrap();
    catalogue
        .add_route("828", RouteType::Linear, &["Biryusinka", "Universam"])
        .unwrap();
    catalogue
        .set_distance("Biryulyovo Zapadnoye", "Biryusinka", 3900)
        .unwrap();
    catalogue.set_distance("Biryusinka", "Universam", 600).unwrap();
    catalogue
        .set_distance("Universam", "Biryulyovo Zapadnoye", 5600)
        .unwrap();
    catalogue.set_distance("Universam", "Biryusinka", 1300).unwrap();
    catalogue
}

fn build_render_settings() -> RenderSettings {
    RenderSettings {
        size: Point::new(600.0, 400.0),
        padding: 50.0,
        line_width: 14.0,
        stop_radius: 5.0,
        bus_label_font_size: 20,
        bus_label_offset: Point::new(7.0, 15.0),
        stop_label_font_size: 18,
        stop_label_offset: Point::new(7.0, -3.0),
        underlayer_color: Color::Rgba(255, 255, 255, 0.85),
        underlayer_width: 3.0,
        color_palette: vec![
            Color::Named("green".to_string()),
            Color::Rgb(255, 160, 0),
            Color::Rgba(255, 0, 0, 0.5),
        ],
    }
}

#[test]
fn round_trip_preserves_entities_and_routing() {
    let path = temp_path("transport_catalogue_round_trip.db");
    let catalogue = build_catalogue();
    let render_settings = build_render_settings();
    let router =
        TransportRouter::new(&catalogue, RoutingSettings::from_external(6, 40.0)).unwrap();

    let serializator = Serializator::new(SerializeSettings { path: path.clone() });
    serializator
        .serialize(&catalogue, Some(&render_settings), Some(&router))
        .unwrap();
    let (restored, restored_render, restored_router) = serializator.deserialize().unwrap();
    fs::remove_file(&path).unwrap();

    // Stops and routes come back with identical names, coordinates, types
    // and stop sequences.
    assert_eq!(restored.stops(), catalogue.stops());
    assert_eq!(restored.routes(), catalogue.routes());
    assert_eq!(restored_render.as_ref(), Some(&render_settings));

    let stop_names: Vec<&str> = catalogue.stops().iter().map(|s| s.name.as_str()).collect();
    for from in &stop_names {
        for to in &stop_names {
            match (catalogue.get_distance(from, to), restored.get_distance(from, to)) {
                (Ok(a), Ok(b)) => assert_eq!(a, b, "distance {from} -> {to}"),
                (Err(a), Err(b)) => assert_eq!(a.is_not_found(), b.is_not_found()),
                (a, b) => panic!("distance {from} -> {to} diverged: {a:?} vs {b:?}"),
            }
        }
        assert_eq!(
            catalogue.get_buses_on_stop(from).unwrap(),
            restored.get_buses_on_stop(from).unwrap()
        );
    }
    for route in catalogue.routes() {
        assert_eq!(
            catalogue.get_route_info(&route.name).unwrap(),
            restored.get_route_info(&route.name).unwrap()
        );
    }

    // The restored router answers every pair bit-identically without
    // re-running preprocessing.
    let restored_router = restored_router.expect("router must round-trip");
    assert_eq!(restored_router.settings(), router.settings());
    for from in &stop_names {
        for to in &stop_names {
            assert_eq!(
                router.build_route(&catalogue, from, to).unwrap(),
                restored_router.build_route(&restored, from, to).unwrap(),
                "route {from} -> {to} diverged"
            );
        }
    }
}

#[test]
fn round_trip_preserves_stat_answers() {
    let path = temp_path("transport_catalogue_round_trip_answers.db");
    let catalogue = build_catalogue();
    let render_settings = build_render_settings();
    let router =
        TransportRouter::new(&catalogue, RoutingSettings::from_external(6, 40.0)).unwrap();

    let json = JsonIO::from_str(
        r#"{"stat_requests": [
            {"id": 1, "type": "Bus", "name": "256"},
            {"id": 2, "type": "Bus", "name": "828"},
            {"id": 3, "type": "Stop", "name": "Universam"},
            {"id": 4, "type": "Map"},
            {"id": 5, "type": "Route", "from": "Biryulyovo Zapadnoye", "to": "Universam"},
            {"id": 6, "type": "Route", "from": "Universam", "to": "Prazhskaya"}
        ]}"#,
    )
    .unwrap();
    let before = json.answer_requests(&catalogue, &render_settings, &router);

    let serializator = Serializator::new(SerializeSettings { path: path.clone() });
    serializator
        .serialize(&catalogue, Some(&render_settings), Some(&router))
        .unwrap();
    let (restored, restored_render, restored_router) = serializator.deserialize().unwrap();
    fs::remove_file(&path).unwrap();

    let after = json.answer_requests(
        &restored,
        &restored_render.unwrap(),
        &restored_router.unwrap(),
    );
    assert_eq!(before, after);

    // The disconnected stop reports "not found" on both sides.
    assert_eq!(
        before[5],
        serde_json::json!({"request_id": 6, "error_message": "not found"})
    );
}

#[test]
fn blob_may_omit_render_settings_and_router() {
    let path = temp_path("transport_catalogue_catalogue_only.db");
    let catalogue = build_catalogue();

    let serializator = Serializator::new(SerializeSettings { path: path.clone() });
    serializator.serialize(&catalogue, None, None).unwrap();
    let (restored, render_settings, router) = serializator.deserialize().unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(restored.stops(), catalogue.stops());
    assert!(render_settings.is_none());
    assert!(router.is_none());
}

#[test]
fn future_schema_version_is_rejected() {
    let path = temp_path("transport_catalogue_future_version.db");
    let blob = schema::TransportCatalogueBlob {
        schema_version: schema::SCHEMA_VERSION + 1,
        catalogue: None,
        render_settings: None,
        router: None,
    };
    fs::write(&path, blob.encode_to_vec()).unwrap();

    let serializator = Serializator::new(SerializeSettings { path: path.clone() });
    let err = serializator.deserialize().unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(err, Error::SchemaVersion { .. }));
}

#[test]
fn missing_blob_is_an_io_error() {
    let serializator = Serializator::new(SerializeSettings {
        path: temp_path("transport_catalogue_does_not_exist.db"),
    });
    assert!(matches!(serializator.deserialize().unwrap_err(), Error::Io { .. }));
}

#[test]
fn garbage_blob_is_a_schema_error() {
    let path = temp_path("transport_catalogue_garbage.db");
    fs::write(&path, b"definitely not a protobuf record").unwrap();

    let serializator = Serializator::new(SerializeSettings { path: path.clone() });
    let err = serializator.deserialize().unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(err, Error::Schema(_)));
}
