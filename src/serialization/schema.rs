// This module defines the binary schema for the persisted catalogue.
// It uses Protocol Buffers (via the `prost` crate) to keep the blob
// compact, cross-platform, and backwards compatible.
//
// LAYOUT:
// 1. Catalogue: stops, routes and distances. Stops and routes carry dense
//    integer ids (their arena positions); routes and distances reference
//    stops by id, never by name.
// 2. RenderSettings: plain values plus the color sum type as a oneof.
// 3. TransportRouter: routing settings, the ride graph (flat edge array +
//    per-vertex incidence lists), the vertex -> stop id table, and the
//    all-pairs shortest-path table stored row by row.

use prost::Message;

/// Bumped on any incompatible change to the messages below.
pub const SCHEMA_VERSION: u32 = 1;

/// The root record written to disk. Sub-messages are optional: a blob may
/// carry only the catalogue.
#[derive(Clone, PartialEq, Message)]
pub struct TransportCatalogueBlob {
    #[prost(uint32, tag = "1")]
    pub schema_version: u32,

    #[prost(message, optional, tag = "2")]
    pub catalogue: Option<Catalogue>,

    #[prost(message, optional, tag = "3")]
    pub render_settings: Option<RenderSettings>,

    #[prost(message, optional, tag = "4")]
    pub router: Option<TransportRouter>,
}

// ===========================================================================
// 1. CATALOGUE
// ===========================================================================

#[derive(Clone, PartialEq, Message)]
pub struct Catalogue {
    #[prost(message, repeated, tag = "1")]
    pub stops: Vec<Stop>,

    #[prost(message, repeated, tag = "2")]
    pub routes: Vec<Route>,

    #[prost(message, repeated, tag = "3")]
    pub distances: Vec<Distance>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Stop {
    /// Dense id; equals the stop's position in the catalogue arena.
    #[prost(uint32, tag = "1")]
    pub id: u32,

    #[prost(string, tag = "2")]
    pub name: String,

    /// Latitude in degrees (WGS84).
    #[prost(double, tag = "3")]
    pub lat: f64,

    /// Longitude in degrees (WGS84).
    #[prost(double, tag = "4")]
    pub lng: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, prost::Enumeration)]
#[repr(i32)]
pub enum RouteType {
    Unknown = 0,
    Linear = 1,
    Circle = 2,
}

#[derive(Clone, PartialEq, Message)]
pub struct Route {
    /// Dense id; equals the route's position in the catalogue arena.
    #[prost(uint32, tag = "1")]
    pub id: u32,

    #[prost(string, tag = "2")]
    pub name: String,

    #[prost(enumeration = "RouteType", tag = "3")]
    pub route_type: i32,

    /// The stop sequence as ids into `Catalogue.stops`.
    #[prost(uint32, repeated, tag = "4")]
    pub stop_ids: Vec<u32>,
}

/// A directed road distance. Only the forward direction is stored; the
/// reverse fallback is query-time behavior, not data.
#[derive(Clone, PartialEq, Message)]
pub struct Distance {
    #[prost(uint32, tag = "1")]
    pub from_id: u32,

    #[prost(uint32, tag = "2")]
    pub to_id: u32,

    #[prost(uint32, tag = "3")]
    pub meters: u32,
}

// ===========================================================================
// 2. RENDER SETTINGS
// ===========================================================================

#[derive(Clone, PartialEq, Message)]
pub struct Point {
    #[prost(double, tag = "1")]
    pub x: f64,

    #[prost(double, tag = "2")]
    pub y: f64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Rgb {
    #[prost(uint32, tag = "1")]
    pub r: u32,

    #[prost(uint32, tag = "2")]
    pub g: u32,

    #[prost(uint32, tag = "3")]
    pub b: u32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Rgba {
    #[prost(uint32, tag = "1")]
    pub r: u32,

    #[prost(uint32, tag = "2")]
    pub g: u32,

    #[prost(uint32, tag = "3")]
    pub b: u32,

    #[prost(double, tag = "4")]
    pub opacity: f64,
}

/// The color sum type. An unset variant is the "none" color.
#[derive(Clone, PartialEq, Message)]
pub struct Color {
    #[prost(oneof = "ColorVariant", tags = "1, 2, 3")]
    pub variant: Option<ColorVariant>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum ColorVariant {
    #[prost(string, tag = "1")]
    Named(String),
    #[prost(message, tag = "2")]
    Rgb(Rgb),
    #[prost(message, tag = "3")]
    Rgba(Rgba),
}

#[derive(Clone, PartialEq, Message)]
pub struct RenderSettings {
    #[prost(message, optional, tag = "1")]
    pub size: Option<Point>,

    #[prost(double, tag = "2")]
    pub padding: f64,

    #[prost(double, tag = "3")]
    pub line_width: f64,

    #[prost(double, tag = "4")]
    pub stop_radius: f64,

    #[prost(uint32, tag = "5")]
    pub bus_label_font_size: u32,

    #[prost(message, optional, tag = "6")]
    pub bus_label_offset: Option<Point>,

    #[prost(uint32, tag = "7")]
    pub stop_label_font_size: u32,

    #[prost(message, optional, tag = "8")]
    pub stop_label_offset: Option<Point>,

    #[prost(message, optional, tag = "9")]
    pub underlayer_color: Option<Color>,

    #[prost(double, tag = "10")]
    pub underlayer_width: f64,

    #[prost(message, repeated, tag = "11")]
    pub color_palette: Vec<Color>,
}

// ===========================================================================
// 3. TRANSPORT ROUTER
// ===========================================================================

#[derive(Clone, PartialEq, Message)]
pub struct RoutingSettings {
    /// Boarding wait in minutes.
    #[prost(uint32, tag = "1")]
    pub wait_time: u32,

    /// Velocity in meters per minute (already converted from km/h).
    #[prost(double, tag = "2")]
    pub velocity: f64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Edge {
    #[prost(uint32, tag = "1")]
    pub from: u32,

    #[prost(uint32, tag = "2")]
    pub to: u32,

    /// Route id of the bus ridden on this edge.
    #[prost(uint32, tag = "3")]
    pub bus_id: u32,

    #[prost(uint32, tag = "4")]
    pub span_count: u32,

    /// Minutes, boarding wait included.
    #[prost(double, tag = "5")]
    pub total_time: f64,
}

#[derive(Clone, PartialEq, Message)]
pub struct IncidenceList {
    #[prost(uint32, repeated, tag = "1")]
    pub edge_ids: Vec<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Graph {
    /// Flat array of all edges; `IncidenceList`s point into it.
    #[prost(message, repeated, tag = "1")]
    pub edges: Vec<Edge>,

    /// Outgoing edge ids per vertex, indexed by vertex id.
    #[prost(message, repeated, tag = "2")]
    pub incidence_lists: Vec<IncidenceList>,
}

/// One reachable entry of the all-pairs table.
#[derive(Clone, PartialEq, Message)]
pub struct RouteInternalData {
    #[prost(double, tag = "1")]
    pub total_time: f64,

    /// Predecessor edge on the shortest path; unset at the source vertex.
    #[prost(uint32, optional, tag = "2")]
    pub prev_edge: Option<u32>,
}

/// An entry that may be absent (target unreachable from the row's source).
#[derive(Clone, PartialEq, Message)]
pub struct OptionalRouteInternalData {
    #[prost(message, optional, tag = "1")]
    pub data: Option<RouteInternalData>,
}

/// One row of the V x V table: every target for a single source vertex.
#[derive(Clone, PartialEq, Message)]
pub struct RoutesInternalDataRow {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<OptionalRouteInternalData>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TransportRouter {
    #[prost(message, optional, tag = "1")]
    pub settings: Option<RoutingSettings>,

    #[prost(message, optional, tag = "2")]
    pub graph: Option<Graph>,

    /// Stop id per vertex, indexed by vertex id.
    #[prost(uint32, repeated, tag = "3")]
    pub vertex_to_stop: Vec<u32>,

    /// Row-major shortest-path table; row index is the source vertex.
    #[prost(message, repeated, tag = "4")]
    pub routes_internal_data: Vec<RoutesInternalDataRow>,
}
