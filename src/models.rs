//! Entity types stored in the transport catalogue.
//!
//! Stops and routes live in vector arenas owned by the catalogue; the id
//! newtypes below are dense positions into those arenas and stay valid for
//! the catalogue's whole lifetime.

use crate::geo::Coordinates;

/// Dense index of a stop in the catalogue arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(pub usize);

/// Dense index of a route in the catalogue arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub usize);

/// Traversal mode of a route.
///
/// LINEAR routes are ridden out and back; CIRCLE routes are ridden in the
/// given direction only and must start and end at the same stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteType {
    Linear,
    Circle,
}

/// A named geographic point. Names are unique; immutable once added.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name: String,
    pub coordinates: Coordinates,
}

/// A named ordered stop sequence. Stop references point into the owning
/// catalogue's arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub name: String,
    pub route_type: RouteType,
    pub stops: Vec<StopId>,
}

/// Route statistics computed on demand by the catalogue.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteInfo {
    pub name: String,
    pub route_type: RouteType,
    pub stop_count: usize,
    pub unique_stop_count: usize,
    pub route_length: u32,
    pub curvature: f64,
}
