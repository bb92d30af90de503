//! Transport catalogue query engine.
//!
//! Two-phase operation: `make_base` populates the catalogue from a JSON
//! document, preprocesses the transit router and persists everything as a
//! single protobuf blob; `process_requests` restores that blob and answers
//! stat requests (route statistics, buses per stop, an SVG map, fastest
//! routes) without redoing any preprocessing.

pub mod catalogue;
pub mod errors;
pub mod geo;
pub mod graph;
pub mod handler;
pub mod json_io;
pub mod map_renderer;
pub mod models;
pub mod router;
pub mod serialization;
pub mod svg;

#[cfg(test)]
mod round_trip_tests;
