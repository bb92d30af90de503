//! The in-memory entity store: stop and route arenas, name indexes, the
//! buses-on-stop reverse index and directed road distances.
//!
//! Routes reference stops by [`StopId`] into the stop arena, so references
//! stay stable for the catalogue's lifetime and relocate freely with the
//! backing vectors.

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use std::collections::BTreeSet;

use crate::errors::{Error, Result};
use crate::geo::{self, Coordinates};
use crate::models::{Route, RouteId, RouteInfo, RouteType, Stop, StopId};

#[derive(Debug, Default)]
pub struct TransportCatalogue {
    stops: Vec<Stop>,
    stop_ids_by_name: HashMap<String, StopId>,
    routes: Vec<Route>,
    route_ids_by_name: HashMap<String, RouteId>,
    // StopId -> routes that traverse it, kept as a sorted id set; names are
    // ordered lexicographically at query time.
    buses_on_stops: HashMap<StopId, BTreeSet<RouteId>>,
    // Directed distances in meters, forward direction only as supplied.
    distances: HashMap<(StopId, StopId), u32>,
}

impl TransportCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stop to the arena. Callers must supply unique names.
    pub fn add_stop(&mut self, name: &str, coordinates: Coordinates) -> StopId {
        let id = StopId(self.stops.len());
        self.stops.push(Stop {
            name: name.to_string(),
            coordinates,
        });
        self.stop_ids_by_name.insert(name.to_string(), id);
        id
    }

    /// Resolves the stop names and appends a route to the arena.
    ///
    /// Fails with NotFound if any stop is absent; for circular routes the
    /// first and last stops must be equal.
    pub fn add_route<S: AsRef<str>>(
        &mut self,
        name: &str,
        route_type: RouteType,
        stop_names: &[S],
    ) -> Result<RouteId> {
        if route_type == RouteType::Circle {
            let first = stop_names.first().map(AsRef::as_ref);
            let last = stop_names.last().map(AsRef::as_ref);
            if first != last {
                return Err(Error::CircleEndpointsMismatch(name.to_string()));
            }
        }
        let mut stops = Vec::with_capacity(stop_names.len());
        for stop_name in stop_names {
            stops.push(self.find_stop(stop_name.as_ref())?);
        }

        let id = RouteId(self.routes.len());
        for &stop_id in &stops {
            self.buses_on_stops.entry(stop_id).or_default().insert(id);
        }
        self.routes.push(Route {
            name: name.to_string(),
            route_type,
            stops,
        });
        self.route_ids_by_name.insert(name.to_string(), id);
        Ok(id)
    }

    /// Records the road distance from one stop to another, forward
    /// direction only. Last write wins.
    pub fn set_distance(&mut self, from: &str, to: &str, meters: u32) -> Result<()> {
        let from = self.find_stop(from)?;
        let to = self.find_stop(to)?;
        self.distances.insert((from, to), meters);
        Ok(())
    }

    pub fn find_stop(&self, name: &str) -> Result<StopId> {
        self.stop_ids_by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::StopNotFound(name.to_string()))
    }

    pub fn find_route(&self, name: &str) -> Result<RouteId> {
        self.route_ids_by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::RouteNotFound(name.to_string()))
    }

    pub fn stop(&self, id: StopId) -> &Stop {
        &self.stops[id.0]
    }

    pub fn route(&self, id: RouteId) -> &Route {
        &self.routes[id.0]
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// True if at least one route traverses the stop.
    pub fn stop_is_served(&self, id: StopId) -> bool {
        self.buses_on_stops.contains_key(&id)
    }

    /// Directed distances as supplied via [`set_distance`], without the
    /// reverse fallback applied.
    pub fn distances(&self) -> &HashMap<(StopId, StopId), u32> {
        &self.distances
    }

    /// Road distance between two stops: the forward value if set, else the
    /// reverse value, else NotFound.
    pub fn distance_between(&self, from: StopId, to: StopId) -> Result<u32> {
        self.distances
            .get(&(from, to))
            .or_else(|| self.distances.get(&(to, from)))
            .copied()
            .ok_or_else(|| Error::DistanceNotFound {
                from: self.stop(from).name.clone(),
                to: self.stop(to).name.clone(),
            })
    }

    /// Name-based variant of [`distance_between`].
    pub fn get_distance(&self, from: &str, to: &str) -> Result<u32> {
        let from = self.find_stop(from)?;
        let to = self.find_stop(to)?;
        self.distance_between(from, to)
    }

    /// Route statistics: stop counts, road length over recorded distances
    /// and curvature against the great-circle length.
    pub fn get_route_info(&self, name: &str) -> Result<RouteInfo> {
        let route = self.route(self.find_route(name)?);

        let stop_count = match route.route_type {
            RouteType::Circle => route.stops.len(),
            RouteType::Linear if route.stops.is_empty() => 0,
            RouteType::Linear => route.stops.len() * 2 - 1,
        };
        let unique_stop_count = route.stops.iter().collect::<HashSet<_>>().len();

        let mut route_length = 0u32;
        let mut geographic_length = 0.0;
        for pair in route.stops.windows(2) {
            route_length += self.distance_between(pair[0], pair[1])?;
            geographic_length += geo::compute_distance(
                self.stop(pair[0]).coordinates,
                self.stop(pair[1]).coordinates,
            );
        }
        if route.route_type == RouteType::Linear {
            for pair in route.stops.windows(2) {
                route_length += self.distance_between(pair[1], pair[0])?;
            }
            geographic_length *= 2.0;
        }

        Ok(RouteInfo {
            name: route.name.clone(),
            route_type: route.route_type,
            stop_count,
            unique_stop_count,
            route_length,
            curvature: f64::from(route_length) / geographic_length,
        })
    }

    /// The names of all routes serving a stop, lexicographically sorted.
    /// A stop served by no route yields an empty list; an unknown stop is
    /// NotFound.
    pub fn get_buses_on_stop(&self, name: &str) -> Result<Vec<&str>> {
        let id = self.find_stop(name)?;
        let mut names: Vec<&str> = self
            .buses_on_stops
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&route_id| self.route(route_id).name.as_str())
            .collect();
        names.sort_unstable();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_stop_catalogue() -> TransportCatalogue {
        let mut catalogue = TransportCatalogue::new();
        catalogue.add_stop("Biryulyovo Zapadnoye", Coordinates::new(55.611087, 37.20829));
        catalogue.add_stop("Biryusinka", Coordinates::new(55.595884, 37.209755));
        catalogue.add_stop("Universam", Coordinates::new(55.632761, 37.333324));
        catalogue
    }

    #[test]
    fn circle_route_info() {
        let mut catalogue = three_stop_catalogue();
        catalogue
            .add_route(
                "256",
                RouteType::Circle,
                &["Biryulyovo Zapadnoye", "Biryusinka", "Universam", "Biryulyovo Zapadnoye"],
            )
            .unwrap();
        catalogue
            .set_distance("Biryulyovo Zapadnoye", "Biryusinka", 3900)
            .unwrap();
        catalogue.set_distance("Biryusinka", "Universam", 600).unwrap();
        catalogue
            .set_distance("Universam", "Biryulyovo Zapadnoye", 5600)
            .unwrap();

        let info = catalogue.get_route_info("256").unwrap();
        assert_eq!(info.stop_count, 4);
        assert_eq!(info.unique_stop_count, 3);
        assert_eq!(info.route_length, 10100);
        assert!((info.curvature - 0.5406338).abs() < 1e-6, "got {}", info.curvature);
    }

    #[test]
    fn linear_route_sums_both_directions_with_fallback() {
        let mut catalogue = three_stop_catalogue();
        catalogue
            .add_route("L", RouteType::Linear, &["Biryulyovo Zapadnoye", "Biryusinka"])
            .unwrap();
        // Forward only: the reverse traversal falls back to the same value.
        catalogue
            .set_distance("Biryulyovo Zapadnoye", "Biryusinka", 3900)
            .unwrap();
        let info = catalogue.get_route_info("L").unwrap();
        assert_eq!(info.stop_count, 3);
        assert_eq!(info.route_length, 7800);

        // An explicit reverse value takes precedence for its direction.
        catalogue
            .set_distance("Biryusinka", "Biryulyovo Zapadnoye", 4100)
            .unwrap();
        let info = catalogue.get_route_info("L").unwrap();
        assert_eq!(info.route_length, 8000);
    }

    #[test]
    fn distance_fallback_is_symmetric_until_overridden() {
        let mut catalogue = three_stop_catalogue();
        catalogue
            .set_distance("Biryusinka", "Universam", 600)
            .unwrap();
        assert_eq!(catalogue.get_distance("Biryusinka", "Universam").unwrap(), 600);
        assert_eq!(catalogue.get_distance("Universam", "Biryusinka").unwrap(), 600);

        catalogue
            .set_distance("Universam", "Biryusinka", 650)
            .unwrap();
        assert_eq!(catalogue.get_distance("Biryusinka", "Universam").unwrap(), 600);
        assert_eq!(catalogue.get_distance("Universam", "Biryusinka").unwrap(), 650);

        assert!(catalogue
            .get_distance("Biryulyovo Zapadnoye", "Universam")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn circle_route_with_mismatched_endpoints_is_rejected() {
        let mut catalogue = three_stop_catalogue();
        let err = catalogue
            .add_route("C1", RouteType::Circle, &["Biryusinka", "Universam"])
            .unwrap_err();
        assert!(matches!(err, Error::CircleEndpointsMismatch(_)));

        // LINEAR does not require equal endpoints, and tolerates repeats.
        catalogue
            .add_route("L", RouteType::Linear, &["Biryusinka", "Universam", "Biryusinka"])
            .unwrap();
        let info = catalogue.get_route_info("L").unwrap();
        assert_eq!(info.stop_count, 5);
        assert_eq!(info.unique_stop_count, 2);
    }

    #[test]
    fn route_with_unknown_stop_is_rejected() {
        let mut catalogue = three_stop_catalogue();
        let err = catalogue
            .add_route("X", RouteType::Linear, &["Biryusinka", "Nowhere"])
            .unwrap_err();
        assert!(matches!(err, Error::StopNotFound(_)));
    }

    #[test]
    fn buses_on_stop_are_sorted_by_name() {
        let mut catalogue = three_stop_catalogue();
        catalogue
            .add_route("828", RouteType::Linear, &["Biryusinka", "Universam"])
            .unwrap();
        catalogue
            .add_route("256", RouteType::Linear, &["Biryusinka", "Universam"])
            .unwrap();

        assert_eq!(catalogue.get_buses_on_stop("Biryusinka").unwrap(), ["256", "828"]);
        // In a route but visited twice counts once; not in any route is empty.
        assert_eq!(
            catalogue.get_buses_on_stop("Biryulyovo Zapadnoye").unwrap(),
            Vec::<&str>::new()
        );
        assert!(catalogue.get_buses_on_stop("unknown").unwrap_err().is_not_found());
    }
}
