//! Wait-then-ride transit routing over the catalogue.
//!
//! Construction walks every route once, emitting one edge per ordered stop
//! pair along the traversal (both traversals for LINEAR routes), then runs
//! Dijkstra from every vertex to fill the all-pairs shortest-path table.
//! The table keeps a predecessor edge per entry so queries only walk
//! back-pointers; the expensive preprocessing happens once and the whole
//! state round-trips through the binary codec.

use ahash::AHashMap as HashMap;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::catalogue::TransportCatalogue;
use crate::errors::{Error, Result};
use crate::graph::{DirectedWeightedGraph, Edge, EdgeId, RouteWeight, VertexId};
use crate::models::{RouteId, RouteType, StopId};

/// Conversion factor applied to external km/h velocities.
pub const KMH_TO_M_PER_MIN: f64 = 1000.0 / 60.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoutingSettings {
    /// Fixed boarding wait in minutes, paid once per ride.
    pub wait_time: u32,
    /// Bus velocity in meters per minute.
    pub velocity: f64,
}

impl RoutingSettings {
    /// Builds settings from the external document units (minutes, km/h).
    pub fn from_external(bus_wait_time: u32, bus_velocity_kmh: f64) -> Self {
        Self {
            wait_time: bus_wait_time,
            velocity: bus_velocity_kmh * KMH_TO_M_PER_MIN,
        }
    }
}

/// Shortest-path table entry for one (source, target) vertex pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RouteInternalData {
    pub total_time: f64,
    pub prev_edge: Option<EdgeId>,
}

/// Row-major V x V table; `None` means the target is unreachable.
pub type RoutesInternalData = Vec<Vec<Option<RouteInternalData>>>;

/// One leg of a computed route, ready for response building.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteEdge {
    pub bus_name: String,
    pub stop_from: String,
    pub stop_to: String,
    pub span_count: u32,
    /// Minutes, including the boarding wait.
    pub total_time: f64,
}

#[derive(Debug)]
pub struct TransportRouter {
    settings: RoutingSettings,
    vertex_to_stop: Vec<StopId>,
    vertex_by_stop: HashMap<StopId, VertexId>,
    graph: DirectedWeightedGraph,
    routes_internal_data: RoutesInternalData,
}

impl TransportRouter {
    /// Builds the graph and runs the all-pairs preprocessing. The catalogue
    /// is only borrowed here; the finished router is self-contained.
    pub fn new(catalogue: &TransportCatalogue, settings: RoutingSettings) -> Result<Self> {
        let vertex_to_stop: Vec<StopId> = (0..catalogue.stops().len()).map(StopId).collect();
        let vertex_by_stop: HashMap<StopId, VertexId> = vertex_to_stop
            .iter()
            .enumerate()
            .map(|(vertex, &stop)| (stop, vertex))
            .collect();

        let mut graph = DirectedWeightedGraph::new(vertex_to_stop.len());
        build_edges(catalogue, &settings, &vertex_by_stop, &mut graph)?;
        let routes_internal_data = compute_routes_internal_data(&graph);

        Ok(Self {
            settings,
            vertex_to_stop,
            vertex_by_stop,
            graph,
            routes_internal_data,
        })
    }

    /// Reassembles a router from deserialized state, skipping the
    /// preprocessing entirely.
    pub fn from_parts(
        settings: RoutingSettings,
        vertex_to_stop: Vec<StopId>,
        graph: DirectedWeightedGraph,
        routes_internal_data: RoutesInternalData,
    ) -> Self {
        let vertex_by_stop = vertex_to_stop
            .iter()
            .enumerate()
            .map(|(vertex, &stop)| (stop, vertex))
            .collect();
        Self {
            settings,
            vertex_to_stop,
            vertex_by_stop,
            graph,
            routes_internal_data,
        }
    }

    pub fn settings(&self) -> &RoutingSettings {
        &self.settings
    }

    pub fn graph(&self) -> &DirectedWeightedGraph {
        &self.graph
    }

    pub fn vertex_to_stop(&self) -> &[StopId] {
        &self.vertex_to_stop
    }

    pub fn routes_internal_data(&self) -> &RoutesInternalData {
        &self.routes_internal_data
    }

    /// Fastest route between two stops by name.
    ///
    /// `Ok(Some(vec![]))` for a self-route, `Ok(None)` when the target is
    /// unreachable, NotFound when either name is unknown.
    pub fn build_route(
        &self,
        catalogue: &TransportCatalogue,
        from: &str,
        to: &str,
    ) -> Result<Option<Vec<RouteEdge>>> {
        if from == to {
            return Ok(Some(Vec::new()));
        }
        let from_vertex = self.vertex_for(catalogue, from)?;
        let to_vertex = self.vertex_for(catalogue, to)?;

        let row = &self.routes_internal_data[from_vertex];
        if row[to_vertex].is_none() {
            return Ok(None);
        }

        // Walk the predecessor edges back to the source, then reverse.
        let mut edge_ids = Vec::new();
        let mut vertex = to_vertex;
        while let Some(entry) = row[vertex] {
            let Some(edge_id) = entry.prev_edge else { break };
            edge_ids.push(edge_id);
            vertex = self.graph.edge(edge_id).from;
        }
        edge_ids.reverse();

        let edges = edge_ids
            .into_iter()
            .map(|edge_id| {
                let edge = self.graph.edge(edge_id);
                RouteEdge {
                    bus_name: catalogue.route(edge.weight.bus).name.clone(),
                    stop_from: catalogue.stop(self.vertex_to_stop[edge.from]).name.clone(),
                    stop_to: catalogue.stop(self.vertex_to_stop[edge.to]).name.clone(),
                    span_count: edge.weight.span_count,
                    total_time: edge.weight.total_time,
                }
            })
            .collect();
        Ok(Some(edges))
    }

    fn vertex_for(&self, catalogue: &TransportCatalogue, name: &str) -> Result<VertexId> {
        self.vertex_by_stop
            .get(&catalogue.find_stop(name)?)
            .copied()
            .ok_or_else(|| Error::StopNotFound(name.to_string()))
    }
}

/// Emits the ride edges for every route. The inner time sum advances
/// incrementally with `j`, so a route of n stops costs O(n^2) total.
fn build_edges(
    catalogue: &TransportCatalogue,
    settings: &RoutingSettings,
    vertex_by_stop: &HashMap<StopId, VertexId>,
    graph: &mut DirectedWeightedGraph,
) -> Result<()> {
    for (index, route) in catalogue.routes().iter().enumerate() {
        let bus = RouteId(index);
        let stops = &route.stops;
        let n = stops.len();
        for i in 0..n.saturating_sub(1) {
            let mut time_forward = f64::from(settings.wait_time);
            let mut time_backward = f64::from(settings.wait_time);
            for j in i + 1..n {
                time_forward +=
                    f64::from(catalogue.distance_between(stops[j - 1], stops[j])?) / settings.velocity;
                graph.add_edge(Edge {
                    from: vertex_by_stop[&stops[i]],
                    to: vertex_by_stop[&stops[j]],
                    weight: RouteWeight {
                        bus,
                        span_count: (j - i) as u32,
                        total_time: time_forward,
                    },
                });

                // LINEAR routes are also walked from the last stop to the
                // first, with each hop measured in the reverse direction.
                if route.route_type == RouteType::Linear {
                    let i_back = n - 1 - i;
                    let j_back = n - 1 - j;
                    time_backward += f64::from(
                        catalogue.distance_between(stops[j_back + 1], stops[j_back])?,
                    ) / settings.velocity;
                    graph.add_edge(Edge {
                        from: vertex_by_stop[&stops[i_back]],
                        to: vertex_by_stop[&stops[j_back]],
                        weight: RouteWeight {
                            bus,
                            span_count: (j - i) as u32,
                            total_time: time_backward,
                        },
                    });
                }
            }
        }
    }
    Ok(())
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    vertex: VertexId,
}

impl Eq for State {}

// The priority queue depends on `Ord`. Explicitly implement the trait so
// the queue becomes a min-heap instead of a max-heap. Costs are finite and
// nonnegative, so `total_cmp` is a plain numeric order here; ties compare
// vertices to keep `PartialEq` and `Ord` consistent.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Dijkstra from every vertex over nonnegative `total_time` weights.
fn compute_routes_internal_data(graph: &DirectedWeightedGraph) -> RoutesInternalData {
    (0..graph.vertex_count())
        .map(|source| dijkstra(graph, source))
        .collect()
}

fn dijkstra(graph: &DirectedWeightedGraph, source: VertexId) -> Vec<Option<RouteInternalData>> {
    let mut data: Vec<Option<RouteInternalData>> = vec![None; graph.vertex_count()];
    data[source] = Some(RouteInternalData {
        total_time: 0.0,
        prev_edge: None,
    });

    let mut heap = BinaryHeap::new();
    heap.push(State {
        cost: 0.0,
        vertex: source,
    });

    while let Some(State { cost, vertex }) = heap.pop() {
        // Skip entries made stale by a later improvement.
        match data[vertex] {
            Some(entry) if cost > entry.total_time => continue,
            _ => {}
        }
        for edge_id in graph.incident_edges(vertex) {
            let edge = graph.edge(edge_id);
            let next_cost = cost + edge.weight.total_time;
            let improves = match data[edge.to] {
                None => true,
                Some(entry) => next_cost < entry.total_time,
            };
            if improves {
                data[edge.to] = Some(RouteInternalData {
                    total_time: next_cost,
                    prev_edge: Some(edge_id),
                });
                heap.push(State {
                    cost: next_cost,
                    vertex: edge.to,
                });
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinates;

    fn catalogue_with_stops(names: &[&str]) -> TransportCatalogue {
        let mut catalogue = TransportCatalogue::new();
        for (i, name) in names.iter().enumerate() {
            catalogue.add_stop(name, Coordinates::new(55.0 + i as f64 * 0.01, 37.0));
        }
        catalogue
    }

    #[test]
    fn single_hop_ride_time() {
        let mut catalogue = catalogue_with_stops(&["A", "B"]);
        catalogue.add_route("1", RouteType::Linear, &["A", "B"]).unwrap();
        catalogue.set_distance("A", "B", 900).unwrap();

        let router =
            TransportRouter::new(&catalogue, RoutingSettings::from_external(6, 40.0)).unwrap();
        let edges = router.build_route(&catalogue, "A", "B").unwrap().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].bus_name, "1");
        assert_eq!(edges[0].span_count, 1);
        // 900 m at 40 km/h is 1.35 min of riding on top of the 6 min wait.
        assert!((edges[0].total_time - 7.35).abs() < 1e-9, "got {}", edges[0].total_time);
    }

    #[test]
    fn self_route_is_empty() {
        let mut catalogue = catalogue_with_stops(&["A", "B"]);
        catalogue.add_route("1", RouteType::Linear, &["A", "B"]).unwrap();
        catalogue.set_distance("A", "B", 900).unwrap();

        let router =
            TransportRouter::new(&catalogue, RoutingSettings::from_external(6, 40.0)).unwrap();
        assert_eq!(router.build_route(&catalogue, "A", "A").unwrap(), Some(vec![]));
    }

    #[test]
    fn disconnected_target_is_unreachable() {
        let mut catalogue = catalogue_with_stops(&["A", "B", "C"]);
        catalogue.add_route("1", RouteType::Linear, &["A", "B"]).unwrap();
        catalogue.set_distance("A", "B", 900).unwrap();

        let router =
            TransportRouter::new(&catalogue, RoutingSettings::from_external(6, 40.0)).unwrap();
        assert_eq!(router.build_route(&catalogue, "A", "C").unwrap(), None);
        assert!(router
            .build_route(&catalogue, "A", "nowhere")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn transfer_beats_slow_direct_ride() {
        let mut catalogue = catalogue_with_stops(&["A", "B", "C"]);
        catalogue.add_route("slow", RouteType::Linear, &["A", "C"]).unwrap();
        catalogue.add_route("f1", RouteType::Linear, &["A", "B"]).unwrap();
        catalogue.add_route("f2", RouteType::Linear, &["B", "C"]).unwrap();
        catalogue.set_distance("A", "C", 10000).unwrap();
        catalogue.set_distance("A", "B", 1000).unwrap();
        catalogue.set_distance("B", "C", 1000).unwrap();

        // wait 1 min, 60 km/h = 1000 m/min: direct is 11 min, transfer 4.
        let router =
            TransportRouter::new(&catalogue, RoutingSettings::from_external(1, 60.0)).unwrap();
        let edges = router.build_route(&catalogue, "A", "C").unwrap().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].bus_name, "f1");
        assert_eq!(edges[1].bus_name, "f2");
        let total: f64 = edges.iter().map(|e| e.total_time).sum();
        assert!((total - 4.0).abs() < 1e-9, "got {total}");
    }

    #[test]
    fn one_boarding_spans_intermediate_stops() {
        let mut catalogue = catalogue_with_stops(&["A", "B", "C"]);
        catalogue
            .add_route("7", RouteType::Linear, &["A", "B", "C"])
            .unwrap();
        catalogue.set_distance("A", "B", 1000).unwrap();
        catalogue.set_distance("B", "C", 1000).unwrap();

        let router =
            TransportRouter::new(&catalogue, RoutingSettings::from_external(5, 60.0)).unwrap();
        let edges = router.build_route(&catalogue, "A", "C").unwrap().unwrap();
        // Staying on the bus avoids the second wait: one edge spanning two
        // segments, 5 + 2 minutes.
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].span_count, 2);
        assert!((edges[0].total_time - 7.0).abs() < 1e-9);
    }

    #[test]
    fn linear_route_rides_back_with_reverse_distances() {
        let mut catalogue = catalogue_with_stops(&["A", "B", "C"]);
        catalogue
            .add_route("7", RouteType::Linear, &["A", "B", "C"])
            .unwrap();
        catalogue.set_distance("A", "B", 1000).unwrap();
        catalogue.set_distance("B", "C", 1000).unwrap();
        // Explicit reverse value on one hop only; the other falls back.
        catalogue.set_distance("C", "B", 2000).unwrap();

        let router =
            TransportRouter::new(&catalogue, RoutingSettings::from_external(5, 60.0)).unwrap();
        let edges = router.build_route(&catalogue, "C", "A").unwrap().unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].span_count, 2);
        assert!((edges[0].total_time - 8.0).abs() < 1e-9, "got {}", edges[0].total_time);
    }
}
