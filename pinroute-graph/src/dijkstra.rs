//! Single-source shortest path over a neighbor graph
//!
//! Standard Dijkstra with a binary heap and lazy deletion: a node may sit in
//! the heap several times with stale distances, and every pop of an already
//! settled node is skipped. The search stops as soon as the destination is
//! settled.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::debug;
use pinroute_common::{Error, Result};

use crate::graph::Graph;
use crate::model::RouteResult;

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    distance: f64,
    node: usize,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}

#[derive(Debug, Default)]
struct SearchStats {
    pops: usize,
    stale_pops: usize,
    settled: usize,
    relaxations: usize,
}

/// Shortest path between two location ids in `graph`
///
/// Returns [`Error::UnknownLocation`] when an id is not a node. An unreachable
/// destination is not an error: see [`RouteResult`].
pub fn shortest_path(graph: &Graph<'_>, source_id: &str, destination_id: &str) -> Result<RouteResult> {
    let known = || graph.locations().iter().map(|loc| loc.id());
    let source = graph
        .index_of(source_id)
        .ok_or_else(|| Error::unknown_location(source_id, known()))?;
    let destination = graph
        .index_of(destination_id)
        .ok_or_else(|| Error::unknown_location(destination_id, known()))?;

    Ok(dijkstra(graph, source, destination))
}

/// Dijkstra between two node indices
pub(crate) fn dijkstra(graph: &Graph<'_>, source: usize, destination: usize) -> RouteResult {
    let n = graph.len();
    let mut distance = vec![f64::INFINITY; n];
    let mut predecessor: Vec<Option<usize>> = vec![None; n];
    let mut settled = vec![false; n];
    let mut stats = SearchStats::default();

    let mut heap = BinaryHeap::new();
    distance[source] = 0.0;
    heap.push(QueueEntry {
        distance: 0.0,
        node: source,
    });

    while let Some(QueueEntry { node, .. }) = heap.pop() {
        stats.pops += 1;
        if settled[node] {
            stats.stale_pops += 1;
            continue;
        }
        settled[node] = true;
        stats.settled += 1;

        if node == destination {
            break;
        }

        for edge in graph.edges(node) {
            let neighbor = edge.target();
            if settled[neighbor] {
                continue;
            }

            let candidate = distance[node] + edge.distance_km();
            if candidate < distance[neighbor] {
                distance[neighbor] = candidate;
                predecessor[neighbor] = Some(node);
                heap.push(QueueEntry {
                    distance: candidate,
                    node: neighbor,
                });
                stats.relaxations += 1;
            }
        }
    }

    debug!(
        "Dijkstra {} -> {}: settled {}/{} nodes, {} relaxations, {} heap pops ({} stale)",
        graph.location(source).id(),
        graph.location(destination).id(),
        stats.settled,
        n,
        stats.relaxations,
        stats.pops,
        stats.stale_pops
    );

    // Walk predecessors back from the destination
    let mut path = vec![destination];
    let mut step = destination;
    while let Some(prev) = predecessor[step] {
        path.push(prev);
        step = prev;
    }
    path.reverse();

    let path = path
        .into_iter()
        .map(|idx| graph.location(idx).clone())
        .collect();

    RouteResult::new(path, distance[destination])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Location;

    /// a -> b -> d is shorter than the direct a -> d edge
    fn diamond() -> Vec<Location> {
        vec![
            Location::new("a", 0.0, 0.0),
            Location::new("b", 0.0, 1.0),
            Location::new("c", 0.5, 3.0),
            Location::new("d", 0.0, 2.0),
        ]
    }

    fn ids(result: &RouteResult) -> Vec<&str> {
        result.path().iter().map(|loc| loc.id()).collect()
    }

    #[test]
    fn test_prefers_shorter_multi_hop_path() {
        let locations = diamond();
        let mut graph = Graph::new(&locations);
        graph.add_edge(0, 2); // a -> c
        graph.add_edge(2, 3); // c -> d
        graph.add_edge(0, 1); // a -> b
        graph.add_edge(1, 3); // b -> d

        let result = shortest_path(&graph, "a", "d").unwrap();
        assert_eq!(ids(&result), vec!["a", "b", "d"]);

        let expected = graph.edge_between("a", "b").unwrap().distance_km()
            + graph.edge_between("b", "d").unwrap().distance_km();
        assert_eq!(result.total_distance_km(), expected);
        assert_eq!(result.hops(), 2);
    }

    #[test]
    fn test_source_equals_destination() {
        let locations = diamond();
        let mut graph = Graph::new(&locations);
        graph.add_edge(0, 1);

        let result = shortest_path(&graph, "a", "a").unwrap();
        assert_eq!(ids(&result), vec!["a"]);
        assert_eq!(result.total_distance_km(), 0.0);
        assert!(result.is_reachable());
    }

    #[test]
    fn test_unreachable_returns_destination_only() {
        let locations = diamond();
        let mut graph = Graph::new(&locations);
        graph.add_edge(0, 1);
        graph.add_edge(3, 0); // only inbound to a, never out of a towards d

        let result = shortest_path(&graph, "a", "d").unwrap();
        assert_eq!(ids(&result), vec!["d"]);
        assert!(result.total_distance_km().is_infinite());
        assert!(!result.is_reachable());
    }

    #[test]
    fn test_respects_edge_direction() {
        let locations = diamond();
        let mut graph = Graph::new(&locations);
        graph.add_edge(1, 0); // b -> a only

        assert!(shortest_path(&graph, "b", "a").unwrap().is_reachable());
        assert!(!shortest_path(&graph, "a", "b").unwrap().is_reachable());
    }

    #[test]
    fn test_stale_entries_are_skipped() {
        // x settles first and reaches b the long way; y then improves b, leaving
        // a stale b entry that pops before z
        let locations = vec![
            Location::new("a", 0.0, 0.0),
            Location::new("x", -0.3, 0.0),
            Location::new("y", 0.0, 0.5),
            Location::new("b", 0.0, 1.0),
            Location::new("z", 0.0, 10.0),
        ];
        let mut graph = Graph::new(&locations);
        graph.add_edge(0, 1); // a -> x
        graph.add_edge(0, 2); // a -> y
        graph.add_edge(1, 3); // x -> b
        graph.add_edge(2, 3); // y -> b
        graph.add_edge(3, 4); // b -> z

        let result = shortest_path(&graph, "a", "z").unwrap();
        assert_eq!(ids(&result), vec!["a", "y", "b", "z"]);

        let expected: f64 = result
            .path()
            .windows(2)
            .map(|w| graph.edge_between(w[0].id(), w[1].id()).unwrap().distance_km())
            .sum();
        assert!((result.total_distance_km() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let locations = diamond();
        let graph = Graph::new(&locations);

        let err = shortest_path(&graph, "zz", "a").unwrap_err();
        assert!(matches!(err, Error::UnknownLocation { ref id, .. } if id == "zz"));

        let err = shortest_path(&graph, "a", "e").unwrap_err();
        assert!(matches!(err, Error::UnknownLocation { ref id, .. } if id == "e"));
    }

    #[test]
    fn test_queue_entry_orders_as_min_heap() {
        let mut heap = BinaryHeap::new();
        for (distance, node) in [(3.0, 0), (1.0, 1), (2.0, 2), (1.0, 3)] {
            heap.push(QueueEntry { distance, node });
        }
        let order: Vec<usize> = std::iter::from_fn(|| heap.pop().map(|e| e.node)).collect();
        assert_eq!(order, vec![1, 3, 2, 0]);
    }
}
