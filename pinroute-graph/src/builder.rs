//! Neighbor-graph construction
//!
//! Each location gets directed edges to its K nearest other locations. Two
//! interchangeable strategies produce the graph:
//!
//! - [`Strategy::Exhaustive`] ranks every other location by great-circle
//!   distance, O(N² log N).
//! - [`Strategy::Indexed`] asks a [`KdTree`] for candidates, ranked by flat
//!   Euclidean distance in degree space, then recomputes the great-circle
//!   weight of each kept edge.
//!
//! The two rankings agree for compact regions but can pick different top-K
//! sets where longitude degrees shrink (high latitudes) or across the
//! antimeridian. That divergence is kept as is; edge weights are always
//! great-circle distances either way.
//!
//! # Parallelism
//!
//! Per-location neighbor search runs on the rayon pool and only reads the
//! shared location slice and tree. Each task returns its own edge list; the
//! lists are merged into the [`Graph`] on the calling thread afterwards.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{info, log_enabled, trace, Level};
use pinroute_common::{Error, Result};
use rayon::prelude::*;
use serde::Serialize;

use crate::geo::distance_between;
use crate::graph::{Edge, Graph};
use crate::kdtree::KdTree;
use crate::model::Location;

/// Graph construction strategy, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Pairwise great-circle search over all locations
    Exhaustive,
    /// KD-tree accelerated search
    #[default]
    Indexed,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::Exhaustive, Strategy::Indexed];

    /// Build the K-nearest-neighbor graph over `locations`
    ///
    /// `neighbors` larger than `locations.len() - 1` is capped to all other
    /// locations; zero is rejected.
    pub fn build<'a>(self, locations: &'a [Location], neighbors: usize) -> Result<Graph<'a>> {
        match self {
            Strategy::Exhaustive => build_exhaustive(locations, neighbors),
            Strategy::Indexed => build_indexed(locations, neighbors),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Exhaustive => "exhaustive",
            Strategy::Indexed => "indexed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exhaustive" | "brute" | "brute-force" => Ok(Strategy::Exhaustive),
            "indexed" | "kdtree" | "kd-tree" => Ok(Strategy::Indexed),
            other => Err(format!(
                "unknown strategy '{other}' (expected 'exhaustive' or 'indexed')"
            )),
        }
    }
}

fn validate_neighbor_count(locations: &[Location], neighbors: usize) -> Result<()> {
    if neighbors == 0 {
        return Err(Error::InvalidNeighborCount {
            requested: neighbors,
            locations: locations.len(),
        });
    }
    Ok(())
}

/// Connect each location to its `neighbors` nearest by great-circle distance
///
/// Equal distances keep input order.
pub fn build_exhaustive(locations: &[Location], neighbors: usize) -> Result<Graph<'_>> {
    validate_neighbor_count(locations, neighbors)?;
    let start = Instant::now();

    let neighbor_lists: Vec<Vec<Edge>> = (0..locations.len())
        .into_par_iter()
        .map(|from| {
            let source = &locations[from];
            let mut ranked: Vec<(usize, f64)> = locations
                .iter()
                .enumerate()
                .filter(|&(to, _)| to != from)
                .map(|(to, target)| (to, distance_between(source, target)))
                .collect();

            // Stable sort: ties stay in input order
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
            ranked.truncate(neighbors);

            ranked
                .into_iter()
                .map(|(to, _)| Edge::between(locations, from, to))
                .collect()
        })
        .collect();

    let graph = Graph::from_neighbor_lists(locations, neighbor_lists);
    info!(
        "Exhaustive graph built in {:.3}s: {} nodes, {} edges (k={})",
        start.elapsed().as_secs_f64(),
        graph.len(),
        graph.edge_count(),
        neighbors
    );

    Ok(graph)
}

/// Connect each location to its `neighbors` nearest candidates from a KD-tree
///
/// A location whose query cannot be satisfied aborts the whole build with
/// [`Error::IndexQuery`].
pub fn build_indexed(locations: &[Location], neighbors: usize) -> Result<Graph<'_>> {
    validate_neighbor_count(locations, neighbors)?;
    let start = Instant::now();

    let tree = KdTree::build(locations);
    info!(
        "KD-tree built in {:.3}s: {} nodes, depth {}",
        start.elapsed().as_secs_f64(),
        tree.len(),
        tree.depth()
    );
    if log_enabled!(Level::Trace) {
        trace!("KD-tree layout:\n{}", tree.render());
    }

    let expected = neighbors.min(locations.len().saturating_sub(1));

    let neighbor_lists: Vec<Vec<Edge>> = (0..locations.len())
        .into_par_iter()
        .map(|from| {
            let source = &locations[from];
            // One extra slot in case the index hands the source back
            let found = tree
                .nearest(source, neighbors.saturating_add(1))
                .map_err(|e| Error::IndexQuery {
                    id: source.id().to_string(),
                    reason: e.to_string(),
                })?;

            let edges: Vec<Edge> = found
                .into_iter()
                .filter(|candidate| candidate.index != from)
                .take(neighbors)
                .map(|candidate| Edge::between(locations, from, candidate.index))
                .collect();

            if edges.len() < expected {
                return Err(Error::IndexQuery {
                    id: source.id().to_string(),
                    reason: format!(
                        "index returned {} of {} expected neighbors",
                        edges.len(),
                        expected
                    ),
                });
            }

            Ok(edges)
        })
        .collect::<Result<_>>()?;

    let graph = Graph::from_neighbor_lists(locations, neighbor_lists);
    info!(
        "Indexed graph built in {:.3}s: {} nodes, {} edges (k={})",
        start.elapsed().as_secs_f64(),
        graph.len(),
        graph.edge_count(),
        neighbors
    );

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::haversine_distance;

    fn unit_square() -> Vec<Location> {
        vec![
            Location::new("sw", 0.0, 0.0),
            Location::new("nw", 1.0, 0.0),
            Location::new("se", 0.0, 1.0),
            Location::new("ne", 1.0, 1.0),
        ]
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("exhaustive".parse::<Strategy>(), Ok(Strategy::Exhaustive));
        assert_eq!("Brute".parse::<Strategy>(), Ok(Strategy::Exhaustive));
        assert_eq!("kdtree".parse::<Strategy>(), Ok(Strategy::Indexed));
        assert_eq!(" indexed ".parse::<Strategy>(), Ok(Strategy::Indexed));
        assert!("dijkstra".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_display_round_trips() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>(), Ok(strategy));
        }
        assert_eq!(Strategy::default(), Strategy::Indexed);
    }

    #[test]
    fn test_zero_neighbors_rejected() {
        let locations = unit_square();
        for strategy in Strategy::ALL {
            let err = strategy.build(&locations, 0).unwrap_err();
            assert!(matches!(
                err,
                Error::InvalidNeighborCount {
                    requested: 0,
                    locations: 4
                }
            ));
        }
    }

    #[test]
    fn test_empty_input_builds_empty_graph() {
        for strategy in Strategy::ALL {
            let graph = strategy.build(&[], 3).unwrap();
            assert!(graph.is_empty());
            assert_eq!(graph.edge_count(), 0);
        }
    }

    #[test]
    fn test_exhaustive_picks_great_circle_nearest() {
        let locations = unit_square();
        let graph = build_exhaustive(&locations, 1).unwrap();

        // Along latitude 1 a longitude degree is slightly shorter than a latitude degree
        let nw = graph.edges_of("nw").unwrap();
        assert_eq!(nw.len(), 1);
        assert_eq!(graph.location(nw[0].target()).id(), "ne");

        // sw is equidistant from nw and se; input order wins
        let sw = graph.edges_of("sw").unwrap();
        assert_eq!(graph.location(sw[0].target()).id(), "nw");
    }

    #[test]
    fn test_indexed_ranks_in_degree_space() {
        let locations = unit_square();
        let graph = build_indexed(&locations, 1).unwrap();

        // In degree space sw and ne are both exactly 1.0 from nw; the earlier index wins
        let nw = graph.edges_of("nw").unwrap();
        assert_eq!(graph.location(nw[0].target()).id(), "sw");
    }

    #[test]
    fn test_edges_sorted_nearest_first() {
        let locations = unit_square();
        let graph = build_exhaustive(&locations, 3).unwrap();
        for idx in 0..graph.len() {
            let edges = graph.edges(idx);
            assert!(edges.windows(2).all(|w| w[0].distance_km() <= w[1].distance_km()));
        }
    }

    #[test]
    fn test_weights_are_haversine_for_both_strategies() {
        let locations = unit_square();
        for strategy in Strategy::ALL {
            let graph = strategy.build(&locations, 2).unwrap();
            for (from, loc) in locations.iter().enumerate() {
                for edge in graph.edges(from) {
                    let target = &locations[edge.target()];
                    let expected = haversine_distance(
                        loc.latitude(),
                        loc.longitude(),
                        target.latitude(),
                        target.longitude(),
                    );
                    assert!((edge.distance_km() - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_no_self_loops() {
        let locations = unit_square();
        for strategy in Strategy::ALL {
            let graph = strategy.build(&locations, 10).unwrap();
            for idx in 0..graph.len() {
                assert!(graph.edges(idx).iter().all(|e| e.target() != idx));
            }
        }
    }

    #[test]
    fn test_two_nodes_cap_neighbors() {
        let locations = vec![
            Location::new("110001", 28.63, 77.21),
            Location::new("110002", 28.64, 77.24),
        ];
        for strategy in Strategy::ALL {
            let graph = strategy.build(&locations, 5).unwrap();
            assert_eq!(graph.edges_of("110001").unwrap().len(), 1);
            assert_eq!(graph.edges_of("110002").unwrap().len(), 1);
        }
    }

    #[test]
    fn test_single_location_has_no_edges() {
        let locations = vec![Location::new("only", 10.0, 10.0)];
        for strategy in Strategy::ALL {
            let graph = strategy.build(&locations, 3).unwrap();
            assert_eq!(graph.len(), 1);
            assert_eq!(graph.edge_count(), 0);
        }
    }

    #[test]
    fn test_indexed_fails_on_non_finite_coordinates() {
        let locations = vec![
            Location::new("ok", 10.0, 10.0),
            Location::new("broken", f64::NAN, 10.0),
            Location::new("fine", 11.0, 10.0),
        ];
        let err = build_indexed(&locations, 1).unwrap_err();
        match err {
            Error::IndexQuery { id, reason } => {
                assert_eq!(id, "broken");
                assert!(reason.contains("non-finite"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
