//! Text and JSON rendering of query results

use std::fmt;

use pinroute_common::{Error, Result};
use pinroute_graph::{Graph, Location, RouteResult, Strategy};
use serde::Serialize;

/// A route together with the parameters that produced it
#[derive(Debug, Serialize)]
pub struct RouteReport<'a> {
    source: &'a str,
    destination: &'a str,
    strategy: Strategy,
    neighbors: usize,
    reachable: bool,
    hops: usize,
    /// `None` when unreachable
    total_distance_km: Option<f64>,
    path: &'a [Location],
}

impl<'a> RouteReport<'a> {
    pub fn new(
        source: &'a str,
        destination: &'a str,
        strategy: Strategy,
        neighbors: usize,
        result: &'a RouteResult,
    ) -> Self {
        Self {
            source,
            destination,
            strategy,
            neighbors,
            reachable: result.is_reachable(),
            hops: result.hops(),
            total_distance_km: result
                .is_reachable()
                .then(|| result.total_distance_km()),
            path: result.path(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for RouteReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(total) = self.total_distance_km else {
            return writeln!(
                f,
                "No route from {} to {} in the {}-nearest-neighbor graph ({} builder)",
                self.source, self.destination, self.neighbors, self.strategy
            );
        };

        writeln!(
            f,
            "Route {} -> {} ({} builder, k={})",
            self.source, self.destination, self.strategy, self.neighbors
        )?;
        for (step, location) in self.path.iter().enumerate() {
            write!(
                f,
                "{:>4}. {:<12} {:>9.4}, {:>9.4}",
                step + 1,
                location.id(),
                location.latitude(),
                location.longitude()
            )?;
            if !location.metadata().is_empty() {
                let fields: Vec<String> = location
                    .metadata()
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                write!(f, "  [{}]", fields.join(", "))?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Total: {:.3} km over {} hops", total, self.hops)
    }
}

#[derive(Debug, Serialize)]
struct NeighborEntry<'a> {
    id: &'a str,
    distance_km: f64,
}

#[derive(Debug, Serialize)]
struct NodeEntry<'a> {
    id: &'a str,
    neighbors: Vec<NeighborEntry<'a>>,
}

/// Outgoing edges of every node, or of a single node
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct NeighborReport<'a> {
    nodes: Vec<NodeEntry<'a>>,
}

impl<'a> NeighborReport<'a> {
    /// Collect the edges of `only` (or of all nodes when `None`)
    pub fn new(graph: &Graph<'a>, only: Option<&str>) -> Result<Self> {
        let indices: Vec<usize> = match only {
            Some(id) => {
                let idx = graph.index_of(id).ok_or_else(|| {
                    Error::unknown_location(id, graph.locations().iter().map(Location::id))
                })?;
                vec![idx]
            }
            None => (0..graph.len()).collect(),
        };

        let nodes = indices
            .into_iter()
            .map(|idx| NodeEntry {
                id: graph.location(idx).id(),
                neighbors: graph
                    .edges(idx)
                    .iter()
                    .map(|edge| NeighborEntry {
                        id: graph.location(edge.target()).id(),
                        distance_km: edge.distance_km(),
                    })
                    .collect(),
            })
            .collect();

        Ok(Self { nodes })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for NeighborReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{} ->", node.id)?;
            for (i, neighbor) in node.neighbors.iter().enumerate() {
                let sep = if i == 0 { " " } else { ", " };
                write!(f, "{sep}{}({:.3} km)", neighbor.id, neighbor.distance_km)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
