//! Point-to-point route query over a freshly built neighbor graph

use std::time::Instant;

use log::info;
use pinroute_common::{Error, Result};

use crate::builder::Strategy;
use crate::dijkstra::dijkstra;
use crate::model::{Location, RouteResult};

fn position(locations: &[Location], id: &str) -> Result<usize> {
    locations
        .iter()
        .position(|loc| loc.id() == id)
        .ok_or_else(|| Error::unknown_location(id, locations.iter().map(|loc| loc.id())))
}

/// Shortest route between two location ids
///
/// Builds the `neighbors`-nearest graph over `locations` with `strategy`, then
/// runs Dijkstra on it. Nothing is cached between calls. Ids are resolved
/// before the graph is built so a bad id fails fast.
///
/// The graph only approximates the full point set: if the neighbor reduction
/// drops the true optimum the returned route is the best one in the graph,
/// and if it disconnects the endpoints the result is unreachable.
pub fn find_route(
    locations: &[Location],
    source_id: &str,
    destination_id: &str,
    neighbors: usize,
    strategy: Strategy,
) -> Result<RouteResult> {
    let source = position(locations, source_id)?;
    let destination = position(locations, destination_id)?;

    let graph = strategy.build(locations, neighbors)?;

    let start = Instant::now();
    let result = dijkstra(&graph, source, destination);
    info!(
        "Route {} -> {} ({} strategy, k={}): {} hops, {:.3} km in {:.3}ms",
        source_id,
        destination_id,
        strategy,
        neighbors,
        result.hops(),
        result.total_distance_km(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(result)
}
