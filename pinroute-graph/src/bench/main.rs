//! Benchmark harness comparing the two graph construction strategies
//!
//! Generates random locations, then for each strategy:
//! - builds the neighbor graph several times (build latency)
//! - runs random route queries on the last graph (query latency)
//!
//! Outputs: p50/p95/p99 times + how many nodes got a different neighbor set
//! from the indexed strategy than from the exhaustive one

use std::collections::HashSet;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use hdrhistogram::Histogram;
use rand::prelude::*;

use pinroute_graph::{shortest_path, Graph, Location, Strategy};

#[derive(Parser)]
#[command(name = "pinroute-bench")]
#[command(about = "Benchmark harness for pinroute graph construction and routing")]
struct Cli {
    /// Number of random locations
    #[arg(long, default_value = "5000")]
    n_locations: usize,

    /// Neighbors per location
    #[arg(short = 'k', long, default_value = "30")]
    neighbors: usize,

    /// Graph builds per strategy
    #[arg(long, default_value = "5")]
    rounds: usize,

    /// Route queries per strategy
    #[arg(long, default_value = "200")]
    n_queries: usize,

    /// Southern and northern latitude bounds
    #[arg(long, num_args = 2, default_values_t = [8.0, 37.0])]
    lat_range: Vec<f64>,

    /// Western and eastern longitude bounds
    #[arg(long, num_args = 2, default_values_t = [68.0, 97.0])]
    lon_range: Vec<f64>,

    /// Random seed for reproducibility
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn random_locations(cli: &Cli, rng: &mut StdRng) -> Vec<Location> {
    let (lat_min, lat_max) = (cli.lat_range[0], cli.lat_range[1]);
    let (lon_min, lon_max) = (cli.lon_range[0], cli.lon_range[1]);
    (0..cli.n_locations)
        .map(|i| {
            Location::new(
                format!("{:06}", 100000 + i),
                rng.random_range(lat_min..lat_max),
                rng.random_range(lon_min..lon_max),
            )
        })
        .collect()
}

fn record(hist: &mut Histogram<u64>, elapsed: Duration) -> Result<()> {
    hist.record(elapsed.as_micros().max(1) as u64)
        .context("Failed to record sample")
}

fn print_histogram(label: &str, hist: &Histogram<u64>) {
    println!(
        "  {label:<8} n={:<5} p50={:>10.3}ms p95={:>10.3}ms p99={:>10.3}ms max={:>10.3}ms",
        hist.len(),
        hist.value_at_quantile(0.50) as f64 / 1000.0,
        hist.value_at_quantile(0.95) as f64 / 1000.0,
        hist.value_at_quantile(0.99) as f64 / 1000.0,
        hist.max() as f64 / 1000.0,
    );
}

fn neighbor_sets(graph: &Graph<'_>) -> Vec<HashSet<usize>> {
    (0..graph.len())
        .map(|idx| graph.edges(idx).iter().map(|e| e.target()).collect())
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    anyhow::ensure!(cli.n_locations >= 2, "need at least 2 locations");
    anyhow::ensure!(cli.lat_range[0] < cli.lat_range[1], "empty latitude range");
    anyhow::ensure!(cli.lon_range[0] < cli.lon_range[1], "empty longitude range");

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let locations = random_locations(&cli, &mut rng);
    let pairs: Vec<(usize, usize)> = (0..cli.n_queries)
        .map(|_| {
            (
                rng.random_range(0..locations.len()),
                rng.random_range(0..locations.len()),
            )
        })
        .collect();

    println!(
        "Benchmark: {} locations, k={}, {} rounds, {} queries, {} threads",
        locations.len(),
        cli.neighbors,
        cli.rounds,
        pairs.len(),
        rayon::current_num_threads()
    );

    let mut sets: Vec<Vec<HashSet<usize>>> = Vec::new();

    for strategy in Strategy::ALL {
        let mut build_hist = Histogram::<u64>::new(3).context("Failed to create histogram")?;
        let mut query_hist = Histogram::<u64>::new(3).context("Failed to create histogram")?;

        let mut graph = strategy.build(&locations, cli.neighbors)?;
        for _ in 0..cli.rounds {
            let t = Instant::now();
            graph = strategy.build(&locations, cli.neighbors)?;
            record(&mut build_hist, t.elapsed())?;
        }

        let mut unreachable = 0usize;
        let mut total_km = 0.0;
        for &(s, d) in &pairs {
            let t = Instant::now();
            let result = shortest_path(&graph, locations[s].id(), locations[d].id())?;
            record(&mut query_hist, t.elapsed())?;

            if result.is_reachable() {
                total_km += result.total_distance_km();
            } else {
                unreachable += 1;
            }
        }

        println!("\n[{strategy}] {} edges", graph.edge_count());
        print_histogram("build", &build_hist);
        print_histogram("query", &query_hist);
        println!(
            "  routes   reachable={} unreachable={} total={:.1}km",
            pairs.len() - unreachable,
            unreachable,
            total_km
        );

        sets.push(neighbor_sets(&graph));
    }

    if let [exhaustive, indexed] = sets.as_slice() {
        let differing = exhaustive
            .iter()
            .zip(indexed)
            .filter(|(a, b)| a != b)
            .count();
        println!(
            "\nNeighbor sets differing between strategies: {} of {} nodes ({:.2}%)",
            differing,
            locations.len(),
            100.0 * differing as f64 / locations.len() as f64
        );
    }

    Ok(())
}
