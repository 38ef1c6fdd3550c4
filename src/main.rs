//! # Pinroute CLI
//!
//! Command-line front end for the pinroute library.
//! Loads located postal records from a JSON file, builds the K-nearest-neighbor
//! graph and answers shortest-route or neighbor-list queries over it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use pinroute_graph::{find_route, Strategy, DEFAULT_NEIGHBORS};

mod cli;

/// Command-line interface for pinroute
#[derive(Parser)]
#[command(name = "pinroute")]
#[command(about = "Shortest routes between postal service points over a nearest-neighbor graph")]
#[command(long_about = "Routes between postal service points by great-circle distance:
  pinroute route -l offices.json 560001 560034              # Route with the KD-tree builder
  pinroute route -l offices.json 560001 560034 -s exhaustive
  pinroute neighbors -l offices.json --id 560001 -k 5       # Inspect one node's edges

Locations file: a JSON array of {\"id\", \"latitude\", \"longitude\", \"metadata\"} objects.
Set RUST_LOG=debug (or pass --verbose) for timing and search statistics.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Worker threads for graph construction (defaults to one per core)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Find the shortest route between two locations
    Route {
        #[command(flatten)]
        graph: GraphArgs,

        /// Source location id
        source: String,

        /// Destination location id
        destination: String,
    },
    /// Print the nearest-neighbor edges of the graph
    Neighbors {
        #[command(flatten)]
        graph: GraphArgs,

        /// Only show the edges of this location
        #[arg(long)]
        id: Option<String>,
    },
}

/// Options shared by every command that builds a graph
#[derive(Args)]
struct GraphArgs {
    /// JSON file with the locations to connect
    #[arg(short, long)]
    locations: PathBuf,

    /// Neighbors per location
    #[arg(short = 'k', long, default_value_t = DEFAULT_NEIGHBORS)]
    neighbors: usize,

    /// Graph construction strategy: "indexed" (KD-tree) or "exhaustive"
    #[arg(short, long, default_value_t = Strategy::default())]
    strategy: Strategy,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Cli::parse();

    // Initialize logging to stderr
    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(args) {
        error!("❌ Error: {e:#}");
        std::process::exit(cli::exit_code(&e));
    }
}

fn run(args: Cli) -> Result<()> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    match args.command {
        Command::Route {
            graph,
            source,
            destination,
        } => {
            let locations = cli::load_locations(&graph.locations).with_context(|| {
                format!("Failed to load locations from {}", graph.locations.display())
            })?;
            info!(
                "🦋 Routing {source} -> {destination} over {} locations ({} builder, k={})",
                locations.len(),
                graph.strategy,
                graph.neighbors
            );

            let result = find_route(
                &locations,
                &source,
                &destination,
                graph.neighbors,
                graph.strategy,
            )?;

            let report = cli::RouteReport::new(
                &source,
                &destination,
                graph.strategy,
                graph.neighbors,
                &result,
            );
            if graph.json {
                println!("{}", report.to_json()?);
            } else {
                print!("{report}");
            }
        }
        Command::Neighbors { graph, id } => {
            let locations = cli::load_locations(&graph.locations).with_context(|| {
                format!("Failed to load locations from {}", graph.locations.display())
            })?;
            let built = graph.strategy.build(&locations, graph.neighbors)?;

            let report = cli::NeighborReport::new(&built, id.as_deref())?;
            if graph.json {
                println!("{}", report.to_json()?);
            } else {
                print!("{report}");
            }
        }
    }

    Ok(())
}
