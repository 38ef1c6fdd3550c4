//! CLI-specific utilities for pinroute
//!
//! Input loading and output formatting for the command-line interface,
//! kept apart from the graph library.

pub mod locations;
pub mod report;

pub use locations::load_locations;
pub use report::{NeighborReport, RouteReport};

use pinroute_common::Error;

/// Process exit status for a failed run
///
/// Input mistakes the caller can fix (unknown id, bad neighbor count, bad
/// locations file) exit with 2; everything else with 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<Error>() {
        Some(Error::UnknownLocation { .. })
        | Some(Error::InvalidNeighborCount { .. })
        | Some(Error::InvalidInput(_)) => 2,
        _ => 1,
    }
}
