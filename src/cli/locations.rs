//! Location file loading
//!
//! The input is a JSON array of location records:
//!
//! ```json
//! [
//!   {"id": "560001", "latitude": 12.9716, "longitude": 77.5946,
//!    "metadata": {"office": "Bangalore GPO"}}
//! ]
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;
use pinroute_common::{Error, Result};
use pinroute_graph::Location;

/// Read and validate the locations stored at `path`
pub fn load_locations(path: &Path) -> Result<Vec<Location>> {
    let file = File::open(path)?;
    let locations = parse_locations(BufReader::new(file)).map_err(Error::InvalidInput)?;

    debug!("Loaded {} locations from {}", locations.len(), path.display());
    Ok(locations)
}

fn parse_locations<R: Read>(reader: R) -> std::result::Result<Vec<Location>, String> {
    let locations: Vec<Location> = serde_json::from_reader(reader).map_err(|e| e.to_string())?;
    check_unique_ids(&locations)?;
    Ok(locations)
}

/// Node lookup is by id, so two records sharing one would shadow each other
fn check_unique_ids(locations: &[Location]) -> std::result::Result<(), String> {
    let mut seen = HashSet::with_capacity(locations.len());
    for location in locations {
        if !seen.insert(location.id()) {
            return Err(format!("duplicate location id '{}'", location.id()));
        }
    }
    Ok(())
}
