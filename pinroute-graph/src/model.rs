//! Located records and query results

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Coordinate axis used by the spatial index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Split axis for a tree level: even depths split on latitude, odd on longitude
    #[inline]
    pub fn for_depth(depth: usize) -> Self {
        if depth % 2 == 0 {
            Axis::Latitude
        } else {
            Axis::Longitude
        }
    }
}

/// A postal service point with parsed coordinates
///
/// Identity is the id alone: two locations with the same id compare equal
/// regardless of coordinates or metadata. Fields are private so a location
/// cannot be moved after it has been handed to a builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    id: String,
    latitude: f64,
    longitude: f64,
    /// Descriptive fields (office name, district, state, ...) carried through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, String>,
}

impl Location {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    #[inline]
    pub fn coordinate(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Latitude => self.latitude,
            Axis::Longitude => self.longitude,
        }
    }

    /// True when both coordinates are finite numbers
    pub fn has_finite_coordinates(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Outcome of a shortest-path query
///
/// An unreachable destination is a regular result: the total distance is
/// `f64::INFINITY` and the path holds only the destination.
#[derive(Debug, Clone, Serialize)]
pub struct RouteResult {
    path: Vec<Location>,
    /// Serialized as `null` when the destination is unreachable
    total_distance_km: f64,
}

impl RouteResult {
    pub fn new(path: Vec<Location>, total_distance_km: f64) -> Self {
        Self {
            path,
            total_distance_km,
        }
    }

    /// Locations from source to destination, both inclusive
    pub fn path(&self) -> &[Location] {
        &self.path
    }

    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn is_reachable(&self) -> bool {
        self.total_distance_km.is_finite()
    }

    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn into_path(self) -> Vec<Location> {
        self.path
    }
}
