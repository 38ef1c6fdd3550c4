//! Distance metrics over latitude/longitude pairs

use crate::model::Location;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in decimal degrees
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just outside [0, 1] for antipodal or coincident points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Great-circle distance in kilometers between two locations
#[inline]
pub fn distance_between(a: &Location, b: &Location) -> f64 {
    haversine_distance(a.latitude(), a.longitude(), b.latitude(), b.longitude())
}

/// Flat Euclidean distance in raw degrees
///
/// Only meaningful as an ordering heuristic inside the spatial index. It
/// ignores meridian convergence and the antimeridian wrap, so it can rank
/// candidates differently than [`distance_between`].
#[inline]
pub fn euclidean_degrees(a: &Location, b: &Location) -> f64 {
    let d_lat = a.latitude() - b.latitude();
    let d_lon = a.longitude() - b.longitude();
    (d_lat * d_lat + d_lon * d_lon).sqrt()
}
