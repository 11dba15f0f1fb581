//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula on a spherical Earth of radius 6,371 km.

use crate::models::types::Coordinate;

/// Spherical Earth radius used by every distance in this crate
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters per degree of latitude (and of longitude at the equator) on the
/// same sphere as [`haversine_distance`]
const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// Slack added to prefilter radii so boundary stops reach the exact check
const SEARCH_PADDING: f64 = 1.01;

/// Calculate Haversine distance between two coordinates in meters
///
/// Out-of-range inputs give a finite but meaningless number; validate with
/// [`Coordinate::is_valid`] first.
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);

    // Rounding can push h a hair outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Total length in meters of a path through the given coordinates
pub fn route_length(coords: &[Coordinate]) -> f64 {
    coords
        .windows(2)
        .map(|w| haversine_distance(w[0], w[1]))
        .sum()
}

/// Convert degrees to approximate meters at equator (for bounding box queries)
pub fn degrees_to_meters_approx(degrees: f64) -> f64 {
    degrees * METERS_PER_DEGREE
}

/// Convert meters to degrees at equator (for bounding box queries)
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Degree radius that covers `meters` in every direction around `latitude`.
///
/// A degree of longitude shrinks with cos(latitude), so the longitude span
/// dominates. It is taken at the window's latitude furthest from the
/// equator; the result is a superset suitable for R-tree prefiltering.
pub fn search_radius_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_span = meters_to_degrees_approx(meters * SEARCH_PADDING);
    let furthest = (latitude.abs() + lat_span).min(90.0);
    let cos_lat = furthest.to_radians().cos().max(0.01);
    lat_span / cos_lat
}
