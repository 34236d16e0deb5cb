//! Geographic utilities: great-circle distance, polyline length, bounds.
//!
//! Distances use the haversine formula. Accuracy is within standard
//! haversine approximation error, which is sufficient for the
//! hundreds-of-meters radii this engine works at.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::{Coord, LineString};

use crate::{Bounds, Coordinate};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters.
///
/// Pure, total function over valid coordinates; callers exclude entities
/// with absent locations before calling.
///
/// # Example
/// ```
/// use transit_proximity::{Coordinate, haversine_distance};
///
/// let london = Coordinate::new(51.5074, -0.1278);
/// let paris = Coordinate::new(48.8566, 2.3522);
/// let distance = haversine_distance(&london, &paris);
/// assert!((distance / 1000.0 - 344.0).abs() < 2.0);
/// ```
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Total length of a polyline in meters.
pub fn polyline_length(points: &[Coordinate]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}

/// Bounding box over a set of coordinates, skipping unusable ones.
///
/// Returns `None` when no usable coordinate remains.
pub fn compute_bounds(points: &[Coordinate]) -> Option<Bounds> {
    let coords: Vec<Coord> = points
        .iter()
        .filter(|p| p.is_valid())
        .map(|p| Coord { x: p.lng, y: p.lat })
        .collect();

    if coords.is_empty() {
        return None;
    }

    let rect = LineString::new(coords).bounding_rect()?;

    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

/// Center point of a set of coordinates (bounding-box center).
pub fn compute_center(points: &[Coordinate]) -> Option<Coordinate> {
    compute_bounds(points).map(|b| b.center())
}
