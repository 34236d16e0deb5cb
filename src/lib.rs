//! # Transit Proximity
//!
//! Geospatial proximity search and route map visualization for a regional
//! civic-information portal.
//!
//! This library provides:
//! - Downsampling of dense stop sequences for legible map display
//! - Nearest-transit lookup around a point of interest, grouped by route
//! - Viewport fitting (bounds + responsive padding) for the current point set
//! - Marker/selection synchronization against a pluggable mapping surface
//!
//! ## Quick Start
//!
//! ```rust
//! use transit_proximity::{Coordinate, Stop, Route, ProximityConfig, find_nearby};
//!
//! let route = Route::new("r1", "3", "Centro - Terminal", "#c0392b");
//! let stops = vec![
//!     Stop::new("s1", "r1", "Parque Calderon", Some(Coordinate::new(-2.8974, -79.0045)), 0),
//!     Stop::new("s2", "r1", "Terminal Terrestre", Some(Coordinate::new(-2.8900, -78.9900)), 1),
//! ];
//!
//! let origin = Coordinate::new(-2.8970, -79.0040);
//! let groups = find_nearby(Some(origin), &stops, &[route], &ProximityConfig::default());
//! assert_eq!(groups.len(), 1);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{EngineError, GeolocationFailure, Result};

// Geographic utilities (distance, bounds, center calculations)
pub mod geo_utils;
pub use geo_utils::{compute_bounds, compute_center, haversine_distance, polyline_length};

// Stop downsampling for legible map display
pub mod sampling;
pub use sampling::{downsample_stops, SamplerConfig};

// Nearest-transit lookup around a point of interest
pub mod proximity;
pub use proximity::{find_nearby, ProximityConfig};

// Viewport fitting (bounds + padding planning)
pub mod viewport;
pub use viewport::{Animation, Padding, ViewportCommand, ViewportConfig};

// Mapping-surface command interface
pub mod surface;
pub use surface::{MapSurface, MarkerStyle, PolylineStyle};

// Marker/selection synchronization
pub mod sync;
pub use sync::{MarkerSync, SelectionEvent};

// Geolocation capability boundary
pub mod location;
pub use location::{GeolocationOutcome, GEOLOCATION_TIMEOUT_SECS};

// One-shot UI flag store
pub mod flags;
pub use flags::{with_flags, FlagStore, MemoryFlagStore};

// Stateful portal engine tying the pipeline together
pub mod engine;
pub use engine::{CatalogueState, EngineStats, PortalEngine};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use transit_proximity::Coordinate;
/// let point = Coordinate::new(-2.8974, -79.0045); // Cuenca
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check if the coordinate is usable for geometric operations.
    ///
    /// Out-of-range or non-finite values are treated as an absent location,
    /// never as an error.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lng >= -180.0
            && self.lng <= 180.0
    }
}

/// Bounding box over a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from coordinates, skipping unusable ones.
    ///
    /// Returns `None` when no usable coordinate remains.
    pub fn from_points(points: &[Coordinate]) -> Option<Self> {
        geo_utils::compute_bounds(points)
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Display mode for a route's stop sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Downsampled "main stops" view for dense sequences.
    MainOnly,
    /// Full filtered sequence, bypassing the downsampler.
    All,
}

/// A transit route: a named, ordered line composed of stops.
///
/// Immutable for the lifetime of a view session; supplied by the external
/// data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Unique identifier from the data store
    pub id: String,
    /// Display number/code (e.g. "12", "T3")
    pub number: String,
    /// Display label
    pub name: String,
    /// Display color (CSS-style)
    pub color: String,
}

impl Route {
    /// Create a new route.
    pub fn new(id: &str, number: &str, name: &str, color: &str) -> Self {
        Self {
            id: id.to_string(),
            number: number.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// A single, ordered waypoint on a route, optionally geolocated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Unique identifier from the data store
    pub id: String,
    /// Owning route id
    pub route_id: String,
    /// Display name
    pub name: String,
    /// Optional location; `None` or out-of-range means the stop is excluded
    /// from all geometric operations but still exists in the catalogue
    pub location: Option<Coordinate>,
    /// Position along the route; unique per route, defines traversal order
    pub order_index: u32,
}

impl Stop {
    /// Create a new stop.
    pub fn new(
        id: &str,
        route_id: &str,
        name: &str,
        location: Option<Coordinate>,
        order_index: u32,
    ) -> Self {
        Self {
            id: id.to_string(),
            route_id: route_id.to_string(),
            name: name.to_string(),
            location,
            order_index,
        }
    }

    /// The stop's location, if present and within valid lat/lng ranges.
    pub fn usable_location(&self) -> Option<Coordinate> {
        self.location.filter(Coordinate::is_valid)
    }
}

/// A non-transit located entity (e.g. a place of interest) that proximity
/// search is run against. Read-only input; not owned by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub id: String,
    pub name: String,
    pub location: Option<Coordinate>,
}

impl PointOfInterest {
    /// Create a new point of interest.
    pub fn new(id: &str, name: &str, location: Option<Coordinate>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            location,
        }
    }

    /// The point's location, if present and within valid lat/lng ranges.
    pub fn usable_location(&self) -> Option<Coordinate> {
        self.location.filter(Coordinate::is_valid)
    }
}

/// A single stop-to-point distance result.
///
/// Derived transiently per lookup; never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityMatch {
    pub stop: Stop,
    pub distance_m: f64,
}

/// Proximity matches for one route, closest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityGroup {
    pub route: Route,
    /// Matches sorted ascending by distance, truncated to the per-route cap
    pub matches: Vec<ProximityMatch>,
}

// ============================================================================
// Tests
// ============================================================================
