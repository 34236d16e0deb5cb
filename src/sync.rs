//! Marker/selection synchronization against the mapping surface.
//!
//! The synchronizer owns the lifecycle of every on-map drawable: route-stop
//! markers, point-of-interest markers, the route polyline, and the
//! independent user-location marker + reveal line. Whenever a derived
//! dataset changes it removes all markers it previously created for that
//! dataset and creates fresh ones; at this data scale the full rebuild is
//! simpler than keyed diffing and trivially guarantees that no stale marker
//! survives a recomputation.
//!
//! All surface mutation in the engine goes through this one type, and every
//! command issued before the surface signals ready is deferred and replayed
//! in order once it does.

use log::debug;
use serde::Serialize;

use crate::surface::{MapSurface, MarkerStyle, PolylineStyle};
use crate::viewport::{Animation, Padding, ViewportCommand};
use crate::{Bounds, Coordinate, PointOfInterest, Route, Stop};

/// Name of the selected route's polyline.
const ROUTE_LINE: &str = "route-line";
/// Name of the user-location-to-destination polyline.
const REVEAL_LINE: &str = "reveal-line";
/// Marker id of the single user-location marker.
const USER_MARKER: &str = "user";
/// Marker color for the user location.
const USER_COLOR: &str = "#1a73e8";
/// Stroke color for the reveal line.
const REVEAL_COLOR: &str = "#5f6368";

/// An outbound selection event for the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectionEvent {
    RouteSelected { route_id: String },
    StopSelected { stop_id: String, route_id: String },
    PoiSelected { poi_id: String },
}

/// The entity a marker id refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerRef {
    Stop(String),
    Poi(String),
    User,
}

/// Parse a marker id back into the entity it was created for.
pub fn marker_entity(marker_id: &str) -> Option<MarkerRef> {
    if marker_id == USER_MARKER {
        return Some(MarkerRef::User);
    }
    if let Some(id) = marker_id.strip_prefix("stop:") {
        return Some(MarkerRef::Stop(id.to_string()));
    }
    if let Some(id) = marker_id.strip_prefix("poi:") {
        return Some(MarkerRef::Poi(id.to_string()));
    }
    None
}

pub(crate) fn stop_marker_id(stop_id: &str) -> String {
    format!("stop:{}", stop_id)
}

pub(crate) fn poi_marker_id(poi_id: &str) -> String {
    format!("poi:{}", poi_id)
}

/// A deferred surface command, queued while the surface is initializing.
#[derive(Debug, Clone)]
enum Deferred {
    AddMarker {
        id: String,
        at: Coordinate,
        style: MarkerStyle,
        popup: Option<String>,
    },
    RemoveMarker {
        id: String,
    },
    OpenPopup {
        id: String,
    },
    DrawPolyline {
        name: String,
        points: Vec<Coordinate>,
        style: PolylineStyle,
    },
    RemovePolyline {
        name: String,
    },
    FitBounds {
        bounds: Bounds,
        padding: Padding,
        max_zoom: f64,
        animation: Animation,
    },
    EaseTo {
        center: Coordinate,
        zoom: f64,
        animation: Animation,
    },
}

/// Keeps the on-map drawables consistent with the current derived data.
pub struct MarkerSync<S: MapSurface> {
    surface: S,
    ready: bool,
    pending: Vec<Deferred>,

    // Ids of markers created for the current route / POI datasets
    route_marker_ids: Vec<String>,
    poi_marker_ids: Vec<String>,
    route_line_present: bool,
    user_location_present: bool,
    reveal_line_present: bool,
}

impl<S: MapSurface> MarkerSync<S> {
    /// Wrap a surface. The surface is treated as uninitialized until
    /// [`surface_ready`](Self::surface_ready) is called; commands issued
    /// before then are deferred.
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            ready: false,
            pending: Vec::new(),
            route_marker_ids: Vec::new(),
            poi_marker_ids: Vec::new(),
            route_line_present: false,
            user_location_present: false,
            reveal_line_present: false,
        }
    }

    /// Whether the surface has signaled ready.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Mark the surface as initialized and replay deferred commands in order.
    pub fn surface_ready(&mut self) {
        self.ready = true;
        if !self.pending.is_empty() {
            debug!("surface ready, replaying {} deferred commands", self.pending.len());
        }
        for cmd in std::mem::take(&mut self.pending) {
            self.dispatch(cmd);
        }
    }

    /// Access the wrapped surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn issue(&mut self, cmd: Deferred) {
        if self.ready {
            self.dispatch(cmd);
        } else {
            self.pending.push(cmd);
        }
    }

    fn dispatch(&mut self, cmd: Deferred) {
        match cmd {
            Deferred::AddMarker { id, at, style, popup } => {
                self.surface.add_marker(&id, at, style, popup)
            }
            Deferred::RemoveMarker { id } => self.surface.remove_marker(&id),
            Deferred::OpenPopup { id } => self.surface.open_popup(&id),
            Deferred::DrawPolyline { name, points, style } => {
                self.surface.draw_polyline(&name, &points, style)
            }
            Deferred::RemovePolyline { name } => self.surface.remove_polyline(&name),
            Deferred::FitBounds {
                bounds,
                padding,
                max_zoom,
                animation,
            } => self.surface.fit_bounds(bounds, padding, max_zoom, animation),
            Deferred::EaseTo {
                center,
                zoom,
                animation,
            } => self.surface.ease_to(center, zoom, animation),
        }
    }

    // ========================================================================
    // Route markers & polyline
    // ========================================================================

    /// Replace the route-stop markers with markers for the given display
    /// subset. All previously created route markers are removed first; the
    /// selected stop gets the accent style.
    pub fn set_route_markers(&mut self, stops: &[Stop], route: &Route, selected_stop: Option<&str>) {
        self.clear_route_markers();

        for stop in stops {
            let at = match stop.usable_location() {
                Some(at) => at,
                None => continue,
            };
            let style = if selected_stop == Some(stop.id.as_str()) {
                MarkerStyle::selected(&route.color)
            } else {
                MarkerStyle::plain(&route.color)
            };
            let id = stop_marker_id(&stop.id);
            self.issue(Deferred::AddMarker {
                id: id.clone(),
                at,
                style,
                popup: Some(stop.name.clone()),
            });
            self.route_marker_ids.push(id);
        }
        debug!("rebuilt {} route markers", self.route_marker_ids.len());
    }

    /// Remove every route-stop marker.
    pub fn clear_route_markers(&mut self) {
        for id in std::mem::take(&mut self.route_marker_ids) {
            self.issue(Deferred::RemoveMarker { id });
        }
    }

    /// Redraw the selected route's polyline over its full filtered stop
    /// sequence, replacing any prior route polyline. With fewer than two
    /// located stops no line can be drawn and any existing line is removed.
    pub fn draw_route_line(&mut self, route: &Route, full_stops: &[Stop]) {
        let points: Vec<Coordinate> = full_stops
            .iter()
            .filter_map(Stop::usable_location)
            .collect();

        if points.len() < 2 {
            self.clear_route_line();
            return;
        }

        self.issue(Deferred::DrawPolyline {
            name: ROUTE_LINE.to_string(),
            points,
            style: PolylineStyle {
                width_px: 4,
                color: route.color.clone(),
            },
        });
        self.route_line_present = true;
    }

    /// Remove the route polyline if present.
    pub fn clear_route_line(&mut self) {
        if self.route_line_present {
            self.issue(Deferred::RemovePolyline {
                name: ROUTE_LINE.to_string(),
            });
            self.route_line_present = false;
        }
    }

    // ========================================================================
    // Point-of-interest markers
    // ========================================================================

    /// Replace the point-of-interest markers. Entities without a usable
    /// coordinate are skipped.
    pub fn set_poi_markers(&mut self, pois: &[PointOfInterest], selected: Option<&str>) {
        self.clear_poi_markers();

        for poi in pois {
            let at = match poi.usable_location() {
                Some(at) => at,
                None => continue,
            };
            let style = if selected == Some(poi.id.as_str()) {
                MarkerStyle::selected("#e67e22")
            } else {
                MarkerStyle::plain("#e67e22")
            };
            let id = poi_marker_id(&poi.id);
            self.issue(Deferred::AddMarker {
                id: id.clone(),
                at,
                style,
                popup: Some(poi.name.clone()),
            });
            self.poi_marker_ids.push(id);
        }
    }

    /// Remove every point-of-interest marker.
    pub fn clear_poi_markers(&mut self) {
        for id in std::mem::take(&mut self.poi_marker_ids) {
            self.issue(Deferred::RemoveMarker { id });
        }
    }

    // ========================================================================
    // User location & reveal line
    // ========================================================================

    /// Place (or move) the single user-location marker.
    ///
    /// Managed independently of the route-marker lifecycle.
    pub fn show_user_location(&mut self, at: Coordinate) {
        self.issue(Deferred::AddMarker {
            id: USER_MARKER.to_string(),
            at,
            style: MarkerStyle::selected(USER_COLOR),
            popup: None,
        });
        self.user_location_present = true;
    }

    /// Draw the straight line from the user location to a destination.
    pub fn draw_reveal_line(&mut self, from: Coordinate, to: Coordinate) {
        self.issue(Deferred::DrawPolyline {
            name: REVEAL_LINE.to_string(),
            points: vec![from, to],
            style: PolylineStyle {
                width_px: 3,
                color: REVEAL_COLOR.to_string(),
            },
        });
        self.reveal_line_present = true;
    }

    /// Clear the route-reveal context: user marker and reveal line.
    pub fn clear_reveal(&mut self) {
        if self.user_location_present {
            self.issue(Deferred::RemoveMarker {
                id: USER_MARKER.to_string(),
            });
            self.user_location_present = false;
        }
        if self.reveal_line_present {
            self.issue(Deferred::RemovePolyline {
                name: REVEAL_LINE.to_string(),
            });
            self.reveal_line_present = false;
        }
    }

    // ========================================================================
    // Viewport & popups
    // ========================================================================

    /// Forward a viewport command to the surface.
    pub fn apply_viewport(&mut self, cmd: ViewportCommand) {
        match cmd {
            ViewportCommand::FitBounds {
                bounds,
                padding,
                max_zoom,
                animation,
            } => self.issue(Deferred::FitBounds {
                bounds,
                padding,
                max_zoom,
                animation,
            }),
            ViewportCommand::EaseTo {
                center,
                zoom,
                animation,
            } => self.issue(Deferred::EaseTo {
                center,
                zoom,
                animation,
            }),
        }
    }

    /// Ease to a marker and reopen its popup.
    pub fn focus_marker(&mut self, marker_id: &str, cmd: ViewportCommand) {
        self.apply_viewport(cmd);
        self.issue(Deferred::OpenPopup {
            id: marker_id.to_string(),
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
