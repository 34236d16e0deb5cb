//! # Portal Engine
//!
//! Stateful engine tying the pipeline together for one map view session.
//!
//! External UI state (selected route, selected point of interest, display
//! mode, an optional one-shot geolocation fix) flows in; the engine re-runs
//! the synchronous geometry over it and issues marker/polyline/viewport
//! commands to the mapping surface through the [`MarkerSync`]. All derived
//! data (display subsets, proximity groups) is recomputed from scratch when
//! an input changes and never patched.
//!
//! The two genuine asynchronous boundaries are modeled explicitly:
//! - the stop-catalogue fetch is generation-tagged so a stale in-flight
//!   result is discarded when a newer request supersedes it, and
//! - geolocation arrives as a single [`GeolocationOutcome`] per
//!   user-triggered route reveal.

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::EngineError;
use crate::location::GeolocationOutcome;
use crate::proximity::{find_nearby, ProximityConfig};
use crate::sampling::{downsample_stops, SamplerConfig};
use crate::surface::MapSurface;
use crate::sync::{marker_entity, poi_marker_id, stop_marker_id, MarkerRef, MarkerSync, SelectionEvent};
use crate::viewport::{self, ViewportConfig};
use crate::{Coordinate, DisplayMode, PointOfInterest, ProximityGroup, Result, Route, Stop};

/// Lifecycle of the stop/route catalogue fetch.
///
/// `Loading` and `Failed` are distinct displayable states: a fetch failure
/// is never presented as "no nearby stops".
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogueState {
    NotLoaded,
    Loading,
    Ready,
    Failed(EngineError),
}

/// Engine statistics for monitoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStats {
    pub route_count: u32,
    pub stop_count: u32,
    pub poi_count: u32,
    pub display_stop_count: u32,
}

/// The stateful portal engine for one map view session.
pub struct PortalEngine<S: MapSurface> {
    // Catalogue (read-only input from the data store)
    routes: Vec<Route>,
    stops: Vec<Stop>,
    pois: HashMap<String, PointOfInterest>,
    catalogue: CatalogueState,
    catalogue_generation: u64,

    // Selection state, shared between map and companion list UI
    selected_route: Option<String>,
    selected_stop: Option<String>,
    selected_poi: Option<String>,
    display_mode: DisplayMode,

    // Derived display subset, recomputed whenever its inputs change
    display_subset: Vec<Stop>,
    subset_dirty: bool,

    // Route-reveal context (one geolocation fix per user action)
    pending_reveal: Option<String>,
    geolocation_error: Option<EngineError>,

    // Viewport context reported by the surrounding UI
    viewport_width_px: u32,
    current_zoom: f64,

    // Surface access
    sync: MarkerSync<S>,

    // Configuration
    sampler_config: SamplerConfig,
    proximity_config: ProximityConfig,
    viewport_config: ViewportConfig,
}

impl<S: MapSurface> PortalEngine<S> {
    /// Create an engine over an uninitialized surface with default
    /// configuration.
    pub fn new(surface: S) -> Self {
        Self::with_config(
            surface,
            SamplerConfig::default(),
            ProximityConfig::default(),
            ViewportConfig::default(),
        )
    }

    /// Create an engine with custom configuration.
    pub fn with_config(
        surface: S,
        sampler_config: SamplerConfig,
        proximity_config: ProximityConfig,
        viewport_config: ViewportConfig,
    ) -> Self {
        Self {
            routes: Vec::new(),
            stops: Vec::new(),
            pois: HashMap::new(),
            catalogue: CatalogueState::NotLoaded,
            catalogue_generation: 0,
            selected_route: None,
            selected_stop: None,
            selected_poi: None,
            display_mode: DisplayMode::MainOnly,
            display_subset: Vec::new(),
            subset_dirty: false,
            pending_reveal: None,
            geolocation_error: None,
            viewport_width_px: 1280,
            current_zoom: 14.0,
            sync: MarkerSync::new(surface),
            sampler_config,
            proximity_config,
            viewport_config,
        }
    }

    /// Signal that the mapping surface finished initializing; deferred
    /// commands are replayed.
    pub fn surface_ready(&mut self) {
        self.sync.surface_ready();
    }

    /// Report the viewport width, used for responsive fit padding.
    pub fn set_viewport_width(&mut self, px: u32) {
        self.viewport_width_px = px;
    }

    /// Report the surface's current zoom, used for single-point focus.
    pub fn set_current_zoom(&mut self, zoom: f64) {
        self.current_zoom = zoom;
    }

    /// Access the marker synchronizer (and through it, the surface).
    pub fn sync(&self) -> &MarkerSync<S> {
        &self.sync
    }

    // ========================================================================
    // Catalogue Lifecycle
    // ========================================================================

    /// Begin a catalogue fetch. Returns the request generation; deliver the
    /// result with [`catalogue_loaded`](Self::catalogue_loaded) or
    /// [`catalogue_failed`](Self::catalogue_failed) tagged with it. A newer
    /// `begin_catalogue_load` supersedes older in-flight requests: their
    /// late results are discarded (last request wins).
    pub fn begin_catalogue_load(&mut self) -> u64 {
        self.catalogue_generation += 1;
        self.catalogue = CatalogueState::Loading;
        debug!("catalogue fetch started (generation {})", self.catalogue_generation);
        self.catalogue_generation
    }

    /// Deliver a successful catalogue fetch.
    pub fn catalogue_loaded(&mut self, generation: u64, routes: Vec<Route>, stops: Vec<Stop>) {
        if generation != self.catalogue_generation {
            debug!(
                "discarding stale catalogue result (generation {} superseded by {})",
                generation, self.catalogue_generation
            );
            return;
        }
        self.routes = routes;
        self.stops = stops;
        self.catalogue = CatalogueState::Ready;
        self.subset_dirty = true;
        self.refresh_route_display();
    }

    /// Deliver a failed catalogue fetch. Reported distinctly from "no
    /// results"; the consumer may retry by re-triggering the load.
    pub fn catalogue_failed(&mut self, generation: u64, message: &str, status_code: Option<u16>) {
        if generation != self.catalogue_generation {
            debug!("discarding stale catalogue failure (generation {})", generation);
            return;
        }
        warn!("catalogue fetch failed: {}", message);
        self.catalogue = CatalogueState::Failed(EngineError::CatalogueFetch {
            message: message.to_string(),
            status_code,
        });
    }

    /// Current catalogue lifecycle state.
    pub fn catalogue_state(&self) -> &CatalogueState {
        &self.catalogue
    }

    /// Replace the point-of-interest set (read-only input).
    pub fn set_points_of_interest(&mut self, pois: Vec<PointOfInterest>) {
        self.pois = pois.into_iter().map(|p| (p.id.clone(), p)).collect();
    }

    // ========================================================================
    // Route Selection & Display Subset
    // ========================================================================

    /// Select a route: recompute its display subset, rebuild its markers,
    /// redraw its polyline over the full filtered sequence, and fit the
    /// viewport. Returns false for an unknown route id.
    pub fn select_route(&mut self, route_id: &str) -> bool {
        if !self.routes.iter().any(|r| r.id == route_id) {
            return false;
        }
        self.selected_route = Some(route_id.to_string());
        self.selected_stop = None;
        self.subset_dirty = true;
        self.refresh_route_display();
        true
    }

    /// Clear the route selection, removing its markers and polyline.
    pub fn clear_route_selection(&mut self) {
        self.selected_route = None;
        self.selected_stop = None;
        self.display_subset.clear();
        self.subset_dirty = false;
        self.sync.clear_route_markers();
        self.sync.clear_route_line();
    }

    /// Toggle between the downsampled "main stops" view and the full
    /// sequence.
    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        if self.display_mode == mode {
            return;
        }
        self.display_mode = mode;
        self.subset_dirty = true;
        self.refresh_route_display();
    }

    /// The current display subset for the selected route.
    pub fn display_subset(&mut self) -> &[Stop] {
        self.ensure_subset();
        &self.display_subset
    }

    /// The display subset as JSON for the portal list UI.
    pub fn display_subset_json(&mut self) -> String {
        self.ensure_subset();
        serde_json::to_string(&self.display_subset).unwrap_or_else(|_| "[]".to_string())
    }

    /// The selected route's full located stop sequence, ordered by
    /// `order_index`.
    fn located_route_stops(&self, route_id: &str) -> Vec<Stop> {
        let mut stops: Vec<Stop> = self
            .stops
            .iter()
            .filter(|s| s.route_id == route_id && s.usable_location().is_some())
            .cloned()
            .collect();
        stops.sort_by_key(|s| s.order_index);
        stops
    }

    fn ensure_subset(&mut self) {
        if !self.subset_dirty {
            return;
        }
        self.display_subset = match &self.selected_route {
            Some(route_id) => {
                let full = self.located_route_stops(route_id);
                downsample_stops(&full, self.display_mode, &self.sampler_config)
            }
            None => Vec::new(),
        };
        self.subset_dirty = false;
    }

    /// Rebuild markers, polyline, and viewport for the current route
    /// selection. The full rebuild guarantees that no marker of a
    /// previously selected route survives.
    fn refresh_route_display(&mut self) {
        let route = match self
            .selected_route
            .as_ref()
            .and_then(|id| self.routes.iter().find(|r| &r.id == id))
        {
            Some(route) => route.clone(),
            None => {
                self.sync.clear_route_markers();
                self.sync.clear_route_line();
                return;
            }
        };

        self.ensure_subset();
        let full = self.located_route_stops(&route.id);

        self.sync
            .set_route_markers(&self.display_subset, &route, self.selected_stop.as_deref());
        self.sync.draw_route_line(&route, &full);

        let points: Vec<Coordinate> = self
            .display_subset
            .iter()
            .filter_map(Stop::usable_location)
            .collect();
        self.sync.apply_viewport(viewport::fit_markers(
            &points,
            self.viewport_width_px,
            &self.viewport_config,
        ));
    }

    // ========================================================================
    // Point of Interest & Proximity
    // ========================================================================

    /// Select a point of interest: place its marker and fit the viewport.
    /// Returns false for an unknown id.
    pub fn select_poi(&mut self, poi_id: &str) -> bool {
        let poi = match self.pois.get(poi_id) {
            Some(poi) => poi.clone(),
            None => return false,
        };
        self.selected_poi = Some(poi_id.to_string());
        self.sync.set_poi_markers(std::slice::from_ref(&poi), Some(poi_id));

        let points: Vec<Coordinate> = poi.usable_location().into_iter().collect();
        self.sync.apply_viewport(viewport::fit_markers(
            &points,
            self.viewport_width_px,
            &self.viewport_config,
        ));
        true
    }

    /// Nearby transit stops for the selected point of interest, grouped by
    /// route.
    ///
    /// A catalogue fetch failure is a distinct error; a point of interest
    /// without a usable coordinate yields `Ok` with an empty list ("location
    /// not yet available"), as does an empty radius match. While the
    /// catalogue is still loading the consumer shows the loading state from
    /// [`catalogue_state`](Self::catalogue_state).
    pub fn nearby_transit(&self) -> Result<Vec<ProximityGroup>> {
        if let CatalogueState::Failed(err) = &self.catalogue {
            return Err(err.clone());
        }
        let origin = self
            .selected_poi
            .as_ref()
            .and_then(|id| self.pois.get(id))
            .and_then(PointOfInterest::usable_location);
        Ok(find_nearby(origin, &self.stops, &self.routes, &self.proximity_config))
    }

    /// Nearby transit groups as JSON for the portal list UI. Serialization
    /// problems and error states both collapse to `[]` here; the UI reads
    /// the loading/error display from `catalogue_state`.
    pub fn nearby_groups_json(&self) -> String {
        match self.nearby_transit() {
            Ok(groups) => serde_json::to_string(&groups).unwrap_or_else(|_| "[]".to_string()),
            Err(_) => "[]".to_string(),
        }
    }

    // ========================================================================
    // Route Reveal (user location)
    // ========================================================================

    /// Start a "show me how to get there" interaction toward a point of
    /// interest. The caller then requests a single geolocation fix and
    /// delivers it through [`geolocation_resolved`](Self::geolocation_resolved).
    /// Returns false for an unknown id.
    pub fn request_route_reveal(&mut self, poi_id: &str) -> bool {
        if !self.pois.contains_key(poi_id) {
            return false;
        }
        self.pending_reveal = Some(poi_id.to_string());
        self.geolocation_error = None;
        true
    }

    /// Deliver the geolocation outcome for the pending route reveal.
    ///
    /// On a usable fix: show the user-location marker, draw the straight
    /// reveal line to the destination, and animate the two-point fit. On
    /// denial, unsupported capability, or timeout: surface the error state
    /// and issue no marker or viewport command referencing a user location.
    pub fn geolocation_resolved(&mut self, outcome: GeolocationOutcome) {
        let poi_id = match self.pending_reveal.take() {
            Some(id) => id,
            None => {
                debug!("ignoring geolocation outcome with no reveal pending");
                return;
            }
        };

        if let Some(failure) = outcome.failure() {
            debug!("route reveal aborted: {:?}", failure);
            self.geolocation_error = Some(EngineError::Geolocation(failure));
            return;
        }
        let user = match outcome.fix() {
            Some(fix) => fix,
            None => return,
        };

        let destination = match self.pois.get(&poi_id).and_then(PointOfInterest::usable_location) {
            Some(dest) => dest,
            None => {
                // Destination has no usable location; nothing to draw
                debug!("route reveal target {} has no usable location", poi_id);
                return;
            }
        };

        self.sync.show_user_location(user);
        self.sync.draw_reveal_line(user, destination);
        self.sync.apply_viewport(viewport::fit_route_reveal(
            user,
            destination,
            &self.viewport_config,
        ));
    }

    /// The surfaced geolocation error from the last reveal attempt, if any.
    pub fn geolocation_error(&self) -> Option<&EngineError> {
        self.geolocation_error.as_ref()
    }

    /// Clear the route-reveal context: user marker, reveal line, pending
    /// request, and surfaced error.
    pub fn clear_reveal(&mut self) {
        self.pending_reveal = None;
        self.geolocation_error = None;
        self.sync.clear_reveal();
    }

    // ========================================================================
    // Marker Clicks
    // ========================================================================

    /// Handle a click on a surface marker.
    ///
    /// Promotes the clicked entity to "selected", eases the viewport onto it
    /// (never zooming out) and reopens its popup; clicking a stop also
    /// selects its owning route so a companion list stays synchronized. The
    /// returned event is forwarded to the surrounding application.
    pub fn handle_marker_click(&mut self, marker_id: &str) -> Option<SelectionEvent> {
        match marker_entity(marker_id)? {
            MarkerRef::Stop(stop_id) => {
                let stop = self.stops.iter().find(|s| s.id == stop_id)?.clone();
                self.selected_stop = Some(stop_id.clone());
                if self.selected_route.as_deref() != Some(stop.route_id.as_str()) {
                    self.selected_route = Some(stop.route_id.clone());
                    self.subset_dirty = true;
                }
                self.refresh_route_display();

                if let Some(at) = stop.usable_location() {
                    self.sync.focus_marker(
                        &stop_marker_id(&stop_id),
                        viewport::focus_point(at, self.current_zoom, &self.viewport_config),
                    );
                }
                Some(SelectionEvent::StopSelected {
                    stop_id,
                    route_id: stop.route_id,
                })
            }
            MarkerRef::Poi(poi_id) => {
                let poi = self.pois.get(&poi_id)?.clone();
                self.selected_poi = Some(poi_id.clone());
                self.sync.set_poi_markers(std::slice::from_ref(&poi), Some(&poi_id));

                if let Some(at) = poi.usable_location() {
                    self.sync.focus_marker(
                        &poi_marker_id(&poi_id),
                        viewport::focus_point(at, self.current_zoom, &self.viewport_config),
                    );
                }
                Some(SelectionEvent::PoiSelected { poi_id })
            }
            MarkerRef::User => None,
        }
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Engine statistics snapshot.
    pub fn stats(&mut self) -> EngineStats {
        self.ensure_subset();
        EngineStats {
            route_count: self.routes.len() as u32,
            stop_count: self.stops.len() as u32,
            poi_count: self.pois.len() as u32,
            display_stop_count: self.display_subset.len() as u32,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
