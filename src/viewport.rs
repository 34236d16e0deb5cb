//! Viewport fitting: bounds and padding planning for the current point set.
//!
//! The fitter is a pure planner. It never talks to the mapping surface
//! itself; it produces [`ViewportCommand`] values that the synchronizer
//! forwards, which keeps every fit decision unit-testable.

use serde::Serialize;

use crate::{Bounds, Coordinate};

/// Uniform viewport padding in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Padding(pub u32);

/// Whether a viewport change is applied instantly or eased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Animation {
    /// Jump without a visible transition. Used for initial loads, which
    /// should not visibly pan or zoom.
    None,
    /// Short eased transition.
    Ease { duration_ms: u32 },
}

/// A camera command for the mapping surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewportCommand {
    /// Fit the viewport to a bounding box.
    FitBounds {
        bounds: Bounds,
        padding: Padding,
        /// Upper zoom bound, so near-duplicate coordinates never over-zoom
        max_zoom: f64,
        animation: Animation,
    },
    /// Ease the viewport center to a point at the given zoom.
    EaseTo {
        center: Coordinate,
        zoom: f64,
        animation: Animation,
    },
}

/// Configuration for viewport fitting.
#[derive(Debug, Clone)]
pub struct ViewportConfig {
    /// Viewport widths below this use the mobile padding.
    /// Default: 768
    pub mobile_breakpoint_px: u32,

    /// Padding for marker-set fits on narrow viewports. Default: 24
    pub padding_mobile: Padding,

    /// Padding for marker-set fits on wide viewports. Default: 64
    pub padding_desktop: Padding,

    /// Padding for the two-point route-reveal fit. Default: 80
    pub padding_reveal: Padding,

    /// Zoom clamp for multi-point fits. Default: 16.0
    pub max_fit_zoom: f64,

    /// Floor for single-point focus zoom; focusing never zooms out below
    /// the current level. Default: 15.0
    pub min_focus_zoom: f64,

    /// Duration of the route-reveal transition. Default: 600
    pub reveal_duration_ms: u32,

    /// Duration of the single-point focus transition. Default: 400
    pub focus_duration_ms: u32,

    /// Fallback region covering the whole service area, used when zero
    /// points have usable coordinates.
    pub service_area: Bounds,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint_px: 768,
            padding_mobile: Padding(24),
            padding_desktop: Padding(64),
            padding_reveal: Padding(80),
            max_fit_zoom: 16.0,
            min_focus_zoom: 15.0,
            reveal_duration_ms: 600,
            focus_duration_ms: 400,
            // The covered province
            service_area: Bounds {
                min_lat: -3.58,
                max_lat: -2.42,
                min_lng: -79.85,
                max_lng: -78.55,
            },
        }
    }
}

impl ViewportConfig {
    /// Padding for a marker-set fit at the given viewport width.
    pub fn responsive_padding(&self, viewport_width_px: u32) -> Padding {
        if viewport_width_px < self.mobile_breakpoint_px {
            self.padding_mobile
        } else {
            self.padding_desktop
        }
    }
}

/// Fit the viewport to a marker set.
///
/// Computes the minimal bounding box over the usable coordinates, applies
/// responsive padding, and requests an instantaneous fit. With zero usable
/// points, falls back to the fixed service-area region rather than leaving
/// the viewport undefined.
pub fn fit_markers(
    points: &[Coordinate],
    viewport_width_px: u32,
    config: &ViewportConfig,
) -> ViewportCommand {
    let bounds = Bounds::from_points(points).unwrap_or(config.service_area);
    ViewportCommand::FitBounds {
        bounds,
        padding: config.responsive_padding(viewport_width_px),
        max_zoom: config.max_fit_zoom,
        animation: Animation::None,
    }
}

/// Fit the viewport over a user location and one destination.
///
/// This path is triggered by an explicit user action ("show me how to get
/// there"), so the transition is animated.
pub fn fit_route_reveal(
    user: Coordinate,
    destination: Coordinate,
    config: &ViewportConfig,
) -> ViewportCommand {
    let bounds = Bounds::from_points(&[user, destination]).unwrap_or(config.service_area);
    ViewportCommand::FitBounds {
        bounds,
        padding: config.padding_reveal,
        max_zoom: config.max_fit_zoom,
        animation: Animation::Ease {
            duration_ms: config.reveal_duration_ms,
        },
    }
}

/// Ease the viewport center to one selected entity.
///
/// The target zoom is never below the current zoom: focusing an entity must
/// not zoom the map out.
pub fn focus_point(
    point: Coordinate,
    current_zoom: f64,
    config: &ViewportConfig,
) -> ViewportCommand {
    ViewportCommand::EaseTo {
        center: point,
        zoom: current_zoom.max(config.min_focus_zoom),
        animation: Animation::Ease {
            duration_ms: config.focus_duration_ms,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_fit_is_instant() {
        let config = ViewportConfig::default();
        let points = vec![Coordinate::new(-2.90, -79.01), Coordinate::new(-2.88, -78.99)];

        let cmd = fit_markers(&points, 1280, &config);
        match cmd {
            ViewportCommand::FitBounds {
                bounds,
                padding,
                max_zoom,
                animation,
            } => {
                assert_eq!(bounds.min_lat, -2.90);
                assert_eq!(bounds.max_lat, -2.88);
                assert_eq!(padding, config.padding_desktop);
                assert_eq!(max_zoom, config.max_fit_zoom);
                assert_eq!(animation, Animation::None);
            }
            other => panic!("expected FitBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_responsive_padding() {
        let config = ViewportConfig::default();
        assert_eq!(config.responsive_padding(360), config.padding_mobile);
        assert_eq!(config.responsive_padding(767), config.padding_mobile);
        assert_eq!(config.responsive_padding(768), config.padding_desktop);
        assert_eq!(config.responsive_padding(1920), config.padding_desktop);
    }

    #[test]
    fn test_empty_set_falls_back_to_service_area() {
        let config = ViewportConfig::default();
        let cmd = fit_markers(&[], 1280, &config);
        match cmd {
            ViewportCommand::FitBounds { bounds, animation, .. } => {
                assert_eq!(bounds, config.service_area);
                assert_eq!(animation, Animation::None);
            }
            other => panic!("expected FitBounds, got {:?}", other),
        }

        // Unusable coordinates count as absent
        let cmd = fit_markers(&[Coordinate::new(f64::NAN, 0.0)], 1280, &config);
        assert!(matches!(
            cmd,
            ViewportCommand::FitBounds { bounds, .. } if bounds == config.service_area
        ));
    }

    #[test]
    fn test_route_reveal_is_animated() {
        let config = ViewportConfig::default();
        let user = Coordinate::new(-2.90, -79.01);
        let dest = Coordinate::new(-2.88, -78.99);

        let cmd = fit_route_reveal(user, dest, &config);
        match cmd {
            ViewportCommand::FitBounds {
                bounds,
                padding,
                animation,
                ..
            } => {
                assert_eq!(bounds, Bounds::from_points(&[user, dest]).unwrap());
                assert_eq!(padding, config.padding_reveal);
                assert_eq!(
                    animation,
                    Animation::Ease {
                        duration_ms: config.reveal_duration_ms
                    }
                );
            }
            other => panic!("expected FitBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_focus_never_zooms_out() {
        let config = ViewportConfig::default();
        let point = Coordinate::new(-2.8974, -79.0045);

        // Current zoom below the focus floor: raise to the floor
        match focus_point(point, 12.0, &config) {
            ViewportCommand::EaseTo { zoom, .. } => assert_eq!(zoom, config.min_focus_zoom),
            other => panic!("expected EaseTo, got {:?}", other),
        }

        // Current zoom above the floor: keep it
        match focus_point(point, 17.5, &config) {
            ViewportCommand::EaseTo { center, zoom, animation } => {
                assert_eq!(center, point);
                assert_eq!(zoom, 17.5);
                assert_eq!(
                    animation,
                    Animation::Ease {
                        duration_ms: config.focus_duration_ms
                    }
                );
            }
            other => panic!("expected EaseTo, got {:?}", other),
        }
    }
}
