//! The mapping-surface command interface.
//!
//! The third-party interactive map (tile rendering, pan/zoom, marker and
//! popup primitives) is an external collaborator. The engine only issues
//! commands to it through this narrow trait, which keeps the computational
//! components pure and lets tests inject a recording double instead of a
//! real rendering surface.

use serde::Serialize;

use crate::viewport::{Animation, Padding};
use crate::{Bounds, Coordinate};

/// Visual style for a marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    /// Marker diameter in pixels
    pub size_px: u32,
    /// CSS-style fill color
    pub color: String,
    /// Accent ring for the selected entity
    pub highlighted: bool,
}

impl MarkerStyle {
    /// Style for an unselected marker in the given color.
    pub fn plain(color: &str) -> Self {
        Self {
            size_px: 12,
            color: color.to_string(),
            highlighted: false,
        }
    }

    /// Style for the selected marker: larger, with the accent ring.
    pub fn selected(color: &str) -> Self {
        Self {
            size_px: 18,
            color: color.to_string(),
            highlighted: true,
        }
    }
}

/// Visual style for a polyline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolylineStyle {
    /// Line width in pixels
    pub width_px: u32,
    /// CSS-style stroke color
    pub color: String,
}

/// Commands the engine issues to the external mapping surface.
///
/// Implementations are expected to be cheap imperative wrappers around the
/// real map component. Marker and polyline names are stable keys:
/// re-issuing `draw_polyline` with an existing name replaces that polyline.
pub trait MapSurface {
    /// Add (or replace) a marker at a coordinate.
    fn add_marker(&mut self, id: &str, at: Coordinate, style: MarkerStyle, popup: Option<String>);

    /// Remove a marker; unknown ids are a no-op.
    fn remove_marker(&mut self, id: &str);

    /// Open the popup attached to a marker, if any.
    fn open_popup(&mut self, id: &str);

    /// Draw (or replace) a named polyline over an ordered coordinate list.
    fn draw_polyline(&mut self, name: &str, points: &[Coordinate], style: PolylineStyle);

    /// Remove a named polyline; unknown names are a no-op.
    fn remove_polyline(&mut self, name: &str);

    /// Set the viewport to a bounding box with padding.
    fn fit_bounds(&mut self, bounds: Bounds, padding: Padding, max_zoom: f64, animation: Animation);

    /// Ease the viewport center to a point at a given zoom.
    fn ease_to(&mut self, center: Coordinate, zoom: f64, animation: Animation);
}

// ============================================================================
// Recording double for tests
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_styles() {
        let plain = MarkerStyle::plain("#2980b9");
        let selected = MarkerStyle::selected("#2980b9");
        assert!(!plain.highlighted);
        assert!(selected.highlighted);
        assert!(selected.size_px > plain.size_px);
        assert_eq!(plain.color, selected.color);
    }
}
