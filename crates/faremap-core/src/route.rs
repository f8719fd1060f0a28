#![forbid(unsafe_code)]

//! Precomputed-route rendering.
//!
//! A seeded route is drawn as two stacked polylines over the same points: a
//! wide black underlay and a narrow white core on top, which reads as a
//! black-bordered white line. Both are removed together — the pair is a
//! single visual and must never be torn down half-way.

use serde::Serialize;

use crate::error::SurfaceError;
use crate::geo::RouteGeometry;
use crate::surface::{FitOptions, MapSurface, PathId, StrokeStyle};

/// Wide black base stroke.
pub const UNDERLAY_STYLE: StrokeStyle = StrokeStyle::solid("#000000", 12.0, 1.0);

/// Narrow white core drawn on top of the underlay.
pub const CORE_STYLE: StrokeStyle = StrokeStyle::solid("#ffffff", 4.0, 1.0);

/// Viewport fit applied after drawing a route.
pub const ROUTE_FIT: FitOptions = FitOptions {
    padding_px: 30.0,
    max_zoom: 16,
};

/// Handles for the two strokes of one rendered route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteHandles {
    pub underlay: PathId,
    pub core: PathId,
}

/// Draw both strokes (underlay first, so the core lands on top) and fit the
/// viewport to the route.
pub fn draw<S: MapSurface>(
    surface: &mut S,
    geometry: &RouteGeometry,
) -> Result<RouteHandles, SurfaceError> {
    let underlay = surface.draw_path(geometry.points(), &UNDERLAY_STYLE)?;
    let core = surface.draw_path(geometry.points(), &CORE_STYLE)?;
    surface.fit_bounds(geometry.bounds(), ROUTE_FIT)?;
    Ok(RouteHandles { underlay, core })
}

/// Remove both strokes.
pub fn remove<S: MapSurface>(
    surface: &mut S,
    handles: RouteHandles,
) -> Result<(), SurfaceError> {
    surface.remove_path(handles.core)?;
    surface.remove_path(handles.underlay)
}

/// Popup bound to the route line when the page supplied a distance label.
#[must_use]
pub fn info_popup_html(distance_label: &str) -> String {
    format!(
        concat!(
            r#"<div class="popup-content text-center">"#,
            r#"<h6><i class="fas fa-route"></i> Route Information</h6>"#,
            r#"<p><strong>Distance:</strong> {label}</p>"#,
            r#"<small class="text-muted">Use "Start New Trip" to modify</small>"#,
            r#"</div>"#
        ),
        label = distance_label
    )
}
