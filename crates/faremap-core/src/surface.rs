#![forbid(unsafe_code)]

//! Map-surface seam.
//!
//! [`MapSurface`] is the only way the trip logic touches the map. The web
//! crate implements it over Leaflet; native tests implement it over an
//! in-memory fake. Handles ([`MarkerId`], [`PathId`], [`OverlayId`]) are
//! opaque tokens issued by the surface — the core never assumes anything
//! about their values beyond equality.
//!
//! # Design
//!
//! - Every mutation returns `Result` so a torn-down or misbehaving backend
//!   degrades into a logged diagnostic instead of a panic.
//! - Styles are plain `Copy` structs with `const` constructors; callers keep
//!   them in `const` tables next to the feature that owns them.

use serde::Serialize;

use crate::error::SurfaceError;
use crate::geo::{GeoBounds, LatLng};
use crate::markers::MarkerIcon;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque handle for a placed marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerId(pub u32);

/// Opaque handle for a drawn polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PathId(pub u32);

/// Opaque handle for an overlay layer (the city boundary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OverlayId(pub u32);

// ---------------------------------------------------------------------------
// Styles and options
// ---------------------------------------------------------------------------

/// Stroke styling for paths and boundary rings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// CSS color string.
    pub color: &'static str,
    /// Stroke width in pixels.
    pub weight_px: f64,
    /// Stroke opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Dash pattern (`"10, 20"`), or `None` for a solid line.
    pub dash_pattern: Option<&'static str>,
    /// Square line caps and joins instead of the renderer default.
    pub square_ends: bool,
}

impl StrokeStyle {
    /// Solid stroke with default caps.
    #[must_use]
    pub const fn solid(color: &'static str, weight_px: f64, opacity: f64) -> Self {
        Self {
            color,
            weight_px,
            opacity,
            dash_pattern: None,
            square_ends: false,
        }
    }
}

/// Options for fitting the viewport to a bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Uniform padding around the bounds, in pixels.
    pub padding_px: f64,
    /// Zoom ceiling applied after the fit.
    pub max_zoom: u8,
}

impl FitOptions {
    pub const DEFAULT: Self = Self {
        padding_px: 30.0,
        max_zoom: 16,
    };
}

impl Default for FitOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Corner slot for a custom map control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// A one-button map control dispatching a [`UiAction`](crate::actions::UiAction).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSpec {
    pub label: &'static str,
    pub position: ControlPosition,
    pub action: crate::actions::UiAction,
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Rendering backend for markers, paths, and overlays.
pub trait MapSurface {
    fn add_marker(
        &mut self,
        position: LatLng,
        icon: &MarkerIcon,
        draggable: bool,
    ) -> Result<MarkerId, SurfaceError>;

    fn move_marker(&mut self, id: MarkerId, position: LatLng) -> Result<(), SurfaceError>;

    fn remove_marker(&mut self, id: MarkerId) -> Result<(), SurfaceError>;

    fn set_marker_draggable(&mut self, id: MarkerId, draggable: bool)
    -> Result<(), SurfaceError>;

    fn set_marker_icon(&mut self, id: MarkerId, icon: &MarkerIcon) -> Result<(), SurfaceError>;

    fn bind_marker_popup(&mut self, id: MarkerId, html: &str) -> Result<(), SurfaceError>;

    fn open_marker_popup(&mut self, id: MarkerId) -> Result<(), SurfaceError>;

    fn draw_path(
        &mut self,
        points: &[LatLng],
        style: &StrokeStyle,
    ) -> Result<PathId, SurfaceError>;

    fn remove_path(&mut self, id: PathId) -> Result<(), SurfaceError>;

    fn bind_path_popup(&mut self, id: PathId, html: &str) -> Result<(), SurfaceError>;

    fn fit_bounds(&mut self, bounds: GeoBounds, options: FitOptions) -> Result<(), SurfaceError>;

    /// Register a boundary ring. The overlay starts hidden; callers show it
    /// with [`MapSurface::set_boundary_visible`].
    fn add_boundary(
        &mut self,
        ring: &[LatLng],
        style: &StrokeStyle,
    ) -> Result<OverlayId, SurfaceError>;

    fn set_boundary_visible(&mut self, id: OverlayId, visible: bool) -> Result<(), SurfaceError>;

    fn add_corner_control(&mut self, spec: &ControlSpec) -> Result<(), SurfaceError>;
}
