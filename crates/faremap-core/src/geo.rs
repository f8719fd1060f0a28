#![forbid(unsafe_code)]

//! Geographic primitives: coordinates, bounding boxes, and validated route
//! geometry.
//!
//! Coordinates are plain WGS84 degrees. The core never projects or measures —
//! the mapping library owns screen-space math — so these types only need to
//! carry values faithfully and format them for the form contract: 6 decimal
//! places for hidden field storage, 4 for visible captions.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Storage form for hidden form fields: each component at 6 decimals.
    #[must_use]
    pub fn field_values(self) -> (String, String) {
        (format!("{:.6}", self.lat), format!("{:.6}", self.lng))
    }

    /// Display caption at 4 decimals, e.g. `40.7128, -74.0060`.
    #[must_use]
    pub fn caption(self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

/// Axis-aligned bounding box over coordinates.
///
/// Degenerate (single-point) bounds are legal; the surface's fit operation
/// handles them via its max-zoom clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    #[must_use]
    pub const fn from_point(point: LatLng) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south = self.south.min(point.lat);
        self.west = self.west.min(point.lng);
        self.north = self.north.max(point.lat);
        self.east = self.east.max(point.lng);
    }

    #[must_use]
    pub const fn southwest(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    #[must_use]
    pub const fn northeast(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }

    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}

/// An externally computed route: at least two finite coordinates, in travel
/// order. The first point is the pickup endpoint, the last the dropoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    points: Vec<LatLng>,
}

impl RouteGeometry {
    /// Validate a raw coordinate list into route geometry.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Result<Self, GeometryError> {
        if pairs.len() < 2 {
            return Err(GeometryError::TooFewPoints { count: pairs.len() });
        }
        let mut points = Vec::with_capacity(pairs.len());
        for (index, pair) in pairs.iter().enumerate() {
            let point = LatLng::from(*pair);
            if !point.is_finite() {
                return Err(GeometryError::NotFinite { index });
            }
            points.push(point);
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false // invariant: len >= 2
    }

    /// First coordinate (the pickup endpoint).
    #[must_use]
    pub fn pickup(&self) -> LatLng {
        self.points[0]
    }

    /// Last coordinate (the dropoff endpoint).
    #[must_use]
    pub fn dropoff(&self) -> LatLng {
        self.points[self.points.len() - 1]
    }

    /// Bounding box over every route coordinate.
    #[must_use]
    pub fn bounds(&self) -> GeoBounds {
        let mut bounds = GeoBounds::from_point(self.points[0]);
        for point in &self.points[1..] {
            bounds.extend(*point);
        }
        bounds
    }
}
