#![forbid(unsafe_code)]

//! Page-seed configuration.
//!
//! The host page embeds a small JSON object describing what the server
//! rendered: an optional precomputed route, the distance label for that
//! route, the default trip date, and viewport parameters. [`PageSeed`] is the
//! typed form of that object. Every field has a default, so an empty seed
//! (`{}`) yields the plain interactive page.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Fallback map center (lat, lng).
pub const DEFAULT_CENTER: [f64; 2] = [40.7128, -74.0060];

/// Fallback initial zoom.
pub const DEFAULT_ZOOM: u8 = 12;

/// Fallback budget for the results-section readiness gate.
pub const DEFAULT_RESULTS_WAIT_MS: u64 = 5_000;

/// Upper bound accepted for `results_wait_ms`.
pub const MAX_RESULTS_WAIT_MS: u64 = 60_000;

/// Upper bound accepted for the initial zoom level.
pub const MAX_ZOOM_LEVEL: u8 = 20;

/// Server-rendered page state, decoded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSeed {
    /// Precomputed route as `[lat, lng]` pairs, endpoints first and last.
    /// `None` (or fewer than two points after validation) means no route.
    #[serde(default)]
    pub route: Option<Vec<[f64; 2]>>,
    /// Preformatted distance text shown in the route popup (e.g. `"4.2 km"`).
    #[serde(default)]
    pub distance_label: Option<String>,
    /// Default value restored into the date field on a full reset.
    #[serde(default)]
    pub default_date: Option<String>,
    /// Initial map center as `[lat, lng]`.
    #[serde(default = "default_center")]
    pub center: [f64; 2],
    /// Initial zoom level.
    #[serde(default = "default_zoom")]
    pub zoom: u8,
    /// Budget for the results readiness gate before falling back to a
    /// bottom-of-page scroll.
    #[serde(default = "default_results_wait")]
    pub results_wait_ms: u64,
    /// Whether to install the city boundary overlay and its toggle control.
    /// The overlay itself starts hidden; the toggle shows it.
    #[serde(default = "default_true")]
    pub boundary_enabled: bool,
}

fn default_center() -> [f64; 2] {
    DEFAULT_CENTER
}

fn default_zoom() -> u8 {
    DEFAULT_ZOOM
}

fn default_results_wait() -> u64 {
    DEFAULT_RESULTS_WAIT_MS
}

fn default_true() -> bool {
    true
}

impl Default for PageSeed {
    fn default() -> Self {
        Self {
            route: None,
            distance_label: None,
            default_date: None,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            results_wait_ms: DEFAULT_RESULTS_WAIT_MS,
            boundary_enabled: true,
        }
    }
}

impl PageSeed {
    /// Decode a seed from the JSON the page template embeds.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let seed: Self = serde_json::from_str(raw)?;
        seed.validated()
    }

    /// Check every field against its accepted range, consuming `self` so a
    /// validated seed is the only kind callers can hold onto.
    pub fn validated(self) -> Result<Self, ConfigError> {
        if let Some(route) = &self.route {
            if route.len() < 2 {
                return Err(ConfigError::RouteTooShort {
                    points: route.len(),
                });
            }
            for (index, pair) in route.iter().enumerate() {
                if !pair[0].is_finite() || !pair[1].is_finite() {
                    return Err(ConfigError::RouteNotFinite { index });
                }
            }
        }
        if !self.center[0].is_finite() || !self.center[1].is_finite() {
            return Err(ConfigError::CenterNotFinite);
        }
        if self.zoom > MAX_ZOOM_LEVEL {
            return Err(ConfigError::InvalidZoom { zoom: self.zoom });
        }
        if self.results_wait_ms == 0 || self.results_wait_ms > MAX_RESULTS_WAIT_MS {
            return Err(ConfigError::InvalidWaitBudget {
                ms: self.results_wait_ms,
            });
        }
        Ok(self)
    }

    /// Whether a usable route was injected.
    #[must_use]
    pub fn has_route(&self) -> bool {
        self.route.as_ref().is_some_and(|route| route.len() >= 2)
    }

    #[must_use]
    pub fn with_route(mut self, route: Vec<[f64; 2]>) -> Self {
        self.route = Some(route);
        self
    }

    #[must_use]
    pub fn with_distance_label(mut self, label: impl Into<String>) -> Self {
        self.distance_label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_default_date(mut self, date: impl Into<String>) -> Self {
        self.default_date = Some(date.into());
        self
    }

    #[must_use]
    pub fn with_center(mut self, center: [f64; 2]) -> Self {
        self.center = center;
        self
    }

    #[must_use]
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    #[must_use]
    pub fn with_wait_budget(mut self, ms: u64) -> Self {
        self.results_wait_ms = ms;
        self
    }
}
