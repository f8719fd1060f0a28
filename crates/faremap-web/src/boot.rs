#![forbid(unsafe_code)]

//! Startup planning shared by the wasm entry point and native tests.
//!
//! The host page hands `init` an optional JSON seed string. [`BootPlan`]
//! turns that raw input into a validated [`PageSeed`] plus the handful of
//! values the wasm layer needs before the core app exists: the map container
//! id, the initial viewport, and when to fire the scroll-deadline poll.

use faremap_core::config::PageSeed;
use faremap_core::error::Error;

/// Element id of the map container the page template provides.
pub(crate) const MAP_CONTAINER_ID: &str = "map";

/// Extra delay added to the gate budget before the deadline poll fires, so
/// timer jitter cannot land the poll just before the budget elapses.
pub(crate) const DEADLINE_POLL_SLACK_MS: u64 = 50;

/// Validated startup inputs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BootPlan {
    seed: PageSeed,
}

impl BootPlan {
    /// Build a plan from the raw seed string the page embeds.
    ///
    /// A missing or blank seed yields the default plan (interactive page, no
    /// precomputed route). Anything else must parse and validate, otherwise
    /// startup aborts with the config error.
    pub(crate) fn from_raw(raw: Option<&str>) -> Result<Self, Error> {
        let seed = match raw.map(str::trim) {
            None | Some("") => PageSeed::default(),
            Some(json) => PageSeed::from_json_str(json)?,
        };
        Ok(Self { seed })
    }

    #[cfg(test)]
    pub(crate) fn seed(&self) -> &PageSeed {
        &self.seed
    }

    /// Initial map center as `[lat, lng]`.
    pub(crate) fn map_center(&self) -> [f64; 2] {
        self.seed.center
    }

    pub(crate) fn map_zoom(&self) -> u8 {
        self.seed.zoom
    }

    /// Milliseconds after `init` at which the scroll-deadline poll should
    /// run. Slightly past the gate budget so the poll always observes an
    /// elapsed gate rather than racing it.
    pub(crate) fn poll_after_ms(&self) -> u64 {
        self.seed.results_wait_ms + DEADLINE_POLL_SLACK_MS
    }

    pub(crate) fn into_seed(self) -> PageSeed {
        self.seed
    }
}
