#![forbid(unsafe_code)]

//! WASM frontend for the FareMap fare-estimation page.
//!
//! This crate provides [`FareMapWeb`], a `wasm-bindgen`-exported struct that
//! wraps `faremap_core::FareMap` with a Leaflet map surface and a live DOM
//! page. JavaScript constructs it once, calls `init` with the seed JSON the
//! page template embeds, and from then on the struct owns every map and form
//! interaction; the host only forwards the few signals Rust cannot observe
//! on its own (server-injected results, explicit action calls).

/// Stable FareMapJS API semver for host-side compatibility checks.
///
/// This is intentionally distinct from crate/package semver.
pub const FAREMAP_JS_API_VERSION: &str = "1.0.0";

/// Exported method names, in the order the contract documents them.
pub const FAREMAP_JS_PUBLIC_METHODS: [&str; 14] = [
    "init",
    "mapClick",
    "markerDragEnd",
    "dispatchAction",
    "resetPickup",
    "resetDropoff",
    "startNewTrip",
    "setPassengers",
    "toggleBoundary",
    "showLoading",
    "resultsReady",
    "stateJson",
    "drainDiagnosticsJsonl",
    "apiVersion",
];

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod leaflet;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FareMapWeb;

// Boot planning is used by the wasm module and by native tests.
#[cfg(any(target_arch = "wasm32", test))]
mod boot;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::boot::{BootPlan, DEADLINE_POLL_SLACK_MS, MAP_CONTAINER_ID};
    use faremap_core::config::{DEFAULT_RESULTS_WAIT_MS, DEFAULT_ZOOM, PageSeed};
    use faremap_core::error::{Disposition, Error};

    #[test]
    fn missing_seed_boots_the_interactive_page() {
        let plan = BootPlan::from_raw(None).expect("default plan");
        assert_eq!(plan.seed(), &PageSeed::default());
        assert_eq!(plan.map_zoom(), DEFAULT_ZOOM);
        assert!(plan.seed().route.is_none());
    }

    #[test]
    fn blank_seed_is_treated_as_missing() {
        let plan = BootPlan::from_raw(Some("  \n  ")).expect("default plan");
        assert_eq!(plan.into_seed(), PageSeed::default());
    }

    #[test]
    fn seed_json_reaches_the_plan_intact() {
        let raw = r#"{
            "route": [[40.70, -74.00], [40.75, -73.98]],
            "distance_label": "4.2 km",
            "default_date": "2024-03-01",
            "zoom": 13
        }"#;
        let plan = BootPlan::from_raw(Some(raw)).expect("seeded plan");
        assert_eq!(plan.map_zoom(), 13);
        assert_eq!(plan.map_center(), faremap_core::config::DEFAULT_CENTER);
        let seed = plan.into_seed();
        assert_eq!(seed.route.as_ref().map(Vec::len), Some(2));
        assert_eq!(seed.distance_label.as_deref(), Some("4.2 km"));
    }

    #[test]
    fn malformed_seed_aborts_startup() {
        let err = BootPlan::from_raw(Some("{ not json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.disposition(), Disposition::AbortInit);
    }

    #[test]
    fn out_of_range_seed_aborts_startup() {
        let err = BootPlan::from_raw(Some(r#"{"zoom": 99}"#)).unwrap_err();
        assert_eq!(err.disposition(), Disposition::AbortInit);
    }

    #[test]
    fn poll_fires_after_the_gate_budget() {
        let plan = BootPlan::from_raw(None).expect("default plan");
        assert_eq!(
            plan.poll_after_ms(),
            DEFAULT_RESULTS_WAIT_MS + DEADLINE_POLL_SLACK_MS
        );

        let plan = BootPlan::from_raw(Some(r#"{"results_wait_ms": 1200}"#)).expect("plan");
        assert_eq!(plan.poll_after_ms(), 1200 + DEADLINE_POLL_SLACK_MS);
    }

    #[test]
    fn api_surface_is_declared() {
        assert!(!crate::FAREMAP_JS_API_VERSION.is_empty());
        assert!(crate::FAREMAP_JS_PUBLIC_METHODS.contains(&"init"));
        assert!(crate::FAREMAP_JS_PUBLIC_METHODS.contains(&"resultsReady"));
        // The container id is part of the page contract; a typo here breaks
        // every deployment at once.
        assert_eq!(MAP_CONTAINER_ID, "map");
    }
}
