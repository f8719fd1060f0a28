#![forbid(unsafe_code)]

//! The interaction app: one owned state object coordinating the selection
//! machine, the marker board, the form, and the map surface.
//!
//! # Design
//!
//! [`FareMap`] owns everything — surface, page, seed, selection, markers,
//! route handles, the readiness gate, and the diagnostics ring. Handlers are
//! plain methods the host calls with already-decoded arguments; nothing in
//! here touches a DOM API or a map API except through the two seams.
//!
//! # Handler Policy
//!
//! `init` is the only fallible entry point: seed and binding problems abort
//! startup with a typed error. Every other handler fails silently — a seam
//! error is logged, recorded in the diagnostics ring, and the handler returns
//! with the remaining work done where it still makes sense. The selection
//! state is the single source of truth, so a cosmetic failure (say, a marker
//! that refused to draw) never blocks the fields or the status panel.

use std::collections::VecDeque;

use serde::Serialize;
use web_time::Instant;

#[cfg(feature = "tracing")]
use crate::logging::{debug, warn};
#[cfg(not(feature = "tracing"))]
use crate::{debug, warn};

use crate::bindings::{HostPage, ViewId, validate_bindings};
use crate::config::PageSeed;
use crate::error::{Error, Result};
use crate::form;
use crate::geo::{LatLng, RouteGeometry};
use crate::markers::{MarkerBoard, MarkerIcon, endpoint_popup_html};
use crate::overlay;
use crate::progress::{self, ProgressInputs};
use crate::route::{self, RouteHandles};
use crate::scroll::{ArmReason, GateAction, ResultsGate, results_scroll_top};
use crate::selection::{
    ClearOutcome, ClickOutcome, DragOutcome, EndpointKind, LockOutcome, TripPhase, TripSelection,
};
use crate::surface::{MapSurface, OverlayId};

/// Body class applied while the trip is locked behind an estimate.
pub const LOCKED_BODY_CLASS: &str = "prediction-locked";

/// Passenger count restored on load and on a full reset.
pub const DEFAULT_PASSENGER_COUNT: u8 = 1;

/// Largest passenger count the quick-select accepts.
pub const MAX_PASSENGER_COUNT: u8 = 6;

/// Diagnostics ring capacity; older records are dropped first.
pub const MAX_DIAGNOSTICS: usize = 64;

/// One degraded-handler record for the drain API.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    pub handler: &'static str,
    pub error_type: &'static str,
    pub message: String,
}

/// Serializable view of the app state, for `stateJson` and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub phase: TripPhase,
    pub pickup: Option<LatLng>,
    pub dropoff: Option<LatLng>,
    pub locked: bool,
    pub markers_placed: usize,
    pub route_drawn: bool,
    pub boundary_visible: bool,
    pub gate: &'static str,
    pub diagnostics_pending: usize,
}

/// The browser-side fare-form app, generic over its two seams.
pub struct FareMap<S, P> {
    surface: S,
    page: P,
    seed: PageSeed,
    selection: TripSelection,
    board: MarkerBoard,
    route: Option<RouteHandles>,
    boundary: Option<OverlayId>,
    boundary_visible: bool,
    gate: ResultsGate,
    diagnostics: VecDeque<DiagnosticRecord>,
}

impl<S: MapSurface, P: HostPage> FareMap<S, P> {
    /// Wrap the seams and a validated seed. Nothing happens until
    /// [`FareMap::init`].
    #[must_use]
    pub fn new(surface: S, page: P, seed: PageSeed) -> Self {
        let gate = ResultsGate::from_millis(seed.results_wait_ms);
        Self {
            surface,
            page,
            seed,
            selection: TripSelection::new(),
            board: MarkerBoard::new(),
            route: None,
            boundary: None,
            boundary_visible: false,
            gate,
            diagnostics: VecDeque::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Startup
    // -----------------------------------------------------------------------

    /// Resolve bindings, paint defaults, install the boundary, and apply any
    /// seeded route. Binding failures abort with the full missing-id list;
    /// seam failures past that point degrade per the handler policy.
    pub fn init(&mut self, now: Instant) -> Result<()> {
        validate_bindings(&self.page).map_err(Error::from)?;

        let applied = form::apply_default_date(&mut self.page, self.seed.default_date.as_deref());
        self.soft("init", applied);
        self.set_passengers(DEFAULT_PASSENGER_COUNT);

        if self.seed.boundary_enabled {
            let installed = overlay::install(&mut self.surface);
            self.boundary = self.soft("init", installed);
        }

        if let Some(pairs) = self.seed.route.clone() {
            self.apply_seed_route(&pairs, now);
        }

        self.refresh_status();
        // A seeded route may already have armed the lock fallback.
        self.gate.arm_if_idle(ArmReason::PageLoad, now);
        debug!(
            phase = self.selection.phase().as_str(),
            route = self.route.is_some(),
            "init complete"
        );
        Ok(())
    }

    fn apply_seed_route(&mut self, pairs: &[[f64; 2]], now: Instant) {
        let geometry = match RouteGeometry::from_pairs(pairs) {
            Ok(geometry) => geometry,
            Err(err) => {
                self.record("seed_route", err.into());
                return;
            }
        };

        let drawn = route::draw(&mut self.surface, &geometry);
        let Some(handles) = self.soft("seed_route", drawn) else {
            return;
        };
        self.route = Some(handles);

        self.seed_endpoint(EndpointKind::Pickup, geometry.pickup());
        self.seed_endpoint(EndpointKind::Dropoff, geometry.dropoff());
        self.lock_trip(now);

        if let Some(label) = self.seed.distance_label.clone() {
            let bound = self
                .surface
                .bind_path_popup(handles.underlay, &route::info_popup_html(&label));
            self.soft("seed_route", bound);
        }
    }

    fn seed_endpoint(&mut self, kind: EndpointKind, position: LatLng) {
        if !self.selection.set_endpoint(kind, position) {
            return;
        }
        self.place_endpoint("seed_route", kind, position, false);
    }

    // -----------------------------------------------------------------------
    // Map events
    // -----------------------------------------------------------------------

    /// A click on the map: first fills pickup, second fills dropoff, anything
    /// after that is ignored.
    pub fn on_map_click(&mut self, lat: f64, lng: f64) {
        if !lat.is_finite() || !lng.is_finite() {
            warn!(lat, lng, "map click with non-finite coordinates dropped");
            return;
        }
        let position = LatLng::new(lat, lng);
        match self.selection.click(position) {
            ClickOutcome::PlacedPickup(position) => {
                self.place_endpoint("map_click", EndpointKind::Pickup, position, true);
            }
            ClickOutcome::PlacedDropoff(position) => {
                self.place_endpoint("map_click", EndpointKind::Dropoff, position, true);
            }
            ClickOutcome::Ignored => {
                debug!(phase = self.selection.phase().as_str(), "map click ignored");
            }
        }
    }

    /// A marker finished dragging. The lock check lives in the selection
    /// machine; a rejected drag snaps the marker back to the stored position.
    pub fn on_marker_drag_end(&mut self, kind: EndpointKind, lat: f64, lng: f64) {
        if !lat.is_finite() || !lng.is_finite() {
            warn!(lat, lng, "drag end with non-finite coordinates dropped");
            return;
        }
        match self.selection.drag_end(kind, LatLng::new(lat, lng)) {
            DragOutcome::Moved(kind, position) => {
                self.board.move_to(kind, position);
                let wrote = form::write_endpoint_fields(&mut self.page, kind, position);
                self.soft("marker_drag", wrote);
                self.refresh_status();
            }
            DragOutcome::RejectedLocked => {
                if let (Some(slot), Some(position)) =
                    (self.board.slot(kind).copied(), self.selection.endpoint(kind))
                {
                    let snapped = self.surface.move_marker(slot.id, position);
                    self.soft("marker_drag", snapped);
                }
                debug!(endpoint = kind.as_str(), "drag rejected while locked");
            }
            DragOutcome::NoSuchEndpoint => {
                debug!(endpoint = kind.as_str(), "stale drag end dropped");
            }
        }
    }

    fn place_endpoint(
        &mut self,
        handler: &'static str,
        kind: EndpointKind,
        position: LatLng,
        open_popup: bool,
    ) {
        let icon = MarkerIcon::new(kind, false);
        let added = self.surface.add_marker(position, &icon, true);
        if let Some(id) = self.soft(handler, added) {
            self.board.place(kind, id, position);
            let bound = self.surface.bind_marker_popup(id, &endpoint_popup_html(kind));
            self.soft(handler, bound);
            if open_popup {
                let opened = self.surface.open_marker_popup(id);
                self.soft(handler, opened);
            }
        }
        let wrote = form::write_endpoint_fields(&mut self.page, kind, position);
        self.soft(handler, wrote);
        self.refresh_status();
    }

    // -----------------------------------------------------------------------
    // Resets
    // -----------------------------------------------------------------------

    pub fn reset_pickup(&mut self) {
        self.reset_endpoint(EndpointKind::Pickup);
    }

    pub fn reset_dropoff(&mut self) {
        self.reset_endpoint(EndpointKind::Dropoff);
    }

    fn reset_endpoint(&mut self, kind: EndpointKind) {
        match self.selection.clear(kind) {
            ClearOutcome::Cleared => {
                if let Some(slot) = self.board.take(kind) {
                    let removed = self.surface.remove_marker(slot.id);
                    self.soft("reset_endpoint", removed);
                }
                let cleared = form::clear_endpoint_fields(&mut self.page, kind);
                self.soft("reset_endpoint", cleared);
                // Removing either endpoint invalidates the route, so both
                // strokes come down together.
                self.remove_route_strokes();
                self.refresh_status();
            }
            ClearOutcome::AlreadyEmpty => {
                debug!(endpoint = kind.as_str(), "reset on empty endpoint");
            }
            ClearOutcome::RejectedLocked => {
                debug!(endpoint = kind.as_str(), "reset rejected while locked");
            }
        }
    }

    fn remove_route_strokes(&mut self) {
        if let Some(handles) = self.route.take() {
            let removed = route::remove(&mut self.surface, handles);
            self.soft("reset_endpoint", removed);
        }
    }

    /// "Start New Trip": unlock, clear both endpoints, restore schedule and
    /// passenger defaults, return the submit button to idle, hide any results
    /// block, and scroll back to the top of the panel.
    pub fn start_new_trip(&mut self) {
        self.unlock_trip();
        self.reset_endpoint(EndpointKind::Pickup);
        self.reset_endpoint(EndpointKind::Dropoff);

        let date = self.seed.default_date.clone();
        let restored = form::restore_schedule_defaults(&mut self.page, date.as_deref());
        self.soft("new_trip", restored);
        self.set_passengers(DEFAULT_PASSENGER_COUNT);

        let idled = form::apply_submit_idle(&mut self.page);
        self.soft("new_trip", idled);
        let overlay_removed = self.page.remove_loading_overlay();
        self.soft("new_trip", overlay_removed);

        if self.page.element_exists(ViewId::ResultsSection) {
            let hidden = self.page.set_display(ViewId::ResultsSection, "none");
            self.soft("new_trip", hidden);
        }

        self.gate.reset();
        self.refresh_progress();
        self.page.scroll_to_top();
    }

    // -----------------------------------------------------------------------
    // Lock lifecycle
    // -----------------------------------------------------------------------

    /// Freeze the selection behind an estimate: disable dragging, switch the
    /// markers to their locked icons, and arm the fallback scroll if the
    /// results section is not there yet.
    pub fn lock_trip(&mut self, now: Instant) {
        match self.selection.lock() {
            LockOutcome::Locked => {
                let classed = self.page.add_body_class(LOCKED_BODY_CLASS);
                self.soft("lock", classed);
                self.board.set_all_draggable(false);
                let live: Vec<_> = self.board.live().collect();
                for (kind, id) in live {
                    let frozen = self.surface.set_marker_draggable(id, false);
                    self.soft("lock", frozen);
                    let restyled = self
                        .surface
                        .set_marker_icon(id, &MarkerIcon::new(kind, true));
                    self.soft("lock", restyled);
                }
                self.refresh_progress();
                if !self.page.element_exists(ViewId::ResultsSection) {
                    self.gate.arm(ArmReason::Locked, now);
                }
            }
            LockOutcome::NotReady => {
                warn!("lock requested before both endpoints were set");
            }
            LockOutcome::AlreadyLocked => {
                debug!("duplicate lock request");
            }
        }
    }

    fn unlock_trip(&mut self) {
        self.selection.unlock();
        let classed = self.page.remove_body_class(LOCKED_BODY_CLASS);
        self.soft("unlock", classed);
        self.board.set_all_draggable(true);
        let live: Vec<_> = self.board.live().collect();
        for (kind, id) in live {
            let thawed = self.surface.set_marker_draggable(id, true);
            self.soft("unlock", thawed);
            let restyled = self
                .surface
                .set_marker_icon(id, &MarkerIcon::new(kind, false));
            self.soft("unlock", restyled);
        }
        self.refresh_progress();
    }

    // -----------------------------------------------------------------------
    // Form actions
    // -----------------------------------------------------------------------

    /// Select a passenger count. Values outside `1..=6` are logged and
    /// ignored.
    pub fn set_passengers(&mut self, count: u8) {
        if !(DEFAULT_PASSENGER_COUNT..=MAX_PASSENGER_COUNT).contains(&count) {
            warn!(count, "passenger count out of range ignored");
            return;
        }
        let applied = form::apply_passenger_count(&mut self.page, count);
        self.soft("set_passengers", applied);
        self.refresh_progress();
    }

    /// Flip boundary visibility. A failed surface call leaves the remembered
    /// visibility unchanged.
    pub fn toggle_boundary(&mut self) {
        let Some(id) = self.boundary else {
            warn!("boundary toggle with no overlay installed");
            return;
        };
        let target = !self.boundary_visible;
        let flipped = self.surface.set_boundary_visible(id, target);
        if self.soft("toggle_boundary", flipped).is_some() {
            self.boundary_visible = target;
        }
    }

    /// Enter the submitting presentation: disabled button, spinner, dimming
    /// overlay. Safe to call repeatedly; the overlay is created once.
    pub fn show_loading(&mut self) {
        let loading = form::apply_submit_loading(&mut self.page);
        self.soft("show_loading", loading);
        let shown = self.page.show_loading_overlay();
        self.soft("show_loading", shown);
    }

    // -----------------------------------------------------------------------
    // Results gate
    // -----------------------------------------------------------------------

    /// The host reports the results section is in the document.
    pub fn on_results_ready(&mut self, now: Instant) {
        if let Some(action) = self.gate.notify_ready(now) {
            self.run_gate_action(action);
        }
    }

    /// Timer callback: let the gate check its budget.
    pub fn poll_scroll_deadline(&mut self, now: Instant) {
        if let Some(action) = self.gate.poll_expiry(now) {
            self.run_gate_action(action);
        }
    }

    fn run_gate_action(&mut self, action: GateAction) {
        match action {
            GateAction::ScrollToResults => match self.page.results_section_offset() {
                Ok(offset) => {
                    let top = results_scroll_top(offset, self.page.sticky_header_height());
                    self.page.scroll_to(top);
                }
                Err(err) => self.record("results_scroll", err.into()),
            },
            GateAction::ScrollToBottom => self.page.scroll_to_bottom(),
        }
    }

    // -----------------------------------------------------------------------
    // Shared refresh
    // -----------------------------------------------------------------------

    fn refresh_status(&mut self) {
        let painted = form::apply_location_status(&mut self.page, &self.selection);
        self.soft("status", painted);
        self.refresh_progress();
    }

    fn refresh_progress(&mut self) {
        let inputs = match ProgressInputs::gather(&self.page, &self.selection) {
            Ok(inputs) => inputs,
            Err(err) => {
                self.record("progress", err.into());
                return;
            }
        };
        let applied = progress::apply(&mut self.page, progress::compute(inputs));
        self.soft("progress", applied);
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn phase(&self) -> TripPhase {
        self.selection.phase()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.selection.is_locked()
    }

    #[must_use]
    pub fn selection(&self) -> &TripSelection {
        &self.selection
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[must_use]
    pub fn page(&self) -> &P {
        &self.page
    }

    #[cfg(test)]
    pub(crate) fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            phase: self.selection.phase(),
            pickup: self.selection.pickup(),
            dropoff: self.selection.dropoff(),
            locked: self.selection.is_locked(),
            markers_placed: self.board.placed_count(),
            route_drawn: self.route.is_some(),
            boundary_visible: self.boundary_visible,
            gate: self.gate.state_label(),
            diagnostics_pending: self.diagnostics.len(),
        }
    }

    /// State snapshot as JSON. Serialization of the snapshot cannot fail for
    /// these field types; an empty object is the defensive fallback.
    #[must_use]
    pub fn state_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| String::from("{}"))
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn diagnostics_len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Drain pending diagnostics as JSON lines, oldest first.
    pub fn drain_diagnostics_jsonl(&mut self) -> String {
        let lines: Vec<String> = self
            .diagnostics
            .drain(..)
            .filter_map(|record| serde_json::to_string(&record).ok())
            .collect();
        lines.join("\n")
    }

    fn record(&mut self, handler: &'static str, err: Error) {
        warn!(
            handler,
            error_type = err.error_type(),
            error = %err,
            "handler degraded"
        );
        if self.diagnostics.len() == MAX_DIAGNOSTICS {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(DiagnosticRecord {
            handler,
            error_type: err.error_type(),
            message: err.to_string(),
        });
    }

    fn soft<T, E: Into<Error>>(
        &mut self,
        handler: &'static str,
        result: std::result::Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.record(handler, err.into());
                None
            }
        }
    }
}
