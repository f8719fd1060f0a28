#![forbid(unsafe_code)]

//! Location-selection state machine: pickup/dropoff lifecycle and the lock
//! that freezes them once an estimate exists.
//!
//! # State Machine
//!
//! ```text
//! Empty --click--> PickupSet --click--> BothSet --lock--> Locked
//!   ^                                     |
//!   +------------ begin_new_trip ---------+   (from any state)
//! ```
//!
//! The stored truth is two optional endpoints plus the lock flag; the named
//! phase is derived. `DropoffSet` (dropoff without pickup) is reachable only
//! by clearing pickup while both were set — the next click fills the pickup
//! slot again, mirroring the placement order rule.
//!
//! # Invariants
//!
//! 1. `Locked` implies both endpoints are set.
//! 2. A click fills the pickup slot first, then the dropoff slot, never a
//!    third point.
//! 3. While locked, nothing but [`TripSelection::begin_new_trip`] mutates the
//!    endpoints. Drag-end and clear requests are rejected here, in the
//!    transition methods themselves; callers get a typed rejection instead of
//!    relying on the surface having disabled dragging.
//! 4. Rejected transitions leave the state bit-for-bit unchanged.

use serde::Serialize;

use crate::geo::LatLng;

// ---------------------------------------------------------------------------
// Kinds and phases
// ---------------------------------------------------------------------------

/// Which trip endpoint a marker, field pair, or handler refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    Pickup,
    Dropoff,
}

impl EndpointKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Dropoff => "dropoff",
        }
    }
}

/// Derived phase of the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TripPhase {
    Empty,
    PickupSet,
    DropoffSet,
    BothSet,
    Locked,
}

impl TripPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::PickupSet => "pickup_set",
            Self::DropoffSet => "dropoff_set",
            Self::BothSet => "both_set",
            Self::Locked => "locked",
        }
    }
}

// ---------------------------------------------------------------------------
// Transition outcomes
// ---------------------------------------------------------------------------

/// Result of a map click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    /// The click filled the pickup slot.
    PlacedPickup(LatLng),
    /// The click filled the dropoff slot.
    PlacedDropoff(LatLng),
    /// Both slots were already filled (or the trip is locked); no change.
    Ignored,
}

/// Result of a marker drag-end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    /// The endpoint moved to the new position.
    Moved(EndpointKind, LatLng),
    /// The trip is locked; the drag must not mutate anything.
    RejectedLocked,
    /// Drag-end for an endpoint that is not set (stale event); no change.
    NoSuchEndpoint,
}

/// Result of clearing one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The endpoint was cleared.
    Cleared,
    /// The endpoint was not set; no change.
    AlreadyEmpty,
    /// The trip is locked; location inputs are frozen.
    RejectedLocked,
}

/// Result of a lock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    /// The selection is now locked.
    Locked,
    /// Both endpoints must be set before locking.
    NotReady,
    /// Already locked; no change.
    AlreadyLocked,
}

// ---------------------------------------------------------------------------
// TripSelection
// ---------------------------------------------------------------------------

/// The selection state machine. All mutation goes through the transition
/// methods; the lock check lives here and nowhere else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripSelection {
    pickup: Option<LatLng>,
    dropoff: Option<LatLng>,
    locked: bool,
}

impl TripSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pickup(&self) -> Option<LatLng> {
        self.pickup
    }

    #[must_use]
    pub fn dropoff(&self) -> Option<LatLng> {
        self.dropoff
    }

    #[must_use]
    pub fn endpoint(&self, kind: EndpointKind) -> Option<LatLng> {
        match kind {
            EndpointKind::Pickup => self.pickup,
            EndpointKind::Dropoff => self.dropoff,
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn is_set(&self, kind: EndpointKind) -> bool {
        self.endpoint(kind).is_some()
    }

    #[must_use]
    pub fn phase(&self) -> TripPhase {
        if self.locked {
            return TripPhase::Locked;
        }
        match (self.pickup.is_some(), self.dropoff.is_some()) {
            (false, false) => TripPhase::Empty,
            (true, false) => TripPhase::PickupSet,
            (false, true) => TripPhase::DropoffSet,
            (true, true) => TripPhase::BothSet,
        }
    }

    /// A map click: fills pickup first, then dropoff.
    pub fn click(&mut self, position: LatLng) -> ClickOutcome {
        if self.locked {
            return ClickOutcome::Ignored;
        }
        if self.pickup.is_none() {
            self.pickup = Some(position);
            return ClickOutcome::PlacedPickup(position);
        }
        if self.dropoff.is_none() {
            self.dropoff = Some(position);
            return ClickOutcome::PlacedDropoff(position);
        }
        ClickOutcome::Ignored
    }

    /// A marker drag-end. The single authoritative lock check: a locked trip
    /// rejects the move even if the surface failed to disable dragging.
    pub fn drag_end(&mut self, kind: EndpointKind, position: LatLng) -> DragOutcome {
        if self.locked {
            return DragOutcome::RejectedLocked;
        }
        let slot = match kind {
            EndpointKind::Pickup => &mut self.pickup,
            EndpointKind::Dropoff => &mut self.dropoff,
        };
        if slot.is_none() {
            return DragOutcome::NoSuchEndpoint;
        }
        *slot = Some(position);
        DragOutcome::Moved(kind, position)
    }

    /// Clear one endpoint (popup Remove / reset button).
    pub fn clear(&mut self, kind: EndpointKind) -> ClearOutcome {
        if self.locked {
            return ClearOutcome::RejectedLocked;
        }
        let slot = match kind {
            EndpointKind::Pickup => &mut self.pickup,
            EndpointKind::Dropoff => &mut self.dropoff,
        };
        if slot.take().is_some() {
            ClearOutcome::Cleared
        } else {
            ClearOutcome::AlreadyEmpty
        }
    }

    /// Place or move an endpoint directly (route-seeded positions).
    ///
    /// Locked trips reject this like any other mutation; route application
    /// sets positions before locking.
    pub fn set_endpoint(&mut self, kind: EndpointKind, position: LatLng) -> bool {
        if self.locked {
            return false;
        }
        match kind {
            EndpointKind::Pickup => self.pickup = Some(position),
            EndpointKind::Dropoff => self.dropoff = Some(position),
        }
        true
    }

    /// Lock the selection after a successful estimate.
    pub fn lock(&mut self) -> LockOutcome {
        if self.locked {
            return LockOutcome::AlreadyLocked;
        }
        if self.pickup.is_none() || self.dropoff.is_none() {
            return LockOutcome::NotReady;
        }
        self.locked = true;
        LockOutcome::Locked
    }

    /// Release the lock, keeping both endpoints. The full reset unlocks
    /// first so the per-endpoint clears run on an unlocked trip.
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Full reset: unlock and clear both endpoints ("Start New Trip").
    pub fn begin_new_trip(&mut self) {
        self.locked = false;
        self.pickup = None;
        self.dropoff = None;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn point(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng)
    }

    // ── Click placement order ───────────────────────────────────────

    #[test]
    fn first_click_places_pickup_second_places_dropoff() {
        let mut sel = TripSelection::new();
        let a = point(40.7, -74.0);
        let b = point(40.8, -73.9);

        assert_eq!(sel.click(a), ClickOutcome::PlacedPickup(a));
        assert_eq!(sel.phase(), TripPhase::PickupSet);
        assert_eq!(sel.click(b), ClickOutcome::PlacedDropoff(b));
        assert_eq!(sel.phase(), TripPhase::BothSet);
        assert_eq!(sel.pickup(), Some(a));
        assert_eq!(sel.dropoff(), Some(b));
    }

    #[test]
    fn third_click_is_ignored() {
        let mut sel = TripSelection::new();
        sel.click(point(40.7, -74.0));
        sel.click(point(40.8, -73.9));
        let before = sel.clone();
        assert_eq!(sel.click(point(40.9, -73.8)), ClickOutcome::Ignored);
        assert_eq!(sel, before);
    }

    #[test]
    fn click_after_pickup_clear_refills_pickup() {
        let mut sel = TripSelection::new();
        sel.click(point(40.7, -74.0));
        sel.click(point(40.8, -73.9));
        assert_eq!(sel.clear(EndpointKind::Pickup), ClearOutcome::Cleared);
        assert_eq!(sel.phase(), TripPhase::DropoffSet);

        let replacement = point(40.75, -74.02);
        assert_eq!(sel.click(replacement), ClickOutcome::PlacedPickup(replacement));
        assert_eq!(sel.phase(), TripPhase::BothSet);
        assert_eq!(sel.dropoff(), Some(point(40.8, -73.9)));
    }

    // ── Drag ────────────────────────────────────────────────────────

    #[test]
    fn drag_moves_live_endpoint() {
        let mut sel = TripSelection::new();
        sel.click(point(40.7, -74.0));
        let moved = point(40.71, -74.01);
        assert_eq!(
            sel.drag_end(EndpointKind::Pickup, moved),
            DragOutcome::Moved(EndpointKind::Pickup, moved)
        );
        assert_eq!(sel.pickup(), Some(moved));
    }

    #[test]
    fn drag_on_unset_endpoint_is_stale() {
        let mut sel = TripSelection::new();
        assert_eq!(
            sel.drag_end(EndpointKind::Dropoff, point(40.8, -73.9)),
            DragOutcome::NoSuchEndpoint
        );
        assert_eq!(sel.phase(), TripPhase::Empty);
    }

    #[test]
    fn locked_trip_rejects_drag_without_mutation() {
        let mut sel = TripSelection::new();
        let a = point(40.7, -74.0);
        let b = point(40.8, -73.9);
        sel.click(a);
        sel.click(b);
        assert_eq!(sel.lock(), LockOutcome::Locked);

        let before = sel.clone();
        assert_eq!(
            sel.drag_end(EndpointKind::Pickup, point(41.0, -75.0)),
            DragOutcome::RejectedLocked
        );
        assert_eq!(sel, before);
    }

    // ── Clear / lock / reset ────────────────────────────────────────

    #[test]
    fn clearing_pickup_keeps_dropoff() {
        let mut sel = TripSelection::new();
        let b = point(40.8, -73.9);
        sel.click(point(40.7, -74.0));
        sel.click(b);
        assert_eq!(sel.clear(EndpointKind::Pickup), ClearOutcome::Cleared);
        assert_eq!(sel.pickup(), None);
        assert_eq!(sel.dropoff(), Some(b));
    }

    #[test]
    fn clear_on_empty_slot_reports_already_empty() {
        let mut sel = TripSelection::new();
        assert_eq!(sel.clear(EndpointKind::Dropoff), ClearOutcome::AlreadyEmpty);
    }

    #[test]
    fn locked_trip_rejects_clear() {
        let mut sel = TripSelection::new();
        sel.click(point(40.7, -74.0));
        sel.click(point(40.8, -73.9));
        sel.lock();
        assert_eq!(sel.clear(EndpointKind::Pickup), ClearOutcome::RejectedLocked);
        assert_eq!(sel.phase(), TripPhase::Locked);
    }

    #[test]
    fn lock_requires_both_endpoints() {
        let mut sel = TripSelection::new();
        assert_eq!(sel.lock(), LockOutcome::NotReady);
        sel.click(point(40.7, -74.0));
        assert_eq!(sel.lock(), LockOutcome::NotReady);
        sel.click(point(40.8, -73.9));
        assert_eq!(sel.lock(), LockOutcome::Locked);
        assert_eq!(sel.lock(), LockOutcome::AlreadyLocked);
    }

    #[test]
    fn unlock_keeps_endpoints() {
        let mut sel = TripSelection::new();
        let a = point(40.7, -74.0);
        let b = point(40.8, -73.9);
        sel.click(a);
        sel.click(b);
        sel.lock();
        sel.unlock();
        assert_eq!(sel.phase(), TripPhase::BothSet);
        assert_eq!(sel.pickup(), Some(a));
        assert_eq!(sel.clear(EndpointKind::Pickup), ClearOutcome::Cleared);
    }

    #[test]
    fn begin_new_trip_resets_everything() {
        let mut sel = TripSelection::new();
        sel.click(point(40.7, -74.0));
        sel.click(point(40.8, -73.9));
        sel.lock();
        sel.begin_new_trip();
        assert_eq!(sel.phase(), TripPhase::Empty);
        assert!(!sel.is_locked());
        assert_eq!(sel.pickup(), None);
        assert_eq!(sel.dropoff(), None);
    }

    #[test]
    fn set_endpoint_rejected_while_locked() {
        let mut sel = TripSelection::new();
        sel.click(point(40.7, -74.0));
        sel.click(point(40.8, -73.9));
        sel.lock();
        assert!(!sel.set_endpoint(EndpointKind::Pickup, point(41.0, -75.0)));
        assert_eq!(sel.pickup(), Some(point(40.7, -74.0)));
    }

    // ── Properties ──────────────────────────────────────────────────

    proptest! {
        /// Two clicks from Empty always land in BothSet with the click order
        /// preserved: first → pickup, second → dropoff.
        #[test]
        fn two_clicks_reach_both_set(
            lat_a in -85.0f64..85.0, lng_a in -180.0f64..180.0,
            lat_b in -85.0f64..85.0, lng_b in -180.0f64..180.0,
        ) {
            let mut sel = TripSelection::new();
            let a = point(lat_a, lng_a);
            let b = point(lat_b, lng_b);
            sel.click(a);
            sel.click(b);
            prop_assert_eq!(sel.phase(), TripPhase::BothSet);
            prop_assert_eq!(sel.pickup(), Some(a));
            prop_assert_eq!(sel.dropoff(), Some(b));
        }

        /// No sequence of clicks, drags, and clears can mutate a locked trip.
        #[test]
        fn locked_state_is_inert(ops in proptest::collection::vec(0u8..4, 1..32)) {
            let mut sel = TripSelection::new();
            sel.click(point(40.7, -74.0));
            sel.click(point(40.8, -73.9));
            prop_assert_eq!(sel.lock(), LockOutcome::Locked);
            let frozen = sel.clone();

            for (i, op) in ops.iter().enumerate() {
                let p = point(41.0 + i as f64 * 0.001, -73.5);
                match op {
                    0 => { sel.click(p); }
                    1 => { sel.drag_end(EndpointKind::Pickup, p); }
                    2 => { sel.drag_end(EndpointKind::Dropoff, p); }
                    _ => { sel.clear(EndpointKind::Pickup); }
                }
            }
            prop_assert_eq!(sel, frozen);
        }
    }
}
