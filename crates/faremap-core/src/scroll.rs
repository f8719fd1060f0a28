#![forbid(unsafe_code)]

//! Scroll targeting and the results readiness gate.
//!
//! # Design
//!
//! The results section is injected by the server after a fare request, so
//! "scroll to results" cannot assume the element exists. Instead of polling
//! the document, [`ResultsGate`] waits for an explicit readiness signal from
//! the host with a time budget as backstop:
//!
//! - Armed on page load: a signal scrolls to the results; expiry gives up
//!   quietly (the page simply has no results yet).
//! - Armed on lock: the trip just froze into an estimate, so something must
//!   move — expiry falls back to a bottom-of-panel scroll.
//!
//! All methods take `now` explicitly, so the schedule is the caller's and the
//! state machine tests deterministically.

use std::time::Duration;

use web_time::Instant;

/// Settle delay between locking and probing for the results section.
pub const LOCK_SETTLE_DELAY_MS: u64 = 100;

/// Scroll offset that puts the results section just below the sticky header.
/// Clamped at the top edge.
#[must_use]
pub fn results_scroll_top(target_top: f64, header_height: f64) -> f64 {
    (target_top - header_height).max(0.0)
}

/// Why the gate is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmReason {
    /// Initial page load; results may have been server-rendered.
    PageLoad,
    /// The trip locked and the results section was not there yet.
    Locked,
}

/// What the caller should do with the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateAction {
    ScrollToResults,
    ScrollToBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Idle,
    Armed { reason: ArmReason, since: Instant },
    Done,
}

/// Readiness gate for the results section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultsGate {
    state: GateState,
    budget: Duration,
}

impl ResultsGate {
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            state: GateState::Idle,
            budget,
        }
    }

    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self.state, GateState::Armed { .. })
    }

    /// State label for diagnostics records.
    #[must_use]
    pub fn state_label(&self) -> &'static str {
        match self.state {
            GateState::Idle => "idle",
            GateState::Armed { .. } => "armed",
            GateState::Done => "done",
        }
    }

    /// Start (or restart) the wait. Re-arming resets the clock.
    pub fn arm(&mut self, reason: ArmReason, now: Instant) {
        self.state = GateState::Armed { reason, since: now };
    }

    /// Arm only when nothing is pending. The page-load arm goes through this
    /// so it never demotes a lock-armed gate to the silent-expiry kind.
    pub fn arm_if_idle(&mut self, reason: ArmReason, now: Instant) {
        if self.state == GateState::Idle {
            self.arm(reason, now);
        }
    }

    /// The host reports the results section exists. The first signal scrolls
    /// to it — even when nothing was armed, since server-rendered results are
    /// ready by definition. Signals after `Done` are duplicates.
    pub fn notify_ready(&mut self, _now: Instant) -> Option<GateAction> {
        match self.state {
            GateState::Done => None,
            GateState::Idle | GateState::Armed { .. } => {
                self.state = GateState::Done;
                Some(GateAction::ScrollToResults)
            }
        }
    }

    /// Check the budget. Only a lock-armed gate produces a fallback action;
    /// a page-load gate expires into nothing.
    pub fn poll_expiry(&mut self, now: Instant) -> Option<GateAction> {
        let GateState::Armed { reason, since } = self.state else {
            return None;
        };
        if now.duration_since(since) < self.budget {
            return None;
        }
        self.state = GateState::Idle;
        match reason {
            ArmReason::PageLoad => None,
            ArmReason::Locked => Some(GateAction::ScrollToBottom),
        }
    }

    /// Back to idle; a new trip starts with no pending wait.
    pub fn reset(&mut self) {
        self.state = GateState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const BUDGET: Duration = Duration::from_millis(5_000);

    #[test]
    fn scroll_top_subtracts_header() {
        assert_eq!(results_scroll_top(900.0, 64.0), 836.0);
        assert_eq!(results_scroll_top(900.0, 0.0), 900.0);
    }

    #[test]
    fn scroll_top_clamps_at_zero() {
        assert_eq!(results_scroll_top(30.0, 64.0), 0.0);
    }

    #[test]
    fn ready_signal_scrolls_once() {
        let t0 = Instant::now();
        let mut gate = ResultsGate::new(BUDGET);
        gate.arm(ArmReason::PageLoad, t0);

        assert_eq!(gate.notify_ready(t0), Some(GateAction::ScrollToResults));
        assert_eq!(gate.notify_ready(t0), None);
        assert_eq!(gate.state_label(), "done");
    }

    #[test]
    fn unarmed_gate_still_honors_ready_signal() {
        let t0 = Instant::now();
        let mut gate = ResultsGate::new(BUDGET);
        assert_eq!(gate.notify_ready(t0), Some(GateAction::ScrollToResults));
    }

    #[test]
    fn page_load_expiry_is_silent() {
        let t0 = Instant::now();
        let mut gate = ResultsGate::new(BUDGET);
        gate.arm(ArmReason::PageLoad, t0);

        assert_eq!(gate.poll_expiry(t0 + Duration::from_millis(4_999)), None);
        assert!(gate.is_armed());
        assert_eq!(gate.poll_expiry(t0 + BUDGET), None);
        assert!(!gate.is_armed());
    }

    #[test]
    fn lock_expiry_falls_back_to_bottom() {
        let t0 = Instant::now();
        let mut gate = ResultsGate::new(BUDGET);
        gate.arm(ArmReason::Locked, t0);

        assert_eq!(gate.poll_expiry(t0 + Duration::from_millis(200)), None);
        assert_eq!(
            gate.poll_expiry(t0 + BUDGET),
            Some(GateAction::ScrollToBottom)
        );
        // Spent: a later poll finds nothing.
        assert_eq!(gate.poll_expiry(t0 + BUDGET + BUDGET), None);
    }

    #[test]
    fn ready_beats_the_budget() {
        let t0 = Instant::now();
        let mut gate = ResultsGate::new(BUDGET);
        gate.arm(ArmReason::Locked, t0);

        assert_eq!(
            gate.notify_ready(t0 + Duration::from_millis(50)),
            Some(GateAction::ScrollToResults)
        );
        assert_eq!(gate.poll_expiry(t0 + BUDGET), None);
    }

    #[test]
    fn arm_if_idle_respects_a_pending_wait() {
        let t0 = Instant::now();
        let mut gate = ResultsGate::new(BUDGET);
        gate.arm(ArmReason::Locked, t0);
        gate.arm_if_idle(ArmReason::PageLoad, t0);

        // Still the lock wait: expiry produces the fallback scroll.
        assert_eq!(
            gate.poll_expiry(t0 + BUDGET),
            Some(GateAction::ScrollToBottom)
        );

        gate.arm_if_idle(ArmReason::PageLoad, t0);
        assert!(gate.is_armed());
    }

    #[test]
    fn rearming_restarts_the_clock() {
        let t0 = Instant::now();
        let mut gate = ResultsGate::new(BUDGET);
        gate.arm(ArmReason::Locked, t0);
        gate.arm(ArmReason::Locked, t0 + Duration::from_millis(4_000));

        assert_eq!(gate.poll_expiry(t0 + Duration::from_millis(5_500)), None);
        assert!(gate.is_armed());
    }

    #[test]
    fn reset_disarms() {
        let t0 = Instant::now();
        let mut gate = ResultsGate::new(BUDGET);
        gate.arm(ArmReason::Locked, t0);
        gate.reset();
        assert_eq!(gate.poll_expiry(t0 + BUDGET), None);
        assert_eq!(gate.state_label(), "idle");
    }
}
