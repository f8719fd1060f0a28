#![forbid(unsafe_code)]

//! Four-stage progress indicator.
//!
//! Stages complete as a cascade: schedule only counts once locations are
//! done, passengers only once schedule is done. The estimate stage is the
//! exception — a locked trip completes it outright, and with all four stages
//! complete no stage is highlighted as active.
//!
//! [`compute`] is pure; [`apply`] paints the result. The indicator is
//! recomputed from scratch on every refresh rather than patched
//! incrementally.

use serde::Serialize;

use crate::bindings::{HostPage, ViewId};
use crate::error::PageError;
use crate::selection::TripSelection;

/// Class on the stage currently being worked on.
pub const STEP_ACTIVE: &str = "active";

/// Class on a finished stage.
pub const STEP_COMPLETED: &str = "completed";

/// The four stages, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Locations,
    Schedule,
    Passengers,
    Estimate,
}

impl StepId {
    pub const ALL: [Self; 4] = [
        Self::Locations,
        Self::Schedule,
        Self::Passengers,
        Self::Estimate,
    ];

    #[must_use]
    pub const fn view(self) -> ViewId {
        match self {
            Self::Locations => ViewId::StepLocations,
            Self::Schedule => ViewId::StepSchedule,
            Self::Passengers => ViewId::StepPassengers,
            Self::Estimate => ViewId::StepEstimate,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Locations => "locations",
            Self::Schedule => "schedule",
            Self::Passengers => "passengers",
            Self::Estimate => "estimate",
        }
    }
}

/// Facts the cascade runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressInputs {
    /// Both endpoints selected.
    pub locations: bool,
    /// Date and hour fields both non-empty.
    pub schedule: bool,
    /// Passenger count field non-empty.
    pub passengers: bool,
    /// An estimate exists (the trip is locked).
    pub estimate: bool,
}

impl ProgressInputs {
    /// Collect inputs from the selection state and the schedule fields.
    pub fn gather<P: HostPage>(
        page: &P,
        selection: &TripSelection,
    ) -> Result<Self, PageError> {
        Ok(Self {
            locations: selection.pickup().is_some() && selection.dropoff().is_some(),
            schedule: !page.value(ViewId::Date)?.is_empty()
                && !page.value(ViewId::Hour)?.is_empty(),
            passengers: !page.value(ViewId::PassengerCount)?.is_empty(),
            estimate: selection.is_locked(),
        })
    }
}

/// Computed indicator state: which stages are done, which is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Completion per stage, in [`StepId::ALL`] order.
    pub completed: [bool; 4],
    /// Stage to highlight, `None` once everything is complete.
    pub active: Option<StepId>,
}

/// Run the cascade.
#[must_use]
pub fn compute(inputs: ProgressInputs) -> ProgressSnapshot {
    let mut completed = [false; 4];
    let mut current = 0usize;

    if inputs.locations {
        completed[0] = true;
        current = 1;
    }
    if current >= 1 && inputs.schedule {
        completed[1] = true;
        current = 2;
    }
    if current >= 2 && inputs.passengers {
        completed[2] = true;
        current = 3;
    }
    if inputs.estimate {
        completed[3] = true;
        current = 4;
    }

    ProgressSnapshot {
        completed,
        active: (current < StepId::ALL.len()).then(|| StepId::ALL[current]),
    }
}

/// Clear every stage, then paint the snapshot.
pub fn apply<P: HostPage>(page: &mut P, snapshot: ProgressSnapshot) -> Result<(), PageError> {
    for step in StepId::ALL {
        page.remove_class(step.view(), STEP_ACTIVE)?;
        page.remove_class(step.view(), STEP_COMPLETED)?;
    }
    for (step, done) in StepId::ALL.iter().zip(snapshot.completed) {
        if done {
            page.add_class(step.view(), STEP_COMPLETED)?;
        }
    }
    if let Some(step) = snapshot.active {
        page.add_class(step.view(), STEP_ACTIVE)?;
    }
    Ok(())
}
