#![forbid(unsafe_code)]

//! Typed view bindings.
//!
//! Every page element the core touches is named once in [`ViewId`] and
//! resolved once at startup. Handlers never pass raw id strings around; a
//! missing element is either a startup error listing everything that is
//! absent ([`validate_bindings`]) or, for the one optional element, a probed
//! condition.
//!
//! # Design
//!
//! - [`ViewId::dom_id`] is the single source of truth for element ids. The
//!   web page implementation and the binding validator both read it.
//! - [`ViewId::REQUIRED`] drives validation. `ResultsSection` is excluded:
//!   the results block is injected by the server after a fare request, so it
//!   legitimately does not exist on first paint.
//! - [`HostPage`] is the write seam to the document. It mirrors the shape of
//!   [`MapSurface`](crate::surface::MapSurface): every mutation returns
//!   `Result` and the native test suite runs against an in-memory fake.

use crate::error::{BindingError, PageError};

// ---------------------------------------------------------------------------
// View ids
// ---------------------------------------------------------------------------

/// Every element the interaction layer reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewId {
    // Form fields.
    PickupLat,
    PickupLon,
    DropoffLat,
    DropoffLon,
    Date,
    Hour,
    PassengerCount,
    // Location status panel.
    PickupCard,
    DropoffCard,
    PickupStatus,
    DropoffStatus,
    PickupCoords,
    DropoffCoords,
    MapInstruction,
    // Progress indicator.
    StepLocations,
    StepSchedule,
    StepPassengers,
    StepEstimate,
    // Submit affordances.
    SubmitButton,
    SubmitText,
    LoadingSpinner,
    PredictionForm,
    // Injected after a fare request; optional by design.
    ResultsSection,
}

impl ViewId {
    /// Everything the layer knows about, optional elements included.
    pub const ALL: [Self; 23] = [
        Self::PickupLat,
        Self::PickupLon,
        Self::DropoffLat,
        Self::DropoffLon,
        Self::Date,
        Self::Hour,
        Self::PassengerCount,
        Self::PickupCard,
        Self::DropoffCard,
        Self::PickupStatus,
        Self::DropoffStatus,
        Self::PickupCoords,
        Self::DropoffCoords,
        Self::MapInstruction,
        Self::StepLocations,
        Self::StepSchedule,
        Self::StepPassengers,
        Self::StepEstimate,
        Self::SubmitButton,
        Self::SubmitText,
        Self::LoadingSpinner,
        Self::PredictionForm,
        Self::ResultsSection,
    ];

    /// Elements that must exist for `init` to succeed.
    pub const REQUIRED: [Self; 22] = [
        Self::PickupLat,
        Self::PickupLon,
        Self::DropoffLat,
        Self::DropoffLon,
        Self::Date,
        Self::Hour,
        Self::PassengerCount,
        Self::PickupCard,
        Self::DropoffCard,
        Self::PickupStatus,
        Self::DropoffStatus,
        Self::PickupCoords,
        Self::DropoffCoords,
        Self::MapInstruction,
        Self::StepLocations,
        Self::StepSchedule,
        Self::StepPassengers,
        Self::StepEstimate,
        Self::SubmitButton,
        Self::SubmitText,
        Self::LoadingSpinner,
        Self::PredictionForm,
    ];

    /// The element id in the host document.
    #[must_use]
    pub const fn dom_id(self) -> &'static str {
        match self {
            Self::PickupLat => "pickup_lat",
            Self::PickupLon => "pickup_lon",
            Self::DropoffLat => "dropoff_lat",
            Self::DropoffLon => "dropoff_lon",
            Self::Date => "date",
            Self::Hour => "hour",
            Self::PassengerCount => "passenger_count",
            Self::PickupCard => "pickup-card",
            Self::DropoffCard => "dropoff-card",
            Self::PickupStatus => "pickup-status",
            Self::DropoffStatus => "dropoff-status",
            Self::PickupCoords => "pickup-coords",
            Self::DropoffCoords => "dropoff-coords",
            Self::MapInstruction => "map-instruction",
            Self::StepLocations => "step-locations",
            Self::StepSchedule => "step-schedule",
            Self::StepPassengers => "step-passengers",
            Self::StepEstimate => "step-estimate",
            Self::SubmitButton => "submitBtn",
            Self::SubmitText => "submitText",
            Self::LoadingSpinner => "loadingSpinner",
            Self::PredictionForm => "predictionForm",
            Self::ResultsSection => "results-section",
        }
    }

    /// Whether `init` fails when this element is missing.
    #[must_use]
    pub const fn is_required(self) -> bool {
        !matches!(self, Self::ResultsSection)
    }
}

// ---------------------------------------------------------------------------
// Host page seam
// ---------------------------------------------------------------------------

/// Document access seam.
///
/// The web crate implements this over resolved `web_sys` elements; native
/// tests implement it over string maps. Methods that target a [`ViewId`]
/// report failures with that view's dom id inside [`PageError`].
pub trait HostPage {
    /// Current value of a form field.
    fn value(&self, view: ViewId) -> Result<String, PageError>;

    /// Set a form field value.
    fn set_value(&mut self, view: ViewId, value: &str) -> Result<(), PageError>;

    /// Replace an element's text content.
    fn set_text(&mut self, view: ViewId, text: &str) -> Result<(), PageError>;

    /// Replace an element's inner HTML.
    fn set_html(&mut self, view: ViewId, html: &str) -> Result<(), PageError>;

    fn add_class(&mut self, view: ViewId, class: &str) -> Result<(), PageError>;

    fn remove_class(&mut self, view: ViewId, class: &str) -> Result<(), PageError>;

    /// Set `style.display`; an empty string restores the stylesheet value.
    fn set_display(&mut self, view: ViewId, value: &str) -> Result<(), PageError>;

    fn set_disabled(&mut self, view: ViewId, disabled: bool) -> Result<(), PageError>;

    /// Whether the element currently exists in the document.
    fn element_exists(&self, view: ViewId) -> bool;

    fn add_body_class(&mut self, class: &str) -> Result<(), PageError>;

    fn remove_body_class(&mut self, class: &str) -> Result<(), PageError>;

    /// Number of passenger quick-select buttons present.
    fn passenger_button_count(&self) -> usize;

    /// Toggle the active style on the passenger button at `index`.
    fn set_passenger_button_active(&mut self, index: usize, active: bool)
    -> Result<(), PageError>;

    /// Top offset of the results section within its scroll container.
    fn results_section_offset(&self) -> Result<f64, PageError>;

    /// Height of the sticky header, or `0.0` when there is none.
    fn sticky_header_height(&self) -> f64;

    /// Scroll the form's container to an absolute offset.
    fn scroll_to(&mut self, top: f64);

    fn scroll_to_top(&mut self);

    fn scroll_to_bottom(&mut self);

    /// Show the dimming overlay over the form, creating it on first use.
    fn show_loading_overlay(&mut self) -> Result<(), PageError>;

    /// Remove the dimming overlay if present.
    fn remove_loading_overlay(&mut self) -> Result<(), PageError>;
}

/// Check that every required element exists, collecting all misses in one
/// pass so the embedder sees the complete list.
pub fn validate_bindings<P: HostPage>(page: &P) -> Result<(), BindingError> {
    let missing: Vec<&'static str> = ViewId::REQUIRED
        .iter()
        .filter(|view| !page.element_exists(**view))
        .map(|view| view.dom_id())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(BindingError::MissingElements(missing))
    }
}
