#![forbid(unsafe_code)]

//! Form synchronization and the location status panel.
//!
//! Field writes always carry six decimal places; the status cards echo the
//! same coordinates at four. The selection state is the single source of
//! truth — captions are formatted from it, never re-parsed out of the DOM.
//!
//! Refreshing the progress indicator after a status change is the caller's
//! job; these functions touch only the views they own.

use crate::bindings::{HostPage, ViewId};
use crate::error::PageError;
use crate::geo::LatLng;
use crate::selection::{EndpointKind, TripSelection};

// ---------------------------------------------------------------------------
// Status panel vocabulary
// ---------------------------------------------------------------------------

/// Class applied to a card whose endpoint is confirmed.
pub const CARD_SELECTED: &str = "selected";

/// Class applied to the dropoff card while it is the next thing to pick.
pub const CARD_PENDING: &str = "pending";

pub const PICKUP_CONFIRMED: &str = "Pickup location confirmed";
pub const PICKUP_PROMPT: &str = "Select pickup location";
pub const DROPOFF_CONFIRMED: &str = "Destination confirmed";
pub const DROPOFF_PROMPT: &str = "Select destination";

pub const INSTRUCTION_PICK_PICKUP: &str =
    r#"<i class="fas fa-mouse-pointer"></i> Click to select pickup location"#;
pub const INSTRUCTION_PICK_DROPOFF: &str =
    r#"<i class="fas fa-map-pin"></i> Click to select destination"#;
pub const INSTRUCTION_BOTH_SELECTED: &str =
    r#"<i class="fas fa-check-circle"></i> Both locations selected"#;

pub const SUBMIT_IDLE_HTML: &str = r#"<i class="fas fa-calculator"></i> Calculate Fare Estimate"#;
pub const SUBMIT_LOADING_HTML: &str =
    r#"<i class="fas fa-spinner fa-spin"></i> Calculating fare..."#;

/// Four-decimal coordinate caption shown on a status card.
#[must_use]
pub fn coords_html(position: LatLng) -> String {
    format!(
        r#"<i class="fas fa-map-marker-alt"></i> {}"#,
        position.caption()
    )
}

// ---------------------------------------------------------------------------
// Field sync
// ---------------------------------------------------------------------------

const fn field_views(kind: EndpointKind) -> (ViewId, ViewId) {
    match kind {
        EndpointKind::Pickup => (ViewId::PickupLat, ViewId::PickupLon),
        EndpointKind::Dropoff => (ViewId::DropoffLat, ViewId::DropoffLon),
    }
}

/// Write an endpoint's coordinates into its hidden fields at six decimals.
pub fn write_endpoint_fields<P: HostPage>(
    page: &mut P,
    kind: EndpointKind,
    position: LatLng,
) -> Result<(), PageError> {
    let (lat_view, lng_view) = field_views(kind);
    let (lat, lng) = position.field_values();
    page.set_value(lat_view, &lat)?;
    page.set_value(lng_view, &lng)
}

/// Blank an endpoint's hidden fields.
pub fn clear_endpoint_fields<P: HostPage>(
    page: &mut P,
    kind: EndpointKind,
) -> Result<(), PageError> {
    let (lat_view, lng_view) = field_views(kind);
    page.set_value(lat_view, "")?;
    page.set_value(lng_view, "")
}

// ---------------------------------------------------------------------------
// Status panel
// ---------------------------------------------------------------------------

/// Repaint the status cards, coordinate captions, and map instruction from
/// the current selection.
pub fn apply_location_status<P: HostPage>(
    page: &mut P,
    selection: &TripSelection,
) -> Result<(), PageError> {
    match selection.pickup() {
        Some(position) => {
            page.add_class(ViewId::PickupCard, CARD_SELECTED)?;
            page.remove_class(ViewId::PickupCard, CARD_PENDING)?;
            page.set_text(ViewId::PickupStatus, PICKUP_CONFIRMED)?;
            page.set_html(ViewId::PickupCoords, &coords_html(position))?;
            page.set_display(ViewId::PickupCoords, "block")?;
            if selection.dropoff().is_none() {
                page.set_html(ViewId::MapInstruction, INSTRUCTION_PICK_DROPOFF)?;
                page.add_class(ViewId::DropoffCard, CARD_PENDING)?;
            }
        }
        None => {
            page.remove_class(ViewId::PickupCard, CARD_SELECTED)?;
            page.remove_class(ViewId::PickupCard, CARD_PENDING)?;
            page.set_text(ViewId::PickupStatus, PICKUP_PROMPT)?;
            page.set_display(ViewId::PickupCoords, "none")?;
            page.set_html(ViewId::MapInstruction, INSTRUCTION_PICK_PICKUP)?;
        }
    }

    match selection.dropoff() {
        Some(position) => {
            page.add_class(ViewId::DropoffCard, CARD_SELECTED)?;
            page.remove_class(ViewId::DropoffCard, CARD_PENDING)?;
            page.set_text(ViewId::DropoffStatus, DROPOFF_CONFIRMED)?;
            page.set_html(ViewId::DropoffCoords, &coords_html(position))?;
            page.set_display(ViewId::DropoffCoords, "block")?;
            if selection.pickup().is_some() {
                page.set_html(ViewId::MapInstruction, INSTRUCTION_BOTH_SELECTED)?;
            }
        }
        None => {
            page.remove_class(ViewId::DropoffCard, CARD_SELECTED)?;
            page.remove_class(ViewId::DropoffCard, CARD_PENDING)?;
            page.set_text(ViewId::DropoffStatus, DROPOFF_PROMPT)?;
            page.set_display(ViewId::DropoffCoords, "none")?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Passengers and schedule
// ---------------------------------------------------------------------------

/// Write the passenger count and light up the matching quick-select button.
pub fn apply_passenger_count<P: HostPage>(page: &mut P, count: u8) -> Result<(), PageError> {
    page.set_value(ViewId::PassengerCount, &count.to_string())?;
    for index in 0..page.passenger_button_count() {
        page.set_passenger_button_active(index, index + 1 == count as usize)?;
    }
    Ok(())
}

/// Set the date field when the page provided a default. Used once at startup.
pub fn apply_default_date<P: HostPage>(
    page: &mut P,
    default_date: Option<&str>,
) -> Result<(), PageError> {
    if let Some(date) = default_date {
        page.set_value(ViewId::Date, date)?;
    }
    Ok(())
}

/// Restore the schedule fields for a fresh trip: date back to the page
/// default, hour cleared.
pub fn restore_schedule_defaults<P: HostPage>(
    page: &mut P,
    default_date: Option<&str>,
) -> Result<(), PageError> {
    page.set_value(ViewId::Date, default_date.unwrap_or(""))?;
    page.set_value(ViewId::Hour, "")
}

// ---------------------------------------------------------------------------
// Submit presentation
// ---------------------------------------------------------------------------

/// Idle submit affordance: enabled button, calculator label, spinner hidden.
pub fn apply_submit_idle<P: HostPage>(page: &mut P) -> Result<(), PageError> {
    page.set_disabled(ViewId::SubmitButton, false)?;
    page.set_html(ViewId::SubmitText, SUBMIT_IDLE_HTML)?;
    page.add_class(ViewId::LoadingSpinner, "d-none")
}

/// Loading submit affordance: disabled button, spinner label and element.
pub fn apply_submit_loading<P: HostPage>(page: &mut P) -> Result<(), PageError> {
    page.set_disabled(ViewId::SubmitButton, true)?;
    page.set_html(ViewId::SubmitText, SUBMIT_LOADING_HTML)?;
    page.remove_class(ViewId::LoadingSpinner, "d-none")
}
