#![forbid(unsafe_code)]

//! Typed UI-action registry.
//!
//! Popup buttons, the boundary toggle, and the form's utility buttons carry a
//! `data-faremap-action` attribute instead of inline script strings. The web
//! layer reads the attribute and dispatches the parsed [`UiAction`] through
//! one entry point, so every clickable action shares one code path and one
//! failure policy.

use serde::Serialize;

/// DOM attribute carrying an encoded action name.
pub const ACTION_ATTR: &str = "data-faremap-action";

/// Every dispatchable UI action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiAction {
    /// Remove the pickup marker (popup Remove button).
    ResetPickup,
    /// Remove the dropoff marker (popup Remove button).
    ResetDropoff,
    /// Full reset back to a fresh form ("Start New Trip").
    StartNewTrip,
    /// Select a passenger count (quick-select buttons).
    SetPassengers(u8),
    /// Show or hide the city boundary overlay.
    ToggleBoundary,
    /// Enter the submit/loading presentation (form submit hook).
    ShowLoading,
}

impl UiAction {
    /// Static attribute name (without any argument suffix).
    #[must_use]
    pub const fn attr_name(self) -> &'static str {
        match self {
            Self::ResetPickup => "reset-pickup",
            Self::ResetDropoff => "reset-dropoff",
            Self::StartNewTrip => "new-trip",
            Self::SetPassengers(_) => "set-passengers",
            Self::ToggleBoundary => "toggle-boundary",
            Self::ShowLoading => "show-loading",
        }
    }

    /// Full attribute value, including the argument suffix where one exists
    /// (`set-passengers:3`).
    #[must_use]
    pub fn encode(self) -> String {
        match self {
            Self::SetPassengers(count) => format!("set-passengers:{count}"),
            other => other.attr_name().to_owned(),
        }
    }

    /// Parse an attribute value. Syntax only — domain checks (e.g. the
    /// passenger range) belong to the handler.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (name, arg) = match raw.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (raw, None),
        };
        match (name, arg) {
            ("reset-pickup", None) => Some(Self::ResetPickup),
            ("reset-dropoff", None) => Some(Self::ResetDropoff),
            ("new-trip", None) => Some(Self::StartNewTrip),
            ("toggle-boundary", None) => Some(Self::ToggleBoundary),
            ("show-loading", None) => Some(Self::ShowLoading),
            ("set-passengers", Some(arg)) => arg.trim().parse::<u8>().ok().map(Self::SetPassengers),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATIC_ACTIONS: [UiAction; 5] = [
        UiAction::ResetPickup,
        UiAction::ResetDropoff,
        UiAction::StartNewTrip,
        UiAction::ToggleBoundary,
        UiAction::ShowLoading,
    ];

    #[test]
    fn static_actions_round_trip() {
        for action in STATIC_ACTIONS {
            let encoded = action.encode();
            assert_eq!(encoded, action.attr_name());
            assert_eq!(UiAction::parse(&encoded), Some(action));
        }
    }

    #[test]
    fn passenger_action_round_trips_with_argument() {
        for count in 0..=9 {
            let action = UiAction::SetPassengers(count);
            assert_eq!(UiAction::parse(&action.encode()), Some(action));
        }
        assert_eq!(
            UiAction::parse("set-passengers:4"),
            Some(UiAction::SetPassengers(4))
        );
    }

    #[test]
    fn parse_tolerates_whitespace() {
        assert_eq!(UiAction::parse("  new-trip "), Some(UiAction::StartNewTrip));
        assert_eq!(
            UiAction::parse("set-passengers: 2"),
            Some(UiAction::SetPassengers(2))
        );
    }

    #[test]
    fn parse_rejects_unknown_and_malformed() {
        assert_eq!(UiAction::parse("teleport"), None);
        assert_eq!(UiAction::parse("set-passengers"), None);
        assert_eq!(UiAction::parse("set-passengers:lots"), None);
        assert_eq!(UiAction::parse("reset-pickup:1"), None);
        assert_eq!(UiAction::parse(""), None);
    }
}
