#![forbid(unsafe_code)]

use serde::Serialize;

use crate::actions::UiAction;
use crate::geo::LatLng;
use crate::selection::EndpointKind;
use crate::surface::MarkerId;

const PICKUP_SHAPES: &str = concat!(
    r##"<circle cx="12.5" cy="12.5" r="10" fill="#000000" />"##,
    r##"<circle cx="12.5" cy="12.5" r="3" fill="white" />"##
);

const DROPOFF_SHAPES: &str = concat!(
    r##"<rect x="2.5" y="2.5" width="20" height="20" fill="#000000" />"##,
    r##"<rect x="9.5" y="9.5" width="6" height="6" fill="white" />"##
);

/// Inline vector icon for an endpoint marker. 25x25 logical units, anchored
/// at the shape center; the locked variant keeps the shapes and nudges the
/// popup anchor the way the page always has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub kind: EndpointKind,
    pub locked: bool,
}

impl MarkerIcon {
    pub const SIZE: u32 = 25;
    pub const ANCHOR: (i32, i32) = (12, 12);

    #[must_use]
    pub const fn new(kind: EndpointKind, locked: bool) -> Self {
        Self { kind, locked }
    }

    #[must_use]
    pub const fn popup_anchor(self) -> (i32, i32) {
        if self.locked { (1, -12) } else { (0, -12) }
    }

    #[must_use]
    pub fn svg(self) -> String {
        let shapes = match self.kind {
            EndpointKind::Pickup => PICKUP_SHAPES,
            EndpointKind::Dropoff => DROPOFF_SHAPES,
        };
        format!(
            r#"<svg width="25" height="25" viewBox="0 0 25 25" xmlns="http://www.w3.org/2000/svg">{shapes}</svg>"#
        )
    }
}

/// Popup body for an endpoint marker: title line plus a Remove button that
/// dispatches through the typed action registry.
#[must_use]
pub fn endpoint_popup_html(kind: EndpointKind) -> String {
    let (title_icon, title, action) = match kind {
        EndpointKind::Pickup => (
            "fas fa-circle text-primary",
            "Pickup Location",
            UiAction::ResetPickup.attr_name(),
        ),
        EndpointKind::Dropoff => (
            "fas fa-square text-danger",
            "Destination",
            UiAction::ResetDropoff.attr_name(),
        ),
    };
    format!(
        concat!(
            r#"<div class="popup-content">"#,
            r#"<h6><i class="{icon}"></i> {title}</h6>"#,
            r#"<button type="button" data-faremap-action="{action}" "#,
            r#"class="btn btn-sm btn-outline-dark mt-2">"#,
            r#"<i class="fas fa-trash"></i> Remove</button>"#,
            r#"</div>"#,
        ),
        icon = title_icon,
        title = title,
        action = action,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkerSlot {
    pub id: MarkerId,
    pub position: LatLng,
    pub draggable: bool,
}

/// Bookkeeping for the at-most-two live markers. Owns no surface resources;
/// the app pairs every board mutation with the matching surface call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerBoard {
    pickup: Option<MarkerSlot>,
    dropoff: Option<MarkerSlot>,
}

impl MarkerBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn slot(&self, kind: EndpointKind) -> Option<&MarkerSlot> {
        match kind {
            EndpointKind::Pickup => self.pickup.as_ref(),
            EndpointKind::Dropoff => self.dropoff.as_ref(),
        }
    }

    #[must_use]
    pub fn is_placed(&self, kind: EndpointKind) -> bool {
        self.slot(kind).is_some()
    }

    #[must_use]
    pub fn placed_count(&self) -> usize {
        usize::from(self.pickup.is_some()) + usize::from(self.dropoff.is_some())
    }

    pub fn place(&mut self, kind: EndpointKind, id: MarkerId, position: LatLng) {
        let slot = MarkerSlot {
            id,
            position,
            draggable: true,
        };
        match kind {
            EndpointKind::Pickup => self.pickup = Some(slot),
            EndpointKind::Dropoff => self.dropoff = Some(slot),
        }
    }

    pub fn take(&mut self, kind: EndpointKind) -> Option<MarkerSlot> {
        match kind {
            EndpointKind::Pickup => self.pickup.take(),
            EndpointKind::Dropoff => self.dropoff.take(),
        }
    }

    pub fn move_to(&mut self, kind: EndpointKind, position: LatLng) -> bool {
        let slot = match kind {
            EndpointKind::Pickup => self.pickup.as_mut(),
            EndpointKind::Dropoff => self.dropoff.as_mut(),
        };
        match slot {
            Some(slot) => {
                slot.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_all_draggable(&mut self, draggable: bool) {
        if let Some(slot) = self.pickup.as_mut() {
            slot.draggable = draggable;
        }
        if let Some(slot) = self.dropoff.as_mut() {
            slot.draggable = draggable;
        }
    }

    /// Live `(kind, id)` pairs, pickup first.
    pub fn live(&self) -> impl Iterator<Item = (EndpointKind, MarkerId)> + '_ {
        let pickup = self.pickup.as_ref().map(|s| (EndpointKind::Pickup, s.id));
        let dropoff = self.dropoff.as_ref().map(|s| (EndpointKind::Dropoff, s.id));
        pickup.into_iter().chain(dropoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_icon_is_circle_in_circle() {
        let svg = MarkerIcon::new(EndpointKind::Pickup, false).svg();
        assert!(svg.starts_with("<svg width=\"25\" height=\"25\""));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains(r##"r="10" fill="#000000""##));
        assert!(svg.contains(r#"r="3" fill="white""#));
    }

    #[test]
    fn dropoff_icon_is_square_in_square() {
        let svg = MarkerIcon::new(EndpointKind::Dropoff, false).svg();
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains(r##"width="20" height="20" fill="#000000""##));
        assert!(svg.contains(r#"width="6" height="6" fill="white""#));
    }

    #[test]
    fn locked_variant_only_moves_popup_anchor() {
        let unlocked = MarkerIcon::new(EndpointKind::Pickup, false);
        let locked = MarkerIcon::new(EndpointKind::Pickup, true);
        assert_eq!(unlocked.popup_anchor(), (0, -12));
        assert_eq!(locked.popup_anchor(), (1, -12));
        assert_eq!(unlocked.svg(), locked.svg());
    }

    #[test]
    fn popup_html_routes_through_action_registry() {
        let pickup = endpoint_popup_html(EndpointKind::Pickup);
        assert!(pickup.contains("Pickup Location"));
        assert!(pickup.contains(r#"data-faremap-action="reset-pickup""#));
        assert!(!pickup.contains("onclick"));

        let dropoff = endpoint_popup_html(EndpointKind::Dropoff);
        assert!(dropoff.contains("Destination"));
        assert!(dropoff.contains(r#"data-faremap-action="reset-dropoff""#));
    }

    #[test]
    fn board_place_take_move() {
        let mut board = MarkerBoard::new();
        assert_eq!(board.placed_count(), 0);

        board.place(EndpointKind::Pickup, MarkerId(1), LatLng::new(40.7, -74.0));
        assert!(board.is_placed(EndpointKind::Pickup));
        assert!(!board.is_placed(EndpointKind::Dropoff));

        assert!(board.move_to(EndpointKind::Pickup, LatLng::new(40.71, -74.01)));
        let slot = board.slot(EndpointKind::Pickup).expect("placed");
        assert_eq!(slot.position, LatLng::new(40.71, -74.01));
        assert_eq!(slot.id, MarkerId(1));

        assert!(!board.move_to(EndpointKind::Dropoff, LatLng::new(40.8, -73.9)));

        let taken = board.take(EndpointKind::Pickup).expect("taken");
        assert_eq!(taken.id, MarkerId(1));
        assert_eq!(board.placed_count(), 0);
    }

    #[test]
    fn freeze_clears_drag_flags_on_live_slots() {
        let mut board = MarkerBoard::new();
        board.place(EndpointKind::Pickup, MarkerId(1), LatLng::new(40.7, -74.0));
        board.place(EndpointKind::Dropoff, MarkerId(2), LatLng::new(40.8, -73.9));
        board.set_all_draggable(false);
        assert!(!board.slot(EndpointKind::Pickup).expect("pickup").draggable);
        assert!(!board.slot(EndpointKind::Dropoff).expect("dropoff").draggable);

        let ids: Vec<_> = board.live().collect();
        assert_eq!(
            ids,
            vec![
                (EndpointKind::Pickup, MarkerId(1)),
                (EndpointKind::Dropoff, MarkerId(2)),
            ]
        );
    }
}
