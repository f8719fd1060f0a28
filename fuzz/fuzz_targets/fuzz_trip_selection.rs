#![no_main]

use arbitrary::Arbitrary;
use faremap_core::geo::LatLng;
use faremap_core::selection::{EndpointKind, TripPhase, TripSelection};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Click { lat: f64, lng: f64 },
    DragPickup { lat: f64, lng: f64 },
    DragDropoff { lat: f64, lng: f64 },
    ClearPickup,
    ClearDropoff,
    Lock,
    Unlock,
    NewTrip,
}

// Drive the transition function with arbitrary op sequences, including
// non-finite coordinates the handlers upstream normally filter out. The
// state machine itself must stay coherent for any input.
fuzz_target!(|ops: Vec<Op>| {
    let mut selection = TripSelection::new();

    for op in ops {
        match op {
            Op::Click { lat, lng } => {
                let _ = selection.click(LatLng::new(lat, lng));
            }
            Op::DragPickup { lat, lng } => {
                let _ = selection.drag_end(EndpointKind::Pickup, LatLng::new(lat, lng));
            }
            Op::DragDropoff { lat, lng } => {
                let _ = selection.drag_end(EndpointKind::Dropoff, LatLng::new(lat, lng));
            }
            Op::ClearPickup => {
                let _ = selection.clear(EndpointKind::Pickup);
            }
            Op::ClearDropoff => {
                let _ = selection.clear(EndpointKind::Dropoff);
            }
            Op::Lock => {
                let _ = selection.lock();
            }
            Op::Unlock => selection.unlock(),
            Op::NewTrip => selection.begin_new_trip(),
        }

        // Post-conditions that must hold after every op:
        match selection.phase() {
            TripPhase::Empty => {
                assert!(selection.pickup().is_none() && selection.dropoff().is_none());
            }
            TripPhase::PickupSet => {
                assert!(selection.pickup().is_some() && selection.dropoff().is_none());
            }
            TripPhase::DropoffSet => {
                assert!(selection.pickup().is_none() && selection.dropoff().is_some());
            }
            TripPhase::BothSet => {
                assert!(selection.pickup().is_some() && selection.dropoff().is_some());
                assert!(!selection.is_locked(), "BothSet while locked");
            }
            TripPhase::Locked => {
                assert!(selection.is_locked(), "Locked phase without lock flag");
                assert!(
                    selection.pickup().is_some() && selection.dropoff().is_some(),
                    "locked trip missing an endpoint"
                );
            }
        }
    }
});
