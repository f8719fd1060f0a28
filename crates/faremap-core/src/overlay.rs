#![forbid(unsafe_code)]

//! City boundary overlay and its toggle control.
//!
//! The boundary is a dashed black ring around the service area. It is
//! registered at startup but stays hidden until the corner control is
//! clicked, so the map opens uncluttered.

use crate::actions::UiAction;
use crate::error::SurfaceError;
use crate::geo::LatLng;
use crate::surface::{ControlPosition, ControlSpec, MapSurface, OverlayId, StrokeStyle};

/// Dashed ring stroke. Square caps keep the dashes crisp at corners.
pub const BOUNDARY_STYLE: StrokeStyle = StrokeStyle {
    color: "#000000",
    weight_px: 10.0,
    opacity: 1.0,
    dash_pattern: Some("10, 20"),
    square_ends: true,
};

pub const TOGGLE_LABEL: &str = "Toggle NYC Border";

/// Bottom-right control that flips boundary visibility.
pub const TOGGLE_CONTROL: ControlSpec = ControlSpec {
    label: TOGGLE_LABEL,
    position: ControlPosition::BottomRight,
    action: UiAction::ToggleBoundary,
};

/// Outer ring of the New York City service area. The ring is open; renderers
/// close it implicitly.
pub const CITY_BOUNDARY: [LatLng; 37] = [
    LatLng::new(40.91953367586091, -73.91896298001514),
    LatLng::new(40.87230145590103, -73.7507725228253),
    LatLng::new(40.84529647637295, -73.76106989775528),
    LatLng::new(40.826594272342476, -73.78097815595326),
    LatLng::new(40.81152477116139, -73.78097815595326),
    LatLng::new(40.75173270276329, -73.70340459814732),
    LatLng::new(40.73092284589932, -73.70752354811933),
    LatLng::new(40.71999506489763, -73.72811829797932),
    LatLng::new(40.678869723296856, -73.72537233133131),
    LatLng::new(40.664390642294514, -73.72939874094784),
    LatLng::new(40.65188912564372, -73.72253382432785),
    LatLng::new(40.64667946894695, -73.74278532835685),
    LatLng::new(40.61801908757871, -73.76612604486482),
    LatLng::new(40.60368428393291, -73.74038260753983),
    LatLng::new(40.572397675508526, -73.75857463658282),
    LatLng::new(40.532904612455276, -73.7618091585312),
    LatLng::new(40.49636353426769, -73.90734539087507),
    LatLng::new(40.516202590567346, -73.98972439031496),
    LatLng::new(40.47651860995723, -74.22107208040876),
    LatLng::new(40.49792998890819, -74.26226158012872),
    LatLng::new(40.52090045488089, -74.25539666350872),
    LatLng::new(40.545950171091384, -74.24853174688873),
    LatLng::new(40.56107983633654, -74.23411542198676),
    LatLng::new(40.55742816118087, -74.21969909708477),
    LatLng::new(40.59080749025055, -74.20734224716877),
    LatLng::new(40.6022777885039, -74.19979083888677),
    LatLng::new(40.630423813111435, -74.20459628052076),
    LatLng::new(40.64918124159052, -74.18537451398478),
    LatLng::new(40.64397137349093, -74.12427675606685),
    LatLng::new(40.652827907268616, -74.08308725634687),
    LatLng::new(40.65543254645214, -74.0556275898669),
    LatLng::new(40.702819212504856, -74.02748035480424),
    LatLng::new(40.762498162393335, -74.0132808892989),
    LatLng::new(40.81344653819269, -73.97243463540994),
    LatLng::new(40.850073998643296, -73.95422622178786),
    LatLng::new(40.890236475489125, -73.92997258208202),
    LatLng::new(40.91864628507031, -73.91900465981077),
];

/// Register the hidden boundary ring and its toggle control.
pub fn install<S: MapSurface>(surface: &mut S) -> Result<OverlayId, SurfaceError> {
    let id = surface.add_boundary(&CITY_BOUNDARY, &BOUNDARY_STYLE)?;
    surface.add_corner_control(&TOGGLE_CONTROL)?;
    Ok(id)
}
