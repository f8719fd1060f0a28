#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! # faremap-core
//!
//! Platform-independent interaction core for the FareMap fare-estimation
//! page: the pickup/dropoff selection machine, the marker board, form sync,
//! the progress indicator, route rendering plans, and the results readiness
//! gate. Everything here is pure Rust over two seams —
//! [`MapSurface`](surface::MapSurface) for the map and
//! [`HostPage`](bindings::HostPage) for the document — so the whole app runs
//! natively under `cargo test` against in-memory fakes.
//!
//! # Architecture
//!
//! - [`selection`] — the state machine; the lock check lives here and
//!   nowhere else.
//! - [`app`] — [`FareMap`](app::FareMap), the one owned state object every
//!   handler goes through.
//! - [`bindings`] / [`surface`] — the two seams, validated or handle-checked
//!   so failures are typed.
//! - [`form`], [`progress`], [`markers`], [`route`], [`overlay`],
//!   [`scroll`] — the feature modules, each pure over the seams.
//! - [`config`] — the page seed; [`error`] — the two-disposition error
//!   model; [`actions`] — the typed UI-action registry.
//!
//! # Features
//!
//! - `tracing` — route the [`logging`] facade to the `tracing` crate.
//!   Without it the macros compile to nothing.

pub mod actions;
pub mod app;
pub mod bindings;
pub mod config;
pub mod error;
pub mod form;
pub mod geo;
pub mod logging;
pub mod markers;
pub mod overlay;
pub mod progress;
pub mod route;
pub mod scroll;
pub mod selection;
pub mod surface;

#[cfg(test)]
pub(crate) mod testutil;

pub use actions::UiAction;
pub use app::{FareMap, StateSnapshot};
pub use bindings::{HostPage, ViewId, validate_bindings};
pub use config::PageSeed;
pub use error::{Disposition, Error, Result};
pub use geo::{GeoBounds, LatLng, RouteGeometry};
pub use selection::{EndpointKind, TripPhase, TripSelection};
pub use surface::{MapSurface, MarkerId, OverlayId, PathId};
