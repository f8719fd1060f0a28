#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the FareMap page runtime.
//!
//! [`FareMapWeb`] owns the core app behind an `Rc<RefCell<…>>` so that the
//! Leaflet event trampolines (map click, marker dragend, control click) and
//! the exported methods all reach the same state. JavaScript is single
//! threaded, so the `RefCell` only guards against re-entrant dispatch, which
//! the handlers never do.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Object, Reflect};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_time::Instant;

use faremap_core::actions::{ACTION_ATTR, UiAction};
use faremap_core::app::FareMap;
use faremap_core::selection::EndpointKind;

use crate::boot::{BootPlan, MAP_CONTAINER_ID};
use crate::dom::DomPage;
use crate::leaflet::{ActionHook, DragHook, LeafletMouseEvent, LeafletSurface, leaflet_map};

type App = FareMap<LeafletSurface, DomPage>;
type SharedApp = Rc<RefCell<Option<App>>>;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn js_array_from_strings(items: &[&str]) -> Array {
    let arr = Array::new_with_length(items.len() as u32);
    for (idx, item) in items.iter().enumerate() {
        arr.set(idx as u32, JsValue::from_str(item));
    }
    arr
}

fn to_js_error(err: faremap_core::error::Error) -> JsValue {
    JsValue::from_str(&format!("faremap: {err}"))
}

fn parse_endpoint(raw: &str) -> Option<EndpointKind> {
    match raw {
        "pickup" => Some(EndpointKind::Pickup),
        "dropoff" => Some(EndpointKind::Dropoff),
        _ => None,
    }
}

fn with_app(app: &SharedApp, f: impl FnOnce(&mut App)) {
    let mut guard = app.borrow_mut();
    if let Some(app) = guard.as_mut() {
        f(app);
    }
}

fn dispatch(app: &SharedApp, action: UiAction) {
    with_app(app, |app| match action {
        UiAction::ResetPickup => app.reset_pickup(),
        UiAction::ResetDropoff => app.reset_dropoff(),
        UiAction::StartNewTrip => app.start_new_trip(),
        UiAction::SetPassengers(count) => app.set_passengers(count),
        UiAction::ToggleBoundary => app.toggle_boundary(),
        UiAction::ShowLoading => app.show_loading(),
    });
}

/// Page runtime for the fare-estimation form.
///
/// Construct once, call [`init`](FareMapWeb::init) once with the seed JSON
/// the page template embeds, then leave it running. All map and form
/// interaction is handled internally; the host forwards only the signals
/// Rust cannot observe on its own, chiefly [`resultsReady`](FareMapWeb::results_ready)
/// when the server swaps the results section into the page.
#[wasm_bindgen]
pub struct FareMapWeb {
    app: SharedApp,
    // Trampolines stay alive as long as the page runtime does.
    map_click: Option<Closure<dyn FnMut(JsValue)>>,
    action_listener: Option<Closure<dyn FnMut(web_sys::Event)>>,
    poll_timer: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

#[wasm_bindgen]
impl FareMapWeb {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        install_panic_hook();
        Self {
            app: Rc::new(RefCell::new(None)),
            map_click: None,
            action_listener: None,
            poll_timer: None,
        }
    }

    /// Boot the page: create the Leaflet map, resolve the form bindings,
    /// apply the seed, and wire every event path.
    ///
    /// `seed_json` is the JSON object the page template embeds, or
    /// `undefined` for the plain interactive page. Fails (and leaves nothing
    /// wired) on a malformed seed or a page missing required elements.
    pub fn init(&mut self, seed_json: Option<String>) -> Result<(), JsValue> {
        if self.app.borrow().is_some() {
            return Err(JsValue::from_str("faremap: init called twice"));
        }
        let plan = BootPlan::from_raw(seed_json.as_deref()).map_err(to_js_error)?;
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("faremap: no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("faremap: no document"))?;

        let map = leaflet_map(MAP_CONTAINER_ID);
        let center = plan.map_center();
        map.set_view(
            &Array::of2(&JsValue::from_f64(center[0]), &JsValue::from_f64(center[1])).into(),
            f64::from(plan.map_zoom()),
        );

        let drag_hook: DragHook = {
            let app = Rc::clone(&self.app);
            Rc::new(move |kind, lat, lng| {
                with_app(&app, |app| app.on_marker_drag_end(kind, lat, lng));
            })
        };
        let action_hook: ActionHook = {
            let app = Rc::clone(&self.app);
            Rc::new(move |action| dispatch(&app, action))
        };

        let surface = LeafletSurface::new(map, window.clone(), drag_hook, action_hook);
        let page = DomPage::resolve(window.clone(), document.clone());
        let poll_after_ms = plan.poll_after_ms();

        let mut app = FareMap::new(surface, page, plan.into_seed());
        app.init(Instant::now()).map_err(to_js_error)?;
        *self.app.borrow_mut() = Some(app);

        // Map clicks place endpoints.
        let map_click = {
            let app = Rc::clone(&self.app);
            Closure::wrap(Box::new(move |event: JsValue| {
                let event: LeafletMouseEvent = event.unchecked_into();
                let position = event.latlng();
                with_app(&app, |app| app.on_map_click(position.lat(), position.lng()));
            }) as Box<dyn FnMut(JsValue)>)
        };
        if let Some(app) = self.app.borrow().as_ref() {
            app.surface()
                .map()
                .on("click", map_click.as_ref().unchecked_ref());
        }
        self.map_click = Some(map_click);

        // Popup buttons carry an action attribute; one delegated listener
        // covers them all, including content Leaflet re-creates per open.
        let action_listener = {
            let app = Rc::clone(&self.app);
            Closure::wrap(Box::new(move |event: web_sys::Event| {
                let Some(target) = event.target() else {
                    return;
                };
                let Some(element) = target.dyn_ref::<web_sys::Element>() else {
                    return;
                };
                let Ok(Some(actioned)) = element.closest(&format!("[{ACTION_ATTR}]")) else {
                    return;
                };
                let Some(raw) = actioned.get_attribute(ACTION_ATTR) else {
                    return;
                };
                match UiAction::parse(&raw) {
                    Some(action) => dispatch(&app, action),
                    None => warn!(%raw, "ignoring unparseable action attribute"),
                }
            }) as Box<dyn FnMut(web_sys::Event)>)
        };
        document
            .add_event_listener_with_callback(
                "click",
                action_listener.as_ref().unchecked_ref(),
            )
            .map_err(|_| JsValue::from_str("faremap: document listener rejected"))?;
        self.action_listener = Some(action_listener);

        // One-shot poll that settles the scroll gate if the results section
        // never arrives within its budget.
        let poll_timer = {
            let app = Rc::clone(&self.app);
            Closure::wrap(Box::new(move || {
                with_app(&app, |app| app.poll_scroll_deadline(Instant::now()));
            }) as Box<dyn FnMut()>)
        };
        window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                poll_timer.as_ref().unchecked_ref(),
                i32::try_from(poll_after_ms).unwrap_or(i32::MAX),
            )
            .map_err(|_| JsValue::from_str("faremap: poll timer rejected"))?;
        self.poll_timer = Some(poll_timer);

        Ok(())
    }

    /// Forward a map click at the given coordinates.
    ///
    /// Normally unnecessary (the runtime listens to the map directly); kept
    /// for hosts that drive the map themselves and for integration tests.
    #[wasm_bindgen(js_name = mapClick)]
    pub fn map_click(&self, lat: f64, lng: f64) {
        with_app(&self.app, |app| app.on_map_click(lat, lng));
    }

    /// Forward a marker drag end. `kind` is `"pickup"` or `"dropoff"`.
    /// Returns `false` if the kind string is unknown.
    #[wasm_bindgen(js_name = markerDragEnd)]
    pub fn marker_drag_end(&self, kind: &str, lat: f64, lng: f64) -> bool {
        let Some(kind) = parse_endpoint(kind) else {
            warn!(raw = kind, "ignoring drag end with unknown endpoint kind");
            return false;
        };
        with_app(&self.app, |app| app.on_marker_drag_end(kind, lat, lng));
        true
    }

    /// Dispatch an encoded UI action (`"reset-pickup"`, `"set-passengers:3"`,
    /// …). Returns `false` if the string does not parse.
    #[wasm_bindgen(js_name = dispatchAction)]
    pub fn dispatch_action(&self, action: &str) -> bool {
        match UiAction::parse(action) {
            Some(action) => {
                dispatch(&self.app, action);
                true
            }
            None => false,
        }
    }

    /// Clear the pickup endpoint (ignored while the trip is locked).
    #[wasm_bindgen(js_name = resetPickup)]
    pub fn reset_pickup(&self) {
        dispatch(&self.app, UiAction::ResetPickup);
    }

    /// Clear the dropoff endpoint (ignored while the trip is locked).
    #[wasm_bindgen(js_name = resetDropoff)]
    pub fn reset_dropoff(&self) {
        dispatch(&self.app, UiAction::ResetDropoff);
    }

    /// Tear down the current trip and restore the blank form.
    #[wasm_bindgen(js_name = startNewTrip)]
    pub fn start_new_trip(&self) {
        dispatch(&self.app, UiAction::StartNewTrip);
    }

    /// Select a passenger count (1 through 6; out-of-range is ignored).
    #[wasm_bindgen(js_name = setPassengers)]
    pub fn set_passengers(&self, count: u32) {
        let Ok(count) = u8::try_from(count) else {
            return;
        };
        dispatch(&self.app, UiAction::SetPassengers(count));
    }

    /// Show or hide the city boundary overlay.
    #[wasm_bindgen(js_name = toggleBoundary)]
    pub fn toggle_boundary(&self) {
        dispatch(&self.app, UiAction::ToggleBoundary);
    }

    /// Put the form into its loading presentation (spinner, disabled
    /// submit, dimming overlay). The form's own submit handler calls this.
    #[wasm_bindgen(js_name = showLoading)]
    pub fn show_loading(&self) {
        dispatch(&self.app, UiAction::ShowLoading);
    }

    /// Tell the runtime the server has injected the results section. Scrolls
    /// it into view below the sticky header, once.
    #[wasm_bindgen(js_name = resultsReady)]
    pub fn results_ready(&self) {
        with_app(&self.app, |app| app.on_results_ready(Instant::now()));
    }

    /// Current interaction state as a JSON object string.
    #[wasm_bindgen(js_name = stateJson)]
    pub fn state_json(&self) -> String {
        self.app
            .borrow()
            .as_ref()
            .map_or_else(|| "{}".to_owned(), App::state_json)
    }

    /// Drain buffered diagnostics as JSON lines (empty string when none).
    #[wasm_bindgen(js_name = drainDiagnosticsJsonl)]
    pub fn drain_diagnostics_jsonl(&self) -> String {
        let mut guard = self.app.borrow_mut();
        guard
            .as_mut()
            .map_or_else(String::new, App::drain_diagnostics_jsonl)
    }

    /// Stable FareMapJS API semver for host-side compatibility checks.
    ///
    /// This is intentionally distinct from crate/package semver.
    #[wasm_bindgen(js_name = apiVersion)]
    pub fn api_version(&self) -> String {
        crate::FAREMAP_JS_API_VERSION.to_owned()
    }

    /// Canonical API contract snapshot for deterministic host validation.
    ///
    /// Shape: `{ apiVersion, packageName, packageVersion, methods }`.
    #[wasm_bindgen(js_name = apiContract)]
    pub fn api_contract(&self) -> JsValue {
        let obj = Object::new();
        let _ = Reflect::set(
            &obj,
            &JsValue::from_str("apiVersion"),
            &JsValue::from_str(crate::FAREMAP_JS_API_VERSION),
        );
        let _ = Reflect::set(
            &obj,
            &JsValue::from_str("packageName"),
            &JsValue::from_str(env!("CARGO_PKG_NAME")),
        );
        let _ = Reflect::set(
            &obj,
            &JsValue::from_str("packageVersion"),
            &JsValue::from_str(env!("CARGO_PKG_VERSION")),
        );
        let methods = js_array_from_strings(&crate::FAREMAP_JS_PUBLIC_METHODS);
        let _ = Reflect::set(&obj, &JsValue::from_str("methods"), methods.as_ref());
        obj.into()
    }
}

impl Default for FareMapWeb {
    fn default() -> Self {
        Self::new()
    }
}
