#![forbid(unsafe_code)]

//! Leaflet bindings and the [`MapSurface`] implementation over them.
//!
//! The page loads Leaflet globally as `L`; this module binds the handful of
//! factories and methods the surface needs as opaque extern types. Handles
//! issued to the core map one-to-one onto live Leaflet layer objects held in
//! tables here.
//!
//! Events flow outward through two hooks installed at construction: marker
//! `dragend` and custom-control clicks both call back into plain Rust
//! closures, so this module never needs to know what a drag or a toggle
//! means. The hooks are expected to swallow their own errors; a surface
//! callback that throws would propagate into Leaflet's event dispatch.

use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Array, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use faremap_core::actions::UiAction;
use faremap_core::error::SurfaceError;
use faremap_core::geo::{GeoBounds, LatLng};
use faremap_core::markers::MarkerIcon;
use faremap_core::selection::EndpointKind;
use faremap_core::surface::{
    ControlPosition, ControlSpec, FitOptions, MapSurface, MarkerId, OverlayId, PathId, StrokeStyle,
};

// ---------------------------------------------------------------------------
// Leaflet externs
// ---------------------------------------------------------------------------

#[wasm_bindgen]
extern "C" {
    /// Opaque handle to an `L.Map`.
    pub(crate) type LeafletMap;
    /// Opaque handle to an `L.Marker`.
    #[derive(Clone)]
    pub(crate) type LeafletMarker;
    /// The `marker.dragging` interaction handler.
    pub(crate) type DragHandler;
    /// Opaque handle to an `L.Polyline` or `L.Polygon`.
    pub(crate) type LeafletPath;
    /// Opaque handle to an `L.Icon`.
    pub(crate) type LeafletIcon;
    /// Opaque handle to an `L.Control`.
    pub(crate) type LeafletControl;
    /// Leaflet mouse event payload.
    pub(crate) type LeafletMouseEvent;
    /// An `L.LatLng` coordinate object.
    pub(crate) type LeafletLatLng;

    #[wasm_bindgen(js_namespace = L, js_name = map)]
    pub(crate) fn leaflet_map(container_id: &str) -> LeafletMap;

    #[wasm_bindgen(method, js_name = setView)]
    pub(crate) fn set_view(this: &LeafletMap, center: &JsValue, zoom: f64);

    #[wasm_bindgen(method)]
    pub(crate) fn on(this: &LeafletMap, event: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds_js(this: &LeafletMap, bounds: &JsValue, options: &JsValue);

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &LeafletMap, layer: &JsValue);

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn leaflet_marker(latlng: &JsValue, options: &JsValue) -> LeafletMarker;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &LeafletMarker, map: &LeafletMap);

    #[wasm_bindgen(method, js_name = setLatLng)]
    fn set_lat_lng(this: &LeafletMarker, latlng: &JsValue);

    #[wasm_bindgen(method, js_name = getLatLng)]
    fn get_lat_lng(this: &LeafletMarker) -> LeafletLatLng;

    #[wasm_bindgen(method, js_name = setIcon)]
    fn set_icon(this: &LeafletMarker, icon: &LeafletIcon);

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &LeafletMarker, html: &str);

    #[wasm_bindgen(method, js_name = openPopup)]
    fn open_popup(this: &LeafletMarker);

    #[wasm_bindgen(method)]
    fn on(this: &LeafletMarker, event: &str, handler: &js_sys::Function);

    #[wasm_bindgen(method, getter)]
    fn dragging(this: &LeafletMarker) -> DragHandler;

    #[wasm_bindgen(method)]
    fn enable(this: &DragHandler);

    #[wasm_bindgen(method)]
    fn disable(this: &DragHandler);

    #[wasm_bindgen(js_namespace = L, js_name = polyline)]
    fn leaflet_polyline(latlngs: &JsValue, options: &JsValue) -> LeafletPath;

    #[wasm_bindgen(js_namespace = L, js_name = polygon)]
    fn leaflet_polygon(latlngs: &JsValue, options: &JsValue) -> LeafletPath;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &LeafletPath, map: &LeafletMap);

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &LeafletPath, html: &str);

    #[wasm_bindgen(js_namespace = L, js_name = icon)]
    fn leaflet_icon(options: &JsValue) -> LeafletIcon;

    #[wasm_bindgen(js_namespace = L, js_name = control)]
    fn leaflet_control(options: &JsValue) -> LeafletControl;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &LeafletControl, map: &LeafletMap);

    #[wasm_bindgen(js_namespace = ["L", "DomUtil"], js_name = create)]
    fn dom_util_create(tag: &str, class_name: &str) -> web_sys::HtmlElement;

    #[wasm_bindgen(js_namespace = ["L", "DomEvent"], js_name = disableClickPropagation)]
    fn disable_click_propagation(el: &web_sys::HtmlElement);

    #[wasm_bindgen(js_namespace = ["L", "DomEvent"], js_name = disableScrollPropagation)]
    fn disable_scroll_propagation(el: &web_sys::HtmlElement);

    #[wasm_bindgen(method, getter)]
    pub(crate) fn latlng(this: &LeafletMouseEvent) -> LeafletLatLng;

    #[wasm_bindgen(method, getter)]
    pub(crate) fn lat(this: &LeafletLatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    pub(crate) fn lng(this: &LeafletLatLng) -> f64;
}

// ---------------------------------------------------------------------------
// Option-object builders
// ---------------------------------------------------------------------------

fn set_js(obj: &Object, key: &str, value: JsValue) {
    let _ = Reflect::set(obj, &JsValue::from_str(key), &value);
}

fn js_latlng(point: LatLng) -> Array {
    Array::of2(&JsValue::from_f64(point.lat), &JsValue::from_f64(point.lng))
}

fn js_ring(points: &[LatLng]) -> Array {
    points
        .iter()
        .map(|point| JsValue::from(js_latlng(*point)))
        .collect()
}

fn js_pixel_pair(x: f64, y: f64) -> Array {
    Array::of2(&JsValue::from_f64(x), &JsValue::from_f64(y))
}

fn stroke_options(style: &StrokeStyle) -> Object {
    let options = Object::new();
    set_js(&options, "color", JsValue::from_str(style.color));
    set_js(&options, "weight", JsValue::from_f64(style.weight_px));
    set_js(&options, "opacity", JsValue::from_f64(style.opacity));
    if let Some(dash) = style.dash_pattern {
        set_js(&options, "dashArray", JsValue::from_str(dash));
    }
    if style.square_ends {
        set_js(&options, "lineCap", JsValue::from_str("square"));
        set_js(&options, "lineJoin", JsValue::from_str("square"));
    }
    options
}

const fn control_position_str(position: ControlPosition) -> &'static str {
    match position {
        ControlPosition::TopLeft => "topleft",
        ControlPosition::TopRight => "topright",
        ControlPosition::BottomLeft => "bottomleft",
        ControlPosition::BottomRight => "bottomright",
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// Rust closure invoked when a marker finishes a drag.
pub(crate) type DragHook = Rc<dyn Fn(EndpointKind, f64, f64)>;

/// Rust closure invoked when a custom control is clicked.
pub(crate) type ActionHook = Rc<dyn Fn(UiAction)>;

struct MarkerEntry {
    marker: LeafletMarker,
    // Keeps the dragend trampoline alive as long as the marker exists.
    _dragend: Closure<dyn FnMut()>,
}

struct ControlEntry {
    _on_add: Closure<dyn FnMut(JsValue) -> web_sys::HtmlElement>,
    _on_click: Closure<dyn FnMut()>,
}

struct OverlayEntry {
    layer: LeafletPath,
    visible: bool,
}

/// [`MapSurface`] implementation over a live Leaflet map.
pub(crate) struct LeafletSurface {
    map: LeafletMap,
    window: Window,
    markers: HashMap<u32, MarkerEntry>,
    paths: HashMap<u32, LeafletPath>,
    overlays: HashMap<u32, OverlayEntry>,
    controls: Vec<ControlEntry>,
    drag_hook: DragHook,
    action_hook: ActionHook,
    next_id: u32,
}

impl LeafletSurface {
    pub(crate) fn new(
        map: LeafletMap,
        window: Window,
        drag_hook: DragHook,
        action_hook: ActionHook,
    ) -> Self {
        Self {
            map,
            window,
            markers: HashMap::new(),
            paths: HashMap::new(),
            overlays: HashMap::new(),
            controls: Vec::new(),
            drag_hook,
            action_hook,
            next_id: 0,
        }
    }

    pub(crate) fn map(&self) -> &LeafletMap {
        &self.map
    }

    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Build an `L.icon` with the SVG inlined as a base64 data URL.
    fn icon_for(&self, icon: &MarkerIcon) -> Result<LeafletIcon, SurfaceError> {
        let encoded = self
            .window
            .btoa(&icon.svg())
            .map_err(|_| SurfaceError::Backend("btoa rejected marker svg".into()))?;
        let options = Object::new();
        set_js(
            &options,
            "iconUrl",
            JsValue::from_str(&format!("data:image/svg+xml;base64,{encoded}")),
        );
        let size = f64::from(MarkerIcon::SIZE);
        set_js(&options, "iconSize", js_pixel_pair(size, size).into());
        let (anchor_x, anchor_y) = MarkerIcon::ANCHOR;
        set_js(
            &options,
            "iconAnchor",
            js_pixel_pair(f64::from(anchor_x), f64::from(anchor_y)).into(),
        );
        let (popup_x, popup_y) = icon.popup_anchor();
        set_js(
            &options,
            "popupAnchor",
            js_pixel_pair(f64::from(popup_x), f64::from(popup_y)).into(),
        );
        Ok(leaflet_icon(&options))
    }

    fn marker(&self, id: MarkerId) -> Result<&MarkerEntry, SurfaceError> {
        self.markers
            .get(&id.0)
            .ok_or(SurfaceError::MarkerNotFound { id: id.0 })
    }
}

impl MapSurface for LeafletSurface {
    fn add_marker(
        &mut self,
        position: LatLng,
        icon: &MarkerIcon,
        draggable: bool,
    ) -> Result<MarkerId, SurfaceError> {
        let leaflet_icon = self.icon_for(icon)?;
        let options = Object::new();
        set_js(&options, "draggable", JsValue::from_bool(draggable));
        set_js(&options, "icon", leaflet_icon.into());
        let marker = leaflet_marker(&js_latlng(position).into(), &options);
        marker.add_to(&self.map);

        // Dragend reports the marker's own position; the endpoint kind rides
        // along from the icon that placed it.
        let kind = icon.kind;
        let dragend = {
            let hook = Rc::clone(&self.drag_hook);
            let marker = marker.clone();
            Closure::wrap(Box::new(move || {
                let pos = marker.get_lat_lng();
                hook(kind, pos.lat(), pos.lng());
            }) as Box<dyn FnMut()>)
        };
        marker.on("dragend", dragend.as_ref().unchecked_ref());

        let id = self.issue();
        self.markers.insert(
            id,
            MarkerEntry {
                marker,
                _dragend: dragend,
            },
        );
        Ok(MarkerId(id))
    }

    fn move_marker(&mut self, id: MarkerId, position: LatLng) -> Result<(), SurfaceError> {
        let entry = self.marker(id)?;
        entry.marker.set_lat_lng(&js_latlng(position).into());
        Ok(())
    }

    fn remove_marker(&mut self, id: MarkerId) -> Result<(), SurfaceError> {
        let entry = self
            .markers
            .remove(&id.0)
            .ok_or(SurfaceError::MarkerNotFound { id: id.0 })?;
        self.map.remove_layer(entry.marker.as_ref());
        Ok(())
    }

    fn set_marker_draggable(
        &mut self,
        id: MarkerId,
        draggable: bool,
    ) -> Result<(), SurfaceError> {
        let entry = self.marker(id)?;
        if draggable {
            entry.marker.dragging().enable();
        } else {
            entry.marker.dragging().disable();
        }
        Ok(())
    }

    fn set_marker_icon(&mut self, id: MarkerId, icon: &MarkerIcon) -> Result<(), SurfaceError> {
        let leaflet_icon = self.icon_for(icon)?;
        self.marker(id)?.marker.set_icon(&leaflet_icon);
        Ok(())
    }

    fn bind_marker_popup(&mut self, id: MarkerId, html: &str) -> Result<(), SurfaceError> {
        self.marker(id)?.marker.bind_popup(html);
        Ok(())
    }

    fn open_marker_popup(&mut self, id: MarkerId) -> Result<(), SurfaceError> {
        self.marker(id)?.marker.open_popup();
        Ok(())
    }

    fn draw_path(
        &mut self,
        points: &[LatLng],
        style: &StrokeStyle,
    ) -> Result<PathId, SurfaceError> {
        let path = leaflet_polyline(&js_ring(points).into(), &stroke_options(style).into());
        path.add_to(&self.map);
        let id = self.issue();
        self.paths.insert(id, path);
        Ok(PathId(id))
    }

    fn remove_path(&mut self, id: PathId) -> Result<(), SurfaceError> {
        let path = self
            .paths
            .remove(&id.0)
            .ok_or(SurfaceError::PathNotFound { id: id.0 })?;
        self.map.remove_layer(path.as_ref());
        Ok(())
    }

    fn bind_path_popup(&mut self, id: PathId, html: &str) -> Result<(), SurfaceError> {
        self.paths
            .get(&id.0)
            .ok_or(SurfaceError::PathNotFound { id: id.0 })?
            .bind_popup(html);
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, options: FitOptions) -> Result<(), SurfaceError> {
        let corners = Array::of2(
            &js_latlng(bounds.southwest()).into(),
            &js_latlng(bounds.northeast()).into(),
        );
        let fit = Object::new();
        let padding = JsValue::from_f64(options.padding_px);
        set_js(&fit, "padding", Array::of2(&padding, &padding).into());
        set_js(&fit, "maxZoom", JsValue::from_f64(f64::from(options.max_zoom)));
        self.map.fit_bounds_js(&corners.into(), &fit.into());
        Ok(())
    }

    fn add_boundary(
        &mut self,
        ring: &[LatLng],
        style: &StrokeStyle,
    ) -> Result<OverlayId, SurfaceError> {
        let options = stroke_options(style);
        set_js(&options, "fillColor", JsValue::from_str("transparent"));
        set_js(&options, "fillOpacity", JsValue::from_f64(0.0));
        // Constructed but not added; the toggle control shows it on demand.
        let layer = leaflet_polygon(&js_ring(ring).into(), &options.into());
        let id = self.issue();
        self.overlays.insert(
            id,
            OverlayEntry {
                layer,
                visible: false,
            },
        );
        Ok(OverlayId(id))
    }

    fn set_boundary_visible(&mut self, id: OverlayId, visible: bool) -> Result<(), SurfaceError> {
        let entry = self
            .overlays
            .get_mut(&id.0)
            .ok_or(SurfaceError::OverlayNotFound { id: id.0 })?;
        if visible == entry.visible {
            return Ok(());
        }
        if visible {
            entry.layer.add_to(&self.map);
        } else {
            self.map.remove_layer(entry.layer.as_ref());
        }
        entry.visible = visible;
        Ok(())
    }

    fn add_corner_control(&mut self, spec: &ControlSpec) -> Result<(), SurfaceError> {
        let container = dom_util_create("div", "leaflet-bar leaflet-control leaflet-control-custom");
        let style = container.style();
        let _ = style.set_property("background-color", "white");
        let _ = style.set_property("padding", "8px 12px");
        let _ = style.set_property("cursor", "pointer");
        let _ = style.set_property("border-radius", "6px");
        let _ = style.set_property("box-shadow", "0 2px 6px rgba(0,0,0,0.3)");
        container.set_inner_html(spec.label);
        // Keep clicks and wheel events on the button from reaching the map.
        disable_click_propagation(&container);
        disable_scroll_propagation(&container);

        let action = spec.action;
        let on_click = {
            let hook = Rc::clone(&self.action_hook);
            Closure::wrap(Box::new(move || hook(action)) as Box<dyn FnMut()>)
        };
        container
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(|_| SurfaceError::Backend("control click listener rejected".into()))?;

        let on_add = {
            let container = container.clone();
            Closure::wrap(Box::new(move |_map: JsValue| container.clone())
                as Box<dyn FnMut(JsValue) -> web_sys::HtmlElement>)
        };
        let options = Object::new();
        set_js(
            &options,
            "position",
            JsValue::from_str(control_position_str(spec.position)),
        );
        let control = leaflet_control(&options.into());
        let _ = Reflect::set(
            control.as_ref(),
            &JsValue::from_str("onAdd"),
            on_add.as_ref(),
        );
        control.add_to(&self.map);

        self.controls.push(ControlEntry {
            _on_add: on_add,
            _on_click: on_click,
        });
        Ok(())
    }
}
