#![forbid(unsafe_code)]

//! Live-document implementation of [`HostPage`].
//!
//! Elements are resolved by id exactly once when the page boots; handlers
//! then address them through [`ViewId`]. The one exception is the results
//! section, which the server injects after a fare request and which is
//! therefore looked up fresh on every access.
//!
//! Scrolling follows the page layout: the form lives in a `.left-panel`
//! column that scrolls independently when present, with the window as the
//! fallback on narrow layouts where the panel does not scroll.

use std::collections::HashMap;

use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, HtmlSelectElement,
    ScrollToOptions, Window,
};

use faremap_core::bindings::{HostPage, ViewId};
use faremap_core::error::PageError;
use faremap_core::scroll::LOCK_SETTLE_DELAY_MS;

const SCROLL_CONTAINER_SELECTOR: &str = ".left-panel";
const STICKY_HEADER_SELECTOR: &str = ".sticky-header";
const PASSENGER_BUTTON_SELECTOR: &str = ".passenger-btn";
const LOADING_OVERLAY_SELECTOR: &str = ".loading-overlay";
const LOADING_OVERLAY_CLASS: &str = "loading-overlay";
const LOADING_OVERLAY_HTML: &str = r#"<div class="loading-spinner"></div>"#;

/// Resolve a window-relative delay as a future.
async fn settle_delay(window: &Window, ms: u64) {
    let ms = i32::try_from(ms).unwrap_or(i32::MAX);
    let promise = Promise::new(&mut |resolve, _reject| {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
    });
    let _ = JsFuture::from(promise).await;
}

fn scroll_element_to(element: &Element, top: f64) {
    let options = ScrollToOptions::new();
    options.set_top(top);
    element.scroll_to_with_scroll_to_options(&options);
}

fn scroll_window_to(window: &Window, top: f64) {
    let options = ScrollToOptions::new();
    options.set_top(top);
    window.scroll_to_with_scroll_to_options(&options);
}

fn left_panel(document: &Document) -> Option<Element> {
    document
        .query_selector(SCROLL_CONTAINER_SELECTOR)
        .ok()
        .flatten()
}

/// [`HostPage`] backed by the real document.
pub(crate) struct DomPage {
    window: Window,
    document: Document,
    elements: HashMap<ViewId, Element>,
}

impl DomPage {
    /// Look up every known element once. Missing elements are simply absent
    /// from the table; `validate_bindings` turns that into a startup error
    /// for the required set.
    pub(crate) fn resolve(window: Window, document: Document) -> Self {
        let mut elements = HashMap::new();
        for view in ViewId::REQUIRED {
            if let Some(element) = document.get_element_by_id(view.dom_id()) {
                elements.insert(view, element);
            }
        }
        Self {
            window,
            document,
            elements,
        }
    }

    fn element(&self, view: ViewId) -> Result<Element, PageError> {
        if view == ViewId::ResultsSection {
            return self
                .document
                .get_element_by_id(view.dom_id())
                .ok_or(PageError::ElementGone(view.dom_id()));
        }
        self.elements
            .get(&view)
            .cloned()
            .ok_or(PageError::ElementGone(view.dom_id()))
    }

    fn html_element(&self, view: ViewId) -> Result<HtmlElement, PageError> {
        self.element(view)?
            .dyn_into::<HtmlElement>()
            .map_err(|_| PageError::ReadFailed(view.dom_id()))
    }

    /// Container for the results-section scroll, per the page layout.
    fn results_scroll_container(&self) -> Option<Element> {
        left_panel(&self.document)
            .or_else(|| self.document.scrolling_element())
            .or_else(|| self.document.document_element())
    }
}

impl HostPage for DomPage {
    fn value(&self, view: ViewId) -> Result<String, PageError> {
        let element = self.element(view)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            Ok(input.value())
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            Ok(select.value())
        } else {
            Err(PageError::ReadFailed(view.dom_id()))
        }
    }

    fn set_value(&mut self, view: ViewId, value: &str) -> Result<(), PageError> {
        let element = self.element(view)?;
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
            Ok(())
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
            Ok(())
        } else {
            Err(PageError::WriteFailed(view.dom_id()))
        }
    }

    fn set_text(&mut self, view: ViewId, text: &str) -> Result<(), PageError> {
        self.element(view)?.set_text_content(Some(text));
        Ok(())
    }

    fn set_html(&mut self, view: ViewId, html: &str) -> Result<(), PageError> {
        self.element(view)?.set_inner_html(html);
        Ok(())
    }

    fn add_class(&mut self, view: ViewId, class: &str) -> Result<(), PageError> {
        self.element(view)?
            .class_list()
            .add_1(class)
            .map_err(|_| PageError::WriteFailed(view.dom_id()))
    }

    fn remove_class(&mut self, view: ViewId, class: &str) -> Result<(), PageError> {
        self.element(view)?
            .class_list()
            .remove_1(class)
            .map_err(|_| PageError::WriteFailed(view.dom_id()))
    }

    fn set_display(&mut self, view: ViewId, value: &str) -> Result<(), PageError> {
        self.html_element(view)?
            .style()
            .set_property("display", value)
            .map_err(|_| PageError::WriteFailed(view.dom_id()))
    }

    fn set_disabled(&mut self, view: ViewId, disabled: bool) -> Result<(), PageError> {
        let element = self.element(view)?;
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(disabled);
            Ok(())
        } else if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_disabled(disabled);
            Ok(())
        } else {
            Err(PageError::WriteFailed(view.dom_id()))
        }
    }

    fn element_exists(&self, view: ViewId) -> bool {
        if view == ViewId::ResultsSection {
            self.document.get_element_by_id(view.dom_id()).is_some()
        } else {
            self.elements.contains_key(&view)
        }
    }

    fn add_body_class(&mut self, class: &str) -> Result<(), PageError> {
        let body = self.document.body().ok_or(PageError::ElementGone("body"))?;
        body.class_list()
            .add_1(class)
            .map_err(|_| PageError::WriteFailed("body"))
    }

    fn remove_body_class(&mut self, class: &str) -> Result<(), PageError> {
        let body = self.document.body().ok_or(PageError::ElementGone("body"))?;
        body.class_list()
            .remove_1(class)
            .map_err(|_| PageError::WriteFailed("body"))
    }

    fn passenger_button_count(&self) -> usize {
        self.document
            .query_selector_all(PASSENGER_BUTTON_SELECTOR)
            .map(|list| list.length() as usize)
            .unwrap_or(0)
    }

    fn set_passenger_button_active(
        &mut self,
        index: usize,
        active: bool,
    ) -> Result<(), PageError> {
        let list = self
            .document
            .query_selector_all(PASSENGER_BUTTON_SELECTOR)
            .map_err(|_| PageError::ReadFailed(PASSENGER_BUTTON_SELECTOR))?;
        let index = u32::try_from(index).map_err(|_| PageError::ElementGone(PASSENGER_BUTTON_SELECTOR))?;
        let element = list
            .get(index)
            .and_then(|node| node.dyn_into::<Element>().ok())
            .ok_or(PageError::ElementGone(PASSENGER_BUTTON_SELECTOR))?;
        element
            .class_list()
            .toggle_with_force("active", active)
            .map(|_| ())
            .map_err(|_| PageError::WriteFailed(PASSENGER_BUTTON_SELECTOR))
    }

    fn results_section_offset(&self) -> Result<f64, PageError> {
        let element = self.html_element(ViewId::ResultsSection)?;
        Ok(f64::from(element.offset_top()))
    }

    fn sticky_header_height(&self) -> f64 {
        self.document
            .query_selector(STICKY_HEADER_SELECTOR)
            .ok()
            .flatten()
            .and_then(|header| header.dyn_into::<HtmlElement>().ok())
            .map_or(0.0, |header| f64::from(header.offset_height()))
    }

    fn scroll_to(&mut self, top: f64) {
        if let Some(container) = self.results_scroll_container() {
            scroll_element_to(&container, top);
        }
    }

    fn scroll_to_top(&mut self) {
        // Deferred one settle tick so layout collapse from the reset lands
        // before the scroll position is applied.
        let window = self.window.clone();
        let document = self.document.clone();
        spawn_local(async move {
            settle_delay(&window, LOCK_SETTLE_DELAY_MS).await;
            match left_panel(&document) {
                Some(panel) => scroll_element_to(&panel, 0.0),
                None => scroll_window_to(&window, 0.0),
            }
        });
    }

    fn scroll_to_bottom(&mut self) {
        match left_panel(&self.document) {
            Some(panel) => {
                let bottom = f64::from(panel.scroll_height());
                scroll_element_to(&panel, bottom);
            }
            None => {
                let bottom = self
                    .document
                    .body()
                    .map_or(0.0, |body| f64::from(body.scroll_height()));
                scroll_window_to(&self.window, bottom);
            }
        }
    }

    fn show_loading_overlay(&mut self) -> Result<(), PageError> {
        let form = self.html_element(ViewId::PredictionForm)?;
        let existing = form
            .query_selector(LOADING_OVERLAY_SELECTOR)
            .map_err(|_| PageError::ReadFailed(LOADING_OVERLAY_SELECTOR))?;
        if existing.is_some() {
            return Ok(());
        }
        let overlay = self
            .document
            .create_element("div")
            .map_err(|_| PageError::WriteFailed(LOADING_OVERLAY_SELECTOR))?;
        overlay.set_class_name(LOADING_OVERLAY_CLASS);
        overlay.set_inner_html(LOADING_OVERLAY_HTML);
        // The overlay positions itself against the form.
        let _ = form.style().set_property("position", "relative");
        form.append_child(&overlay)
            .map(|_| ())
            .map_err(|_| PageError::WriteFailed(LOADING_OVERLAY_SELECTOR))
    }

    fn remove_loading_overlay(&mut self) -> Result<(), PageError> {
        let form = self.element(ViewId::PredictionForm)?;
        if let Ok(Some(overlay)) = form.query_selector(LOADING_OVERLAY_SELECTOR) {
            overlay.remove();
        }
        Ok(())
    }
}
