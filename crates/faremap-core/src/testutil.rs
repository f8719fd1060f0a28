#![forbid(unsafe_code)]

//! In-memory fakes for the two platform seams. Native tests drive the full
//! app against these; accessors panic on bad handles because a bad handle in
//! a test is a test bug.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::bindings::{HostPage, ViewId};
use crate::error::{PageError, SurfaceError};
use crate::geo::{GeoBounds, LatLng};
use crate::markers::MarkerIcon;
use crate::surface::{
    ControlSpec, FitOptions, MapSurface, MarkerId, OverlayId, PathId, StrokeStyle,
};

// ---------------------------------------------------------------------------
// FakePage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ScrollEvent {
    Top,
    Bottom,
    To(f64),
}

/// Host page backed by string maps. The results section is absent until
/// [`FakePage::with_results_section`] provides it.
pub(crate) struct FakePage {
    values: HashMap<ViewId, String>,
    texts: HashMap<ViewId, String>,
    htmls: HashMap<ViewId, String>,
    classes: HashMap<ViewId, BTreeSet<String>>,
    displays: HashMap<ViewId, String>,
    disabled: HashMap<ViewId, bool>,
    body_classes: BTreeSet<String>,
    missing: HashSet<ViewId>,
    passenger_active: Vec<bool>,
    results_offset: f64,
    header_height: f64,
    overlay_present: bool,
    overlay_creates: u32,
    pub scroll_log: Vec<ScrollEvent>,
}

impl FakePage {
    pub fn new() -> Self {
        let mut missing = HashSet::new();
        missing.insert(ViewId::ResultsSection);
        Self {
            values: HashMap::new(),
            texts: HashMap::new(),
            htmls: HashMap::new(),
            classes: HashMap::new(),
            displays: HashMap::new(),
            disabled: HashMap::new(),
            body_classes: BTreeSet::new(),
            missing,
            passenger_active: vec![false; 6],
            results_offset: 0.0,
            header_height: 0.0,
            overlay_present: false,
            overlay_creates: 0,
            scroll_log: Vec::new(),
        }
    }

    /// Mark an element as absent from the document.
    pub fn without(mut self, view: ViewId) -> Self {
        self.missing.insert(view);
        self
    }

    /// Inject the results section at the given offset.
    pub fn with_results_section(mut self, offset: f64) -> Self {
        self.missing.remove(&ViewId::ResultsSection);
        self.results_offset = offset;
        self
    }

    pub fn with_header_height(mut self, height: f64) -> Self {
        self.header_height = height;
        self
    }

    /// Make the results section appear mid-test.
    pub fn inject_results_section(&mut self, offset: f64) {
        self.missing.remove(&ViewId::ResultsSection);
        self.results_offset = offset;
    }

    fn check(&self, view: ViewId) -> Result<(), PageError> {
        if self.missing.contains(&view) {
            Err(PageError::ElementGone(view.dom_id()))
        } else {
            Ok(())
        }
    }

    // Accessors for assertions.

    pub fn value_of(&self, view: ViewId) -> String {
        self.values.get(&view).cloned().unwrap_or_default()
    }

    pub fn text_of(&self, view: ViewId) -> String {
        self.texts.get(&view).cloned().unwrap_or_default()
    }

    pub fn html_of(&self, view: ViewId) -> String {
        self.htmls.get(&view).cloned().unwrap_or_default()
    }

    pub fn has_class(&self, view: ViewId, class: &str) -> bool {
        self.classes
            .get(&view)
            .is_some_and(|set| set.contains(class))
    }

    pub fn display_of(&self, view: ViewId) -> String {
        self.displays.get(&view).cloned().unwrap_or_default()
    }

    pub fn is_disabled(&self, view: ViewId) -> bool {
        self.disabled.get(&view).copied().unwrap_or(false)
    }

    pub fn body_has_class(&self, class: &str) -> bool {
        self.body_classes.contains(class)
    }

    pub fn active_passenger_buttons(&self) -> Vec<usize> {
        self.passenger_active
            .iter()
            .enumerate()
            .filter_map(|(i, active)| active.then_some(i))
            .collect()
    }

    pub fn overlay_present(&self) -> bool {
        self.overlay_present
    }

    pub fn overlay_creates(&self) -> u32 {
        self.overlay_creates
    }
}

impl HostPage for FakePage {
    fn value(&self, view: ViewId) -> Result<String, PageError> {
        self.check(view)?;
        Ok(self.value_of(view))
    }

    fn set_value(&mut self, view: ViewId, value: &str) -> Result<(), PageError> {
        self.check(view)?;
        self.values.insert(view, value.to_owned());
        Ok(())
    }

    fn set_text(&mut self, view: ViewId, text: &str) -> Result<(), PageError> {
        self.check(view)?;
        self.texts.insert(view, text.to_owned());
        Ok(())
    }

    fn set_html(&mut self, view: ViewId, html: &str) -> Result<(), PageError> {
        self.check(view)?;
        self.htmls.insert(view, html.to_owned());
        Ok(())
    }

    fn add_class(&mut self, view: ViewId, class: &str) -> Result<(), PageError> {
        self.check(view)?;
        self.classes.entry(view).or_default().insert(class.to_owned());
        Ok(())
    }

    fn remove_class(&mut self, view: ViewId, class: &str) -> Result<(), PageError> {
        self.check(view)?;
        if let Some(set) = self.classes.get_mut(&view) {
            set.remove(class);
        }
        Ok(())
    }

    fn set_display(&mut self, view: ViewId, value: &str) -> Result<(), PageError> {
        self.check(view)?;
        self.displays.insert(view, value.to_owned());
        Ok(())
    }

    fn set_disabled(&mut self, view: ViewId, disabled: bool) -> Result<(), PageError> {
        self.check(view)?;
        self.disabled.insert(view, disabled);
        Ok(())
    }

    fn element_exists(&self, view: ViewId) -> bool {
        !self.missing.contains(&view)
    }

    fn add_body_class(&mut self, class: &str) -> Result<(), PageError> {
        self.body_classes.insert(class.to_owned());
        Ok(())
    }

    fn remove_body_class(&mut self, class: &str) -> Result<(), PageError> {
        self.body_classes.remove(class);
        Ok(())
    }

    fn passenger_button_count(&self) -> usize {
        self.passenger_active.len()
    }

    fn set_passenger_button_active(
        &mut self,
        index: usize,
        active: bool,
    ) -> Result<(), PageError> {
        match self.passenger_active.get_mut(index) {
            Some(slot) => {
                *slot = active;
                Ok(())
            }
            None => Err(PageError::WriteFailed("passenger-btn")),
        }
    }

    fn results_section_offset(&self) -> Result<f64, PageError> {
        self.check(ViewId::ResultsSection)?;
        Ok(self.results_offset)
    }

    fn sticky_header_height(&self) -> f64 {
        self.header_height
    }

    fn scroll_to(&mut self, top: f64) {
        self.scroll_log.push(ScrollEvent::To(top));
    }

    fn scroll_to_top(&mut self) {
        self.scroll_log.push(ScrollEvent::Top);
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_log.push(ScrollEvent::Bottom);
    }

    fn show_loading_overlay(&mut self) -> Result<(), PageError> {
        if !self.overlay_present {
            self.overlay_present = true;
            self.overlay_creates += 1;
        }
        Ok(())
    }

    fn remove_loading_overlay(&mut self) -> Result<(), PageError> {
        self.overlay_present = false;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeSurface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeMarker {
    pub position: LatLng,
    pub draggable: bool,
    pub icon: MarkerIcon,
    pub popup_html: Option<String>,
    pub popup_open: bool,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakePath {
    pub points: Vec<LatLng>,
    pub style: StrokeStyle,
    pub popup_html: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FakeOverlay {
    pub ring_len: usize,
    pub visible: bool,
    pub style: StrokeStyle,
}

/// Map surface backed by ordered maps, with one-shot failure injection.
pub(crate) struct FakeSurface {
    next_id: u32,
    next_order: u32,
    pending_failure: Option<String>,
    pub markers: BTreeMap<u32, FakeMarker>,
    pub paths: BTreeMap<u32, FakePath>,
    pub overlays: BTreeMap<u32, FakeOverlay>,
    pub fits: Vec<(GeoBounds, FitOptions)>,
    pub controls: Vec<ControlSpec>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            next_order: 0,
            pending_failure: None,
            markers: BTreeMap::new(),
            paths: BTreeMap::new(),
            overlays: BTreeMap::new(),
            fits: Vec::new(),
            controls: Vec::new(),
        }
    }

    /// Make the next surface call fail with a backend error.
    pub fn fail_next(&mut self, msg: impl Into<String>) {
        self.pending_failure = Some(msg.into());
    }

    pub fn marker(&self, id: MarkerId) -> &FakeMarker {
        self.markers.get(&id.0).expect("marker exists")
    }

    pub fn path(&self, id: PathId) -> &FakePath {
        self.paths.get(&id.0).expect("path exists")
    }

    pub fn overlay(&self, id: OverlayId) -> &FakeOverlay {
        self.overlays.get(&id.0).expect("overlay exists")
    }

    fn check_failure(&mut self) -> Result<(), SurfaceError> {
        match self.pending_failure.take() {
            Some(msg) => Err(SurfaceError::Backend(msg)),
            None => Ok(()),
        }
    }

    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn stamp(&mut self) -> u32 {
        self.next_order += 1;
        self.next_order
    }
}

impl MapSurface for FakeSurface {
    fn add_marker(
        &mut self,
        position: LatLng,
        icon: &MarkerIcon,
        draggable: bool,
    ) -> Result<MarkerId, SurfaceError> {
        self.check_failure()?;
        let id = self.issue();
        let order = self.stamp();
        self.markers.insert(
            id,
            FakeMarker {
                position,
                draggable,
                icon: *icon,
                popup_html: None,
                popup_open: false,
                order,
            },
        );
        Ok(MarkerId(id))
    }

    fn move_marker(&mut self, id: MarkerId, position: LatLng) -> Result<(), SurfaceError> {
        self.check_failure()?;
        let marker = self
            .markers
            .get_mut(&id.0)
            .ok_or(SurfaceError::MarkerNotFound { id: id.0 })?;
        marker.position = position;
        Ok(())
    }

    fn remove_marker(&mut self, id: MarkerId) -> Result<(), SurfaceError> {
        self.check_failure()?;
        self.markers
            .remove(&id.0)
            .map(|_| ())
            .ok_or(SurfaceError::MarkerNotFound { id: id.0 })
    }

    fn set_marker_draggable(
        &mut self,
        id: MarkerId,
        draggable: bool,
    ) -> Result<(), SurfaceError> {
        self.check_failure()?;
        let marker = self
            .markers
            .get_mut(&id.0)
            .ok_or(SurfaceError::MarkerNotFound { id: id.0 })?;
        marker.draggable = draggable;
        Ok(())
    }

    fn set_marker_icon(&mut self, id: MarkerId, icon: &MarkerIcon) -> Result<(), SurfaceError> {
        self.check_failure()?;
        let marker = self
            .markers
            .get_mut(&id.0)
            .ok_or(SurfaceError::MarkerNotFound { id: id.0 })?;
        marker.icon = *icon;
        Ok(())
    }

    fn bind_marker_popup(&mut self, id: MarkerId, html: &str) -> Result<(), SurfaceError> {
        self.check_failure()?;
        let marker = self
            .markers
            .get_mut(&id.0)
            .ok_or(SurfaceError::MarkerNotFound { id: id.0 })?;
        marker.popup_html = Some(html.to_owned());
        Ok(())
    }

    fn open_marker_popup(&mut self, id: MarkerId) -> Result<(), SurfaceError> {
        self.check_failure()?;
        let marker = self
            .markers
            .get_mut(&id.0)
            .ok_or(SurfaceError::MarkerNotFound { id: id.0 })?;
        marker.popup_open = true;
        Ok(())
    }

    fn draw_path(
        &mut self,
        points: &[LatLng],
        style: &StrokeStyle,
    ) -> Result<PathId, SurfaceError> {
        self.check_failure()?;
        let id = self.issue();
        let order = self.stamp();
        self.paths.insert(
            id,
            FakePath {
                points: points.to_vec(),
                style: *style,
                popup_html: None,
                order,
            },
        );
        Ok(PathId(id))
    }

    fn remove_path(&mut self, id: PathId) -> Result<(), SurfaceError> {
        self.check_failure()?;
        self.paths
            .remove(&id.0)
            .map(|_| ())
            .ok_or(SurfaceError::PathNotFound { id: id.0 })
    }

    fn bind_path_popup(&mut self, id: PathId, html: &str) -> Result<(), SurfaceError> {
        self.check_failure()?;
        let path = self
            .paths
            .get_mut(&id.0)
            .ok_or(SurfaceError::PathNotFound { id: id.0 })?;
        path.popup_html = Some(html.to_owned());
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, options: FitOptions) -> Result<(), SurfaceError> {
        self.check_failure()?;
        self.fits.push((bounds, options));
        Ok(())
    }

    fn add_boundary(
        &mut self,
        ring: &[LatLng],
        style: &StrokeStyle,
    ) -> Result<OverlayId, SurfaceError> {
        self.check_failure()?;
        let id = self.issue();
        self.overlays.insert(
            id,
            FakeOverlay {
                ring_len: ring.len(),
                visible: false,
                style: *style,
            },
        );
        Ok(OverlayId(id))
    }

    fn set_boundary_visible(&mut self, id: OverlayId, visible: bool) -> Result<(), SurfaceError> {
        self.check_failure()?;
        let overlay = self
            .overlays
            .get_mut(&id.0)
            .ok_or(SurfaceError::OverlayNotFound { id: id.0 })?;
        overlay.visible = visible;
        Ok(())
    }

    fn add_corner_control(&mut self, spec: &ControlSpec) -> Result<(), SurfaceError> {
        self.check_failure()?;
        self.controls.push(*spec);
        Ok(())
    }
}
