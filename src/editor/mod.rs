//! Interactive region editor for one loaded document
//!
//! Pointer events come from whatever canvas hosts the page; the editor is
//! toolkit-agnostic and only tracks rectangle state. All coordinates it
//! sees are display-space.
//!
//! Press outside every rectangle starts drawing a new one; press inside an
//! existing rectangle selects it, and a drag then redefines that rectangle
//! from the press point (the same draw-an-extent gesture as creation, not a
//! translation). Release ends the gesture and keeps the selection.

use std::path::Path;

use image::RgbaImage;

use crate::domain::{DocumentRegions, Rect, Scale};
use crate::error::Result;
use crate::mask;
use crate::store::RegionStore;

/// Editing state for the currently loaded document.
///
/// Selection is by list index. The editor is the only mutator and
/// [`Editor::load`] clears the selection, so an index cannot outlive the
/// rectangle it names.
#[derive(Clone, Debug)]
pub struct Editor {
    document_id: String,
    scale: Scale,
    rectangles: Vec<Rect>,
    selected: Option<usize>,
    drag_origin: Option<(f32, f32)>,
}

impl Editor {
    /// Editor for a freshly loaded document with no regions yet
    pub fn new(document_id: impl Into<String>, scale: Scale) -> Self {
        Self {
            document_id: document_id.into(),
            scale,
            rectangles: Vec::new(),
            selected: None,
            drag_origin: None,
        }
    }

    /// Replace the editor's contents wholesale for a newly loaded document.
    /// The scale comes from the new load operation, never from a previous
    /// document.
    pub fn load(&mut self, document_id: impl Into<String>, scale: Scale, rectangles: Vec<Rect>) {
        self.document_id = document_id.into();
        self.scale = scale;
        self.rectangles = rectangles;
        self.selected = None;
        self.drag_origin = None;
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn rectangles(&self) -> &[Rect] {
        &self.rectangles
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Pointer pressed at a display-space point.
    ///
    /// The first rectangle in insertion order whose bounds contain the
    /// point wins; there is no z-order beyond the list. No hit appends a
    /// degenerate rectangle at the point and selects it.
    pub fn pointer_pressed(&mut self, x: f32, y: f32) {
        self.drag_origin = Some((x, y));
        if let Some(index) = self
            .rectangles
            .iter()
            .position(|rect| rect.contains_point(x, y))
        {
            self.selected = Some(index);
        } else {
            self.rectangles.push(Rect::new(x, y, x, y));
            self.selected = Some(self.rectangles.len() - 1);
        }
    }

    /// Pointer moved while the button is down: the selected rectangle spans
    /// from the press point to the live pointer position
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        let (Some((ox, oy)), Some(index)) = (self.drag_origin, self.selected) else {
            return;
        };
        if let Some(rect) = self.rectangles.get_mut(index) {
            *rect = Rect::new(ox, oy, x, y);
        }
    }

    /// Pointer released: the drag ends, the selection stays. A rectangle
    /// released without moving is kept even though it is degenerate.
    pub fn pointer_released(&mut self) {
        self.drag_origin = None;
    }

    /// Remove the selected rectangle. A missing or stale selection is a
    /// silent no-op, not an error.
    pub fn delete_selected(&mut self) {
        if let Some(index) = self.selected.take()
            && index < self.rectangles.len()
        {
            self.rectangles.remove(index);
        }
    }

    /// Persist the current region set and scale under this document's id
    pub fn commit(&self, store_path: &Path) -> Result<()> {
        let regions = DocumentRegions::new(self.scale.get(), self.rectangles.clone());
        RegionStore::save(store_path, &self.document_id, regions)?;
        log::info!(
            "saved {} region(s) for {}",
            self.rectangles.len(),
            self.document_id
        );
        Ok(())
    }

    /// Fill the selected rectangle's native-space area into a working copy
    /// of the current page (live preview before a full save)
    pub fn apply_selected(&self, page: &mut RgbaImage) {
        if let Some(rect) = self.selected.and_then(|index| self.rectangles.get(index)) {
            mask::fill_region(page, rect, self.scale);
        }
    }
}
