//! Document model: scene elements, their styles, and the undoable store.
//!
//! This module defines what is on the canvas (`Element`, `Shape`,
//! `ElementKind`), a sparse-update type for drag and resize edits
//! (`ElementPatch`), a backend-neutral handle for decoded images (`ImageRef`),
//! and the runtime store that owns the live element sequence plus its redo
//! history (`SceneStore`).
//!
//! Data flows into this layer from the tool engine (gesture output), the
//! template library, and the image import queue. Renderers read the sequence
//! in order; later elements draw on top.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::Color;
use crate::geom::Point;

/// Unique identifier for a scene element.
pub type ElementId = Uuid;

/// Reserved id carried by in-progress elements until they are committed.
pub const PROVISIONAL_ID: ElementId = Uuid::nil();

/// Discriminant of an element, as reported to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Freehand polyline (brush, eraser, highlighter, rainbow).
    Stroke,
    /// Straight polyline without smoothing (line tool, template roofs).
    SimpleLine,
    Arrow,
    Rect,
    /// Ellipse with independent x/y radii.
    Ellipse,
    /// Regular polygon.
    Polygon,
    Star,
    /// Closed heart outline.
    Heart,
    /// Cloud of spray dots.
    Spray,
    /// Text and stickers.
    Text,
    Image,
    /// Pattern-brush rosette.
    Pattern,
    /// Full-canvas flat fill.
    Fill,
    /// Full-canvas rainbow gradient.
    Gradient,
}

/// Which freehand brush produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushKind {
    Pen,
    /// Paints the background color over existing content.
    Eraser,
    Highlighter,
}

/// Paint attributes shared by every element kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub fill: Option<Color>,
    /// Whole-element opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self { stroke: None, stroke_width: 1.0, fill: None, opacity: 1.0 }
    }
}

impl Style {
    /// Outline only.
    #[must_use]
    pub fn outline(color: Color, width: f64) -> Self {
        Self { stroke: Some(color), stroke_width: width, ..Self::default() }
    }

    /// Fill only.
    #[must_use]
    pub fn solid(color: Color) -> Self {
        Self { fill: Some(color), ..Self::default() }
    }

    /// Filled and outlined in the same color.
    #[must_use]
    pub fn filled_outline(color: Color, width: f64) -> Self {
        Self { stroke: Some(color), stroke_width: width, fill: Some(color), opacity: 1.0 }
    }

    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        Self { opacity, ..self }
    }
}

/// A decoded RGBA8 raster (straight alpha, row-major).
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Shared, backend-neutral handle to a decoded image.
///
/// Clones share one allocation; equality is identity.
#[derive(Clone)]
pub struct ImageRef(Arc<RasterImage>);

impl ImageRef {
    #[must_use]
    pub fn new(image: RasterImage) -> Self {
        Self(Arc::new(image))
    }

    #[must_use]
    pub fn raster(&self) -> &RasterImage {
        &self.0
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height
    }
}

impl PartialEq for ImageRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageRef({}x{})", self.0.width, self.0.height)
    }
}

/// Variant-specific geometry of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Stroke { brush: BrushKind, points: Vec<Point> },
    /// Freehand stroke whose segment `i` is drawn in `colors[i]`.
    Rainbow { points: Vec<Point>, colors: Vec<Color> },
    SimpleLine { points: Vec<Point> },
    Arrow { from: Point, to: Point, head_length: f64, head_width: f64 },
    Rect { origin: Point, width: f64, height: f64 },
    Ellipse { center: Point, radius_x: f64, radius_y: f64 },
    /// `rotation` is clockwise degrees.
    Polygon { center: Point, sides: u32, radius: f64, rotation: f64 },
    Star { center: Point, points: u32, inner_radius: f64, outer_radius: f64 },
    Heart { points: Vec<Point> },
    Spray { dots: Vec<Point>, dot_radius: f64 },
    /// `origin` is the top-left of the text box.
    Text { origin: Point, text: String, font_size: f64 },
    Image { origin: Point, width: f64, height: f64, image: ImageRef },
    Pattern { center: Point, size: f64 },
    Fill { width: f64, height: f64 },
    Gradient { width: f64, height: f64 },
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Stroke { .. } | Self::Rainbow { .. } => ElementKind::Stroke,
            Self::SimpleLine { .. } => ElementKind::SimpleLine,
            Self::Arrow { .. } => ElementKind::Arrow,
            Self::Rect { .. } => ElementKind::Rect,
            Self::Ellipse { .. } => ElementKind::Ellipse,
            Self::Polygon { .. } => ElementKind::Polygon,
            Self::Star { .. } => ElementKind::Star,
            Self::Heart { .. } => ElementKind::Heart,
            Self::Spray { .. } => ElementKind::Spray,
            Self::Text { .. } => ElementKind::Text,
            Self::Image { .. } => ElementKind::Image,
            Self::Pattern { .. } => ElementKind::Pattern,
            Self::Fill { .. } => ElementKind::Fill,
            Self::Gradient { .. } => ElementKind::Gradient,
        }
    }
}

/// One drawable unit of the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub style: Style,
    pub shape: Shape,
    /// Whether the select tool may reposition this element.
    pub draggable: bool,
}

impl Element {
    /// New non-draggable element carrying the provisional id.
    #[must_use]
    pub fn new(style: Style, shape: Shape) -> Self {
        Self { id: PROVISIONAL_ID, style, shape, draggable: false }
    }

    #[must_use]
    pub fn draggable(mut self) -> Self {
        self.draggable = true;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.shape.kind()
    }

    /// Whether this element has not yet been committed to a store.
    #[must_use]
    pub fn is_provisional(&self) -> bool {
        self.id == PROVISIONAL_ID
    }

    /// Full-canvas fills sit behind everything and are never picked.
    #[must_use]
    pub fn is_background(&self) -> bool {
        matches!(self.shape, Shape::Fill { .. } | Shape::Gradient { .. })
    }

    /// Move the element by `(dx, dy)`. Full-canvas fills do not move.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        let shift = |p: &mut Point| *p = p.offset(dx, dy);
        match &mut self.shape {
            Shape::Stroke { points, .. }
            | Shape::Rainbow { points, .. }
            | Shape::SimpleLine { points }
            | Shape::Heart { points }
            | Shape::Spray { dots: points, .. } => points.iter_mut().for_each(shift),
            Shape::Arrow { from, to, .. } => {
                shift(from);
                shift(to);
            }
            Shape::Rect { origin, .. } | Shape::Text { origin, .. } | Shape::Image { origin, .. } => shift(origin),
            Shape::Ellipse { center, .. }
            | Shape::Polygon { center, .. }
            | Shape::Star { center, .. }
            | Shape::Pattern { center, .. } => shift(center),
            Shape::Fill { .. } | Shape::Gradient { .. } => {}
        }
    }

    /// Apply a sparse patch. Returns whether anything changed.
    pub fn apply_patch(&mut self, patch: &ElementPatch) -> bool {
        let mut changed = false;
        if let Some(delta) = patch.offset {
            self.translate(delta.x, delta.y);
            changed = true;
        }
        if let Some((w, h)) = patch.size {
            match &mut self.shape {
                Shape::Rect { width, height, .. } | Shape::Image { width, height, .. } => {
                    *width = w;
                    *height = h;
                    changed = true;
                }
                Shape::Ellipse { radius_x, radius_y, .. } => {
                    *radius_x = w / 2.0;
                    *radius_y = h / 2.0;
                    changed = true;
                }
                _ => {}
            }
        }
        if let Some(style) = patch.style {
            self.style = style;
            changed = true;
        }
        changed
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementPatch {
    /// Translation to apply.
    pub offset: Option<Point>,
    /// New `(width, height)` for rect, ellipse and image elements.
    pub size: Option<(f64, f64)>,
    /// Replacement style.
    pub style: Option<Style>,
}

/// Ordered element sequence plus the stack of undone elements.
///
/// Order is z-order. `undo` and `redo` move exactly one element between the
/// two sequences and are exact inverses while nothing new is appended.
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    elements: Vec<Element>,
    undone: Vec<Element>,
}

impl SceneStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Mutations ---

    /// Append an element and invalidate redo history.
    ///
    /// A provisional element receives a fresh permanent id. Returns the id the
    /// element is stored under.
    pub fn append(&mut self, mut element: Element) -> ElementId {
        if element.is_provisional() {
            element.id = Self::next_id();
        }
        let id = element.id;
        self.undone.clear();
        self.elements.push(element);
        id
    }

    /// Mutate the most recent element. No-op on an empty store.
    pub fn update_last<F: FnOnce(&mut Element)>(&mut self, f: F) -> bool {
        match self.elements.last_mut() {
            Some(el) => {
                f(el);
                true
            }
            None => false,
        }
    }

    /// Mutate the trailing window of `n` elements, passing each its index
    /// within the window. Slots before the start of the sequence are skipped.
    pub fn update_last_n<F: FnMut(usize, &mut Element)>(&mut self, n: usize, mut f: F) {
        let len = self.elements.len();
        for i in 0..n {
            if let Some(idx) = (len + i).checked_sub(n) {
                f(i, &mut self.elements[idx]);
            }
        }
    }

    /// Move the last element onto the redo stack.
    pub fn undo(&mut self) -> Option<ElementId> {
        let el = self.elements.pop()?;
        let id = el.id;
        self.undone.push(el);
        Some(id)
    }

    /// Move the most recently undone element back onto the sequence.
    pub fn redo(&mut self) -> Option<ElementId> {
        let el = self.undone.pop()?;
        let id = el.id;
        self.elements.push(el);
        Some(id)
    }

    /// Drop everything. Returns how many image handles were released.
    pub fn clear(&mut self) -> usize {
        let released = self
            .elements
            .iter()
            .chain(&self.undone)
            .filter(|el| matches!(el.shape, Shape::Image { .. }))
            .count();
        self.elements.clear();
        self.undone.clear();
        released
    }

    /// Forget redo history without touching the sequence.
    pub fn clear_redo(&mut self) {
        self.undone.clear();
    }

    pub fn remove_by_id(&mut self, id: &ElementId) -> Option<Element> {
        let idx = self.elements.iter().position(|el| el.id == *id)?;
        Some(self.elements.remove(idx))
    }

    /// Apply `patch` to the element with `id`. Returns whether it was found
    /// and changed.
    pub fn update_by_id(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        self.elements
            .iter_mut()
            .find(|el| el.id == *id)
            .is_some_and(|el| el.apply_patch(patch))
    }

    // --- Queries ---

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|el| el.id == *id)
    }

    /// Elements in draw order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// A fresh permanent id.
    #[must_use]
    pub fn next_id() -> ElementId {
        Uuid::new_v4()
    }
}
