//! Tool engine: turns pointer events into scene elements.
//!
//! `EngineCore` owns the scene store, the UI state and the active gesture. Each
//! input handler takes the tool configuration by reference, mutates state
//! synchronously, and returns the [`Action`]s the host should react to.
//! Nothing here renders; hosts call [`EngineCore::visible_elements`] to get the
//! frame contents, which include the in-progress gesture.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::borrow::Cow;
use std::mem;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::catalog::Stamp;
use crate::color::Color;
use crate::consts::{
    ARROW_POINTER_FACTOR, BACKGROUND, ERASER_WIDTH_FACTOR, HIGHLIGHTER_OPACITY, IMPORT_MARGIN, IMPORT_OFFSET,
    PATTERN_SPACING_FACTOR, RAINBOW, SPRAY_DOT_RADIUS, SPRAY_INITIAL_DENSITY, SPRAY_MOVE_DENSITY,
    SPRAY_RADIUS_FACTOR, STAMP_RADIUS_FACTOR, STAMP_STROKE_WIDTH, STAR_INNER_RATIO, STAR_POINTS,
    STICKER_FONT_FACTOR, STICKER_OFFSET, TEXT_FONT_FACTOR,
};
use crate::doc::{BrushKind, Element, ElementId, ElementPatch, ImageRef, SceneStore, Shape, Style};
use crate::geom::{self, CanvasSize, Point};
use crate::hit;
use crate::input::{Gesture, GestureAction, InputState, TextEntry, Tool, ToolCategory, ToolConfig, UiState};
use crate::templates::Template;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    ElementCreated(ElementId),
    ElementUpdated(ElementId),
    SelectionChanged(Option<ElementId>),
    /// The host should show an inline text editor at `at`.
    EditTextRequested { at: Point },
    RenderNeeded,
}

/// Core engine state: scene, selection, active gesture and the random source
/// used by the spray tool.
pub struct EngineCore {
    pub scene: SceneStore,
    pub ui: UiState,
    pub input: InputState,
    pub size: CanvasSize,
    rng: StdRng,
    rainbow_cursor: usize,
}

impl EngineCore {
    #[must_use]
    pub fn new(size: CanvasSize) -> Self {
        Self::with_rng(size, StdRng::from_os_rng())
    }

    /// Engine whose spray output is reproducible.
    #[must_use]
    pub fn with_seed(size: CanvasSize, seed: u64) -> Self {
        Self::with_rng(size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(size: CanvasSize, rng: StdRng) -> Self {
        Self {
            scene: SceneStore::new(),
            ui: UiState::default(),
            input: InputState::Idle,
            size,
            rng,
            rainbow_cursor: 0,
        }
    }

    // --- Pointer input ---

    /// Start a gesture, or place a finished element for stamping tools.
    ///
    /// Any gesture still active is committed first, and an open text entry is
    /// discarded.
    pub fn on_pointer_down(&mut self, pt: Point, cfg: &ToolConfig) -> Vec<Action> {
        let mut actions = self.finish_gesture();
        if self.ui.text_entry.take().is_some() {
            tracing::debug!("text entry abandoned by pointer-down");
        }

        match cfg.tool.category() {
            ToolCategory::Select => self.select_at(pt, cfg, &mut actions),
            ToolCategory::Stamping => self.stamp_at(pt, cfg, &mut actions),
            ToolCategory::Continuous => {
                self.scene.clear_redo();
                let action = self.begin_continuous(pt, cfg);
                self.input = InputState::Drawing(Gesture { config: *cfg, start: pt, action });
                actions.push(Action::RenderNeeded);
            }
            ToolCategory::Shape => {
                self.scene.clear_redo();
                self.input = InputState::Drawing(Gesture {
                    config: *cfg,
                    start: pt,
                    action: GestureAction::Shape { preview: None },
                });
            }
        }
        actions
    }

    /// Extend the active gesture. Ignored while idle.
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let Self { scene, input, size, rng, rainbow_cursor, .. } = self;
        let InputState::Drawing(gesture) = input else {
            return Vec::new();
        };
        let cfg = gesture.config;
        let mut actions = Vec::new();

        match &mut gesture.action {
            GestureAction::Freehand { elements } => {
                let arms = geom::reflect(pt, *size, cfg.mirroring());
                match cfg.tool {
                    Tool::Spray => {
                        let radius = cfg.brush() * SPRAY_RADIUS_FACTOR;
                        for dot in geom::spray_points(rng, pt, radius, SPRAY_MOVE_DENSITY) {
                            for (el, p) in elements.iter_mut().zip(geom::reflect(dot, *size, cfg.mirroring())) {
                                extend(el, p, None);
                            }
                        }
                    }
                    Tool::Rainbow => {
                        *rainbow_cursor = (*rainbow_cursor + 1) % RAINBOW.len();
                        let color = RAINBOW[*rainbow_cursor];
                        for (el, p) in elements.iter_mut().zip(arms) {
                            extend(el, p, Some(color));
                        }
                    }
                    _ => {
                        for (el, p) in elements.iter_mut().zip(arms) {
                            extend(el, p, None);
                        }
                    }
                }
            }
            GestureAction::Pattern { last_stamp } => {
                if pt.distance(*last_stamp) > cfg.brush() * PATTERN_SPACING_FACTOR {
                    *last_stamp = pt;
                    for p in geom::reflect(pt, *size, cfg.mirroring()) {
                        let id = scene.append(rosette_element(p, &cfg));
                        actions.push(Action::ElementCreated(id));
                    }
                }
            }
            GestureAction::Shape { preview } => {
                *preview = shape_element(&cfg, gesture.start, pt);
            }
            GestureAction::Drag { offset, .. } => {
                *offset = Point::new(pt.x - gesture.start.x, pt.y - gesture.start.y);
            }
        }

        actions.push(Action::RenderNeeded);
        actions
    }

    /// Commit the active gesture and return to idle.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        self.finish_gesture()
    }

    // --- Text entry ---

    /// Commit the open text entry. Blank input discards it.
    pub fn submit_text(&mut self, value: &str, cfg: &ToolConfig) -> Vec<Action> {
        let Some(entry) = self.ui.text_entry.take() else {
            return Vec::new();
        };
        if value.trim().is_empty() {
            return vec![Action::RenderNeeded];
        }
        let el = Element::new(
            Style::solid(cfg.color),
            Shape::Text { origin: entry.position, text: value.to_owned(), font_size: cfg.brush() * TEXT_FONT_FACTOR },
        )
        .draggable();
        let id = self.scene.append(el);
        vec![Action::ElementCreated(id), Action::RenderNeeded]
    }

    /// Close the open text entry without committing.
    pub fn cancel_text(&mut self) -> Vec<Action> {
        match self.ui.text_entry.take() {
            Some(_) => vec![Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    // --- Host commands ---

    /// Expand a template around the canvas center.
    pub fn add_template(&mut self, template: Template) -> Vec<Action> {
        let mut actions: Vec<Action> = template
            .expand(self.size.center())
            .into_iter()
            .map(|el| Action::ElementCreated(self.scene.append(el)))
            .collect();
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Insert a decoded image at the import anchor, capped to the canvas.
    pub fn place_image(&mut self, image: ImageRef) -> ElementId {
        let width = f64::from(image.width()).min(self.size.width - IMPORT_MARGIN);
        let height = f64::from(image.height()).min(self.size.height - IMPORT_MARGIN);
        let el = Element::new(
            Style::default(),
            Shape::Image { origin: Point::new(IMPORT_OFFSET, IMPORT_OFFSET), width, height, image },
        )
        .draggable();
        self.scene.append(el)
    }

    pub fn undo(&mut self) -> Vec<Action> {
        match self.scene.undo() {
            Some(id) => {
                let mut actions = self.drop_selection_of(id);
                actions.push(Action::RenderNeeded);
                actions
            }
            None => Vec::new(),
        }
    }

    pub fn redo(&mut self) -> Vec<Action> {
        match self.scene.redo() {
            Some(id) => vec![Action::ElementCreated(id), Action::RenderNeeded],
            None => Vec::new(),
        }
    }

    /// Empty the scene and reset gesture and selection state.
    pub fn clear(&mut self) -> Vec<Action> {
        let released = self.scene.clear();
        if released > 0 {
            tracing::debug!(released, "released image handles");
        }
        self.input = InputState::Idle;
        self.ui = UiState::default();
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    // --- Queries ---

    /// The scene as it should appear right now: committed elements, a dragged
    /// element at its current offset, and in-progress elements on top.
    #[must_use]
    pub fn visible_elements(&self) -> Vec<Cow<'_, Element>> {
        let drag = match &self.input {
            InputState::Drawing(Gesture { action: GestureAction::Drag { id, offset }, .. }) => Some((*id, *offset)),
            _ => None,
        };
        let mut out: Vec<Cow<'_, Element>> = self
            .scene
            .elements()
            .iter()
            .map(|el| match drag {
                Some((id, offset)) if id == el.id => {
                    let mut moved = el.clone();
                    moved.translate(offset.x, offset.y);
                    Cow::Owned(moved)
                }
                _ => Cow::Borrowed(el),
            })
            .collect();

        if let InputState::Drawing(gesture) = &self.input {
            match &gesture.action {
                GestureAction::Freehand { elements } => out.extend(elements.iter().map(Cow::Borrowed)),
                GestureAction::Shape { preview: Some(el) } => out.push(Cow::Borrowed(el)),
                _ => {}
            }
        }
        out
    }

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.ui.selected
    }

    #[must_use]
    pub fn text_entry(&self) -> Option<TextEntry> {
        self.ui.text_entry
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.scene.len()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.scene.can_redo()
    }

    #[must_use]
    pub fn is_drawing(&self) -> bool {
        self.input.is_drawing()
    }

    // --- Internals ---

    fn finish_gesture(&mut self) -> Vec<Action> {
        let InputState::Drawing(gesture) = mem::take(&mut self.input) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        match gesture.action {
            GestureAction::Freehand { elements } => {
                for el in elements {
                    actions.push(Action::ElementCreated(self.scene.append(el)));
                }
            }
            GestureAction::Shape { preview: Some(el) } => {
                actions.push(Action::ElementCreated(self.scene.append(el)));
            }
            GestureAction::Drag { id, offset } => {
                if offset != Point::default() {
                    let patch = ElementPatch { offset: Some(offset), ..ElementPatch::default() };
                    if self.scene.update_by_id(&id, &patch) {
                        actions.push(Action::ElementUpdated(id));
                    }
                }
            }
            GestureAction::Shape { preview: None } | GestureAction::Pattern { .. } => {}
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    fn select_at(&mut self, pt: Point, cfg: &ToolConfig, actions: &mut Vec<Action>) {
        let hit = hit::hit_test(pt, self.scene.elements());
        let selected = hit.map(|h| h.element_id);
        if selected != self.ui.selected {
            self.ui.selected = selected;
            actions.push(Action::SelectionChanged(selected));
        }
        if let Some(id) = selected {
            if self.scene.get(&id).is_some_and(|el| el.draggable) {
                self.input = InputState::Drawing(Gesture {
                    config: *cfg,
                    start: pt,
                    action: GestureAction::Drag { id, offset: Point::default() },
                });
            }
        }
        actions.push(Action::RenderNeeded);
    }

    fn stamp_at(&mut self, pt: Point, cfg: &ToolConfig, actions: &mut Vec<Action>) {
        let size = cfg.brush();
        let el = match cfg.tool {
            Tool::Text => {
                self.ui.text_entry = Some(TextEntry { position: pt });
                actions.push(Action::EditTextRequested { at: pt });
                return;
            }
            Tool::Sticker => cfg.sticker.map(|sticker| {
                Element::new(
                    Style::default(),
                    Shape::Text {
                        origin: pt.offset(-STICKER_OFFSET, -STICKER_OFFSET),
                        text: sticker.emoji.to_owned(),
                        font_size: size * STICKER_FONT_FACTOR,
                    },
                )
                .draggable()
            }),
            Tool::Stamp => cfg.stamp.map(|stamp| stamp_element(stamp, pt, cfg)),
            Tool::Fill => Some(Element::new(
                Style::solid(cfg.color),
                Shape::Fill { width: self.size.width, height: self.size.height },
            )),
            Tool::Gradient => {
                Some(Element::new(Style::default(), Shape::Gradient { width: self.size.width, height: self.size.height }))
            }
            other => {
                tracing::debug!(tool = other.name(), "not a stamping tool");
                None
            }
        };

        match el {
            Some(el) => {
                actions.push(Action::ElementCreated(self.scene.append(el)));
                actions.push(Action::RenderNeeded);
            }
            None => tracing::debug!(tool = cfg.tool.name(), "no catalog selection; ignoring pointer-down"),
        }
    }

    fn begin_continuous(&mut self, pt: Point, cfg: &ToolConfig) -> GestureAction {
        let arms = geom::reflect(pt, self.size, cfg.mirroring());
        let size = cfg.brush();
        let elements = match cfg.tool {
            Tool::Pattern => return GestureAction::Pattern { last_stamp: pt },
            Tool::Spray => {
                let mut clouds: Vec<Element> = arms
                    .iter()
                    .map(|_| {
                        Element::new(
                            Style::solid(cfg.color),
                            Shape::Spray { dots: Vec::new(), dot_radius: SPRAY_DOT_RADIUS },
                        )
                    })
                    .collect();
                let radius = size * SPRAY_RADIUS_FACTOR;
                for dot in geom::spray_points(&mut self.rng, pt, radius, SPRAY_INITIAL_DENSITY) {
                    for (el, p) in clouds.iter_mut().zip(geom::reflect(dot, self.size, cfg.mirroring())) {
                        extend(el, p, None);
                    }
                }
                clouds
            }
            Tool::Rainbow => {
                let color = RAINBOW[self.rainbow_cursor];
                arms.into_iter()
                    .map(|p| {
                        Element::new(
                            Style::outline(color, size),
                            Shape::Rainbow { points: vec![p], colors: vec![color] },
                        )
                    })
                    .collect()
            }
            tool => {
                let (brush, style) = match tool {
                    Tool::Eraser => (BrushKind::Eraser, Style::outline(BACKGROUND, size * ERASER_WIDTH_FACTOR)),
                    Tool::Highlighter => {
                        (BrushKind::Highlighter, Style::outline(cfg.color, size).with_opacity(HIGHLIGHTER_OPACITY))
                    }
                    _ => (BrushKind::Pen, Style::outline(cfg.color, size)),
                };
                arms.into_iter()
                    .map(|p| Element::new(style, Shape::Stroke { brush, points: vec![p] }))
                    .collect()
            }
        };
        GestureAction::Freehand { elements }
    }

    fn drop_selection_of(&mut self, id: ElementId) -> Vec<Action> {
        if self.ui.selected == Some(id) {
            self.ui.selected = None;
            vec![Action::SelectionChanged(None)]
        } else {
            Vec::new()
        }
    }
}

/// Append one point to a growing freehand element.
fn extend(el: &mut Element, p: Point, color: Option<Color>) {
    match &mut el.shape {
        Shape::Stroke { points, .. } | Shape::Spray { dots: points, .. } => points.push(p),
        Shape::Rainbow { points, colors } => {
            points.push(p);
            if let Some(c) = color {
                colors.push(c);
            }
        }
        _ => {}
    }
}

/// Geometry for a shape tool dragged from `start` to `current`.
fn shape_element(cfg: &ToolConfig, start: Point, current: Point) -> Option<Element> {
    let w = current.x - start.x;
    let h = current.y - start.y;
    let radius = w.hypot(h) / 2.0;
    let center = start.offset(w / 2.0, h / 2.0);
    let size = cfg.brush();

    let shape = match cfg.tool {
        Tool::Line => Shape::SimpleLine { points: vec![start, current] },
        Tool::Arrow => Shape::Arrow {
            from: start,
            to: current,
            head_length: size * ARROW_POINTER_FACTOR,
            head_width: size * ARROW_POINTER_FACTOR,
        },
        Tool::Rect => Shape::Rect { origin: Point::new(start.x.min(current.x), start.y.min(current.y)), width: w.abs(), height: h.abs() },
        Tool::Circle => Shape::Ellipse { center, radius_x: w.abs() / 2.0, radius_y: h.abs() / 2.0 },
        Tool::Triangle => Shape::Polygon { center, sides: 3, radius, rotation: 0.0 },
        Tool::Star => {
            Shape::Star { center, points: STAR_POINTS, inner_radius: radius * STAR_INNER_RATIO, outer_radius: radius }
        }
        Tool::Heart => Shape::Heart { points: geom::heart_points(center, radius / 2.0) },
        _ => return None,
    };
    Some(Element::new(Style::outline(cfg.color, size), shape))
}

fn stamp_element(stamp: Stamp, pt: Point, cfg: &ToolConfig) -> Element {
    let size = cfg.brush();
    let outer = size * STAMP_RADIUS_FACTOR;
    let shape = match stamp {
        Stamp::Circle => Shape::Ellipse { center: pt, radius_x: outer, radius_y: outer },
        Stamp::Heart => Shape::Heart { points: geom::heart_points(pt, size) },
        Stamp::Star5 | Stamp::Star6 => {
            Shape::Star { center: pt, points: stamp.vertices().unwrap_or(5), inner_radius: size, outer_radius: outer }
        }
        Stamp::Triangle | Stamp::Square | Stamp::Pentagon | Stamp::Hexagon => {
            Shape::Polygon { center: pt, sides: stamp.vertices().unwrap_or(3), radius: outer, rotation: 0.0 }
        }
    };
    Element::new(Style::filled_outline(cfg.color, STAMP_STROKE_WIDTH), shape).draggable()
}

fn rosette_element(center: Point, cfg: &ToolConfig) -> Element {
    Element::new(Style::solid(cfg.color), Shape::Pattern { center, size: cfg.brush() })
}
