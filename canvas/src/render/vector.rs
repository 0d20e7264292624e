//! Retained backend: elements are lowered to a display list of SVG path data
//! and paints, then rasterized in a second phase.
//!
//! `render_all` rebuilds the retained list (chrome included) and keeps it for
//! inspection. `export_png` builds a chrome-free list, serializes it, and
//! rasterizes the serialized form on a blocking worker when a Tokio runtime is
//! available. Text is lowered to glyph outlines during the first phase, so the
//! worker never needs the font.

use ab_glyph::{Font as _, OutlineCurve, ScaleFont as _};
use async_trait::async_trait;
use kurbo::{BezPath, PathEl, Shape as _};
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, PathBuilder, Pixmap, StrokeDash, Transform};

use super::paint::{self, px};
use super::{BackendError, BackendStatus, Capabilities, EraseMode, Frame, RenderBackend, RenderOptions, SurfaceSpec};
use crate::color::Color;
use crate::consts::{DASH_PX, GUIDE_COLOR, HANDLE_RADIUS_PX, PATTERN_CORE_COLOR, RAINBOW, SELECTION_COLOR};
use crate::doc::{BrushKind, Element, ImageRef, Shape, Style};
use crate::geom::{self, CanvasSize, Point, Symmetry};
use crate::hit;

/// Flattening tolerance for curved primitives, in canvas pixels.
const TOLERANCE: f64 = 0.1;

/// How a display item is colored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Brush {
    Solid { color: Color },
    /// Clears covered pixels to transparent.
    Clear,
    /// The rainbow gradient from x = 0 to x = `width`.
    LinearGradient { width: f64 },
}

/// One retained drawing command. Paths are SVG path data in canvas space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DisplayItem {
    Fill {
        path: String,
        brush: Brush,
    },
    Stroke {
        path: String,
        brush: Brush,
        width: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dash: Option<f64>,
    },
    /// `slot` indexes the image table that travels with the list.
    Image { slot: usize, x: f64, y: f64, width: f64, height: f64, opacity: f64 },
}

/// Display-list backend built on kurbo paths.
pub struct VectorBackend {
    status: BackendStatus,
    spec: Option<SurfaceSpec>,
    items: Vec<DisplayItem>,
    images: Vec<ImageRef>,
}

impl Default for VectorBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorBackend {
    #[must_use]
    pub fn new() -> Self {
        Self { status: BackendStatus::Uninitialized, spec: None, items: Vec::new(), images: Vec::new() }
    }

    /// The retained list from the last `render_all`.
    #[must_use]
    pub fn display_list(&self) -> &[DisplayItem] {
        &self.items
    }
}

#[async_trait]
impl RenderBackend for VectorBackend {
    fn name(&self) -> &'static str {
        "vector"
    }

    fn status(&self) -> BackendStatus {
        self.status
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { retained: true, async_init: true, async_export: true, destructive_erase: true }
    }

    async fn initialize(&mut self, spec: SurfaceSpec) -> Result<(), BackendError> {
        if self.status.is_terminal() {
            return Err(BackendError::Terminal(self.status));
        }
        self.status = BackendStatus::Loading;
        tokio::task::yield_now().await;

        if let Err(e) = paint::device_size(spec.size, spec.density) {
            tracing::warn!(backend = "vector", error = %e, "initialization failed");
            self.status = BackendStatus::Error;
            return Err(e);
        }
        tracing::info!(backend = "vector", width = spec.size.width, height = spec.size.height, "backend ready");
        self.spec = Some(spec);
        self.status = BackendStatus::Ready;
        Ok(())
    }

    fn render_all(&mut self, frame: &Frame<'_>) -> Result<(), BackendError> {
        self.status.require_ready()?;
        let spec = self.spec.as_ref().ok_or(BackendError::NotReady(self.status))?;
        let mut list = ListBuilder::new(&spec.options);
        list.push_frame(frame);
        list.push_chrome(frame);
        tracing::trace!(items = list.items.len(), "display list rebuilt");
        self.items = list.items;
        self.images = list.images;
        Ok(())
    }

    async fn export_png(&self, frame: &Frame<'_>, density: f64) -> Result<Vec<u8>, BackendError> {
        self.status.require_ready()?;
        let spec = self.spec.as_ref().ok_or(BackendError::NotReady(self.status))?;
        super::warn_missing_font(frame, &spec.options);
        let mut list = ListBuilder::new(&spec.options);
        list.push_frame(frame);

        let json = serde_json::to_string(&list.items)?;
        let images = list.images;
        let (size, background) = (frame.size, spec.options.background);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || rasterize(&json, &images, size, density, background)).await?
            }
            Err(_) => rasterize(&json, &images, size, density, background),
        }
    }

    fn dispose(&mut self) {
        self.items.clear();
        self.images.clear();
        self.status = BackendStatus::Disposed;
        tracing::info!(backend = "vector", "disposed");
    }
}

// =============================================================================
// Phase one: elements to display items
// =============================================================================

struct ListBuilder<'o> {
    options: &'o RenderOptions,
    items: Vec<DisplayItem>,
    images: Vec<ImageRef>,
}

fn polyline(points: &[Point], close: bool) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to((first.x, first.y));
    for p in rest {
        path.line_to((p.x, p.y));
    }
    if close {
        path.close_path();
    }
    Some(path)
}

fn circle(center: Point, radius: f64) -> BezPath {
    kurbo::Circle::new((center.x, center.y), radius).to_path(TOLERANCE)
}

fn solid(color: Color, opacity: f64) -> Brush {
    Brush::Solid { color: color.with_opacity(opacity) }
}

impl<'o> ListBuilder<'o> {
    fn new(options: &'o RenderOptions) -> Self {
        Self { options, items: Vec::new(), images: Vec::new() }
    }

    fn fill(&mut self, path: &BezPath, brush: Brush) {
        self.items.push(DisplayItem::Fill { path: path.to_svg(), brush });
    }

    fn stroke(&mut self, path: &BezPath, brush: Brush, width: f64, dash: Option<f64>) {
        self.items.push(DisplayItem::Stroke { path: path.to_svg(), brush, width, dash });
    }

    fn outline(&mut self, path: &BezPath, style: &Style) {
        if let Some(stroke) = style.stroke {
            self.stroke(path, solid(stroke, style.opacity), style.stroke_width, None);
        }
    }

    fn fill_and_outline(&mut self, path: &BezPath, style: &Style) {
        if let Some(fill) = style.fill {
            self.fill(path, solid(fill, style.opacity));
        }
        self.outline(path, style);
    }

    fn image_slot(&mut self, image: &ImageRef) -> usize {
        match self.images.iter().position(|known| known == image) {
            Some(slot) => slot,
            None => {
                self.images.push(image.clone());
                self.images.len() - 1
            }
        }
    }

    fn push_frame(&mut self, frame: &Frame<'_>) {
        for el in &frame.elements {
            self.push_element(el);
        }
    }

    fn push_element(&mut self, el: &Element) {
        let style = &el.style;
        match &el.shape {
            Shape::Stroke { brush, points } => {
                let Some(path) = polyline(points, false) else { return };
                let brush = match brush {
                    BrushKind::Eraser => match self.options.erase {
                        EraseMode::PaintOver => solid(self.options.background, 1.0),
                        EraseMode::Destructive => Brush::Clear,
                    },
                    BrushKind::Pen | BrushKind::Highlighter => {
                        solid(style.stroke.unwrap_or(Color::BLACK), style.opacity)
                    }
                };
                self.stroke(&path, brush, style.stroke_width, None);
            }
            Shape::Rainbow { points, colors } => {
                for (i, seg) in points.windows(2).enumerate() {
                    let color = colors.get(i).copied().unwrap_or(RAINBOW[i % RAINBOW.len()]);
                    if let Some(path) = polyline(seg, false) {
                        self.stroke(&path, solid(color, style.opacity), style.stroke_width, None);
                    }
                }
            }
            Shape::SimpleLine { points } => {
                if let Some(path) = polyline(points, false) {
                    self.outline(&path, style);
                }
            }
            Shape::Arrow { from, to, head_length, head_width } => {
                if let Some(path) = polyline(&[*from, *to], false) {
                    self.outline(&path, style);
                }
                let head = geom::arrow_head(*from, *to, *head_length, *head_width);
                if let Some(path) = polyline(&head, true) {
                    self.fill(&path, solid(style.stroke.unwrap_or(Color::BLACK), style.opacity));
                }
            }
            Shape::Rect { origin, width, height } => {
                let b = hit::Bounds::from_origin(*origin, *width, *height);
                let path = kurbo::Rect::new(b.min.x, b.min.y, b.max.x, b.max.y).to_path(TOLERANCE);
                self.fill_and_outline(&path, style);
            }
            Shape::Ellipse { center, radius_x, radius_y } => {
                let path = kurbo::Ellipse::new((center.x, center.y), (radius_x.abs(), radius_y.abs()), 0.0)
                    .to_path(TOLERANCE);
                self.fill_and_outline(&path, style);
            }
            Shape::Polygon { center, sides, radius, rotation } => {
                if let Some(path) = polyline(&geom::regular_polygon(*center, *sides, *radius, *rotation), true) {
                    self.fill_and_outline(&path, style);
                }
            }
            Shape::Star { center, points, inner_radius, outer_radius } => {
                let pts = geom::star_points(*center, *points, *inner_radius, *outer_radius);
                if let Some(path) = polyline(&pts, true) {
                    self.fill_and_outline(&path, style);
                }
            }
            Shape::Heart { points } => {
                if let Some(path) = polyline(points, true) {
                    self.fill_and_outline(&path, style);
                }
            }
            Shape::Spray { dots, dot_radius } => {
                let mut path = BezPath::new();
                for dot in dots {
                    path.extend(circle(*dot, *dot_radius).elements().iter().copied());
                }
                if !path.is_empty() {
                    self.fill(&path, solid(style.fill.unwrap_or(Color::BLACK), style.opacity));
                }
            }
            Shape::Text { origin, text, font_size } => {
                let color = style.fill.unwrap_or(Color::BLACK);
                match self.text_path(*origin, text, *font_size) {
                    Some(path) => self.fill(&path, solid(color, style.opacity)),
                    None => tracing::trace!(chars = text.chars().count(), "no font configured; skipping text"),
                }
            }
            Shape::Image { origin, width, height, image } => {
                let slot = self.image_slot(image);
                self.items.push(DisplayItem::Image {
                    slot,
                    x: origin.x,
                    y: origin.y,
                    width: *width,
                    height: *height,
                    opacity: style.opacity,
                });
            }
            Shape::Pattern { center, size } => {
                let (petals, core) = geom::rosette(*center, *size);
                let petal_color = style.fill.unwrap_or(Color::BLACK);
                for petal in &petals {
                    self.fill(&circle(petal.center, petal.radius), solid(petal_color, style.opacity));
                }
                self.fill(&circle(core.center, core.radius), solid(PATTERN_CORE_COLOR, style.opacity));
            }
            Shape::Fill { width, height } => {
                let path = kurbo::Rect::new(0.0, 0.0, *width, *height).to_path(TOLERANCE);
                self.fill(&path, solid(style.fill.unwrap_or(self.options.background), style.opacity));
            }
            Shape::Gradient { width, height } => {
                let path = kurbo::Rect::new(0.0, 0.0, *width, *height).to_path(TOLERANCE);
                self.fill(&path, Brush::LinearGradient { width: *width });
            }
        }
    }

    /// Glyph outlines for `text` laid out from the top-left `origin`.
    fn text_path(&self, origin: Point, text: &str, font_size: f64) -> Option<BezPath> {
        let font = self.options.font.as_ref()?;
        let scaled = font.as_scaled(px(font_size));
        let (hs, vs) = (f64::from(scaled.h_scale_factor()), f64::from(scaled.v_scale_factor()));
        let baseline = origin.y + f64::from(scaled.ascent());

        let mut path = BezPath::new();
        let mut caret = origin.x;
        let mut prev = None;
        for ch in text.chars() {
            let gid = font.glyph_id(ch);
            if let Some(p) = prev {
                caret += f64::from(scaled.kern(p, gid));
            }
            if let Some(outline) = font.outline(gid) {
                let map = |p: ab_glyph::Point| kurbo::Point::new(caret + f64::from(p.x) * hs, baseline - f64::from(p.y) * vs);
                append_outline(&mut path, &outline.curves, map);
            }
            caret += f64::from(scaled.h_advance(gid));
            prev = Some(gid);
        }
        Some(path)
    }

    // --- Chrome ---

    fn push_chrome(&mut self, frame: &Frame<'_>) {
        self.push_guides(frame.size, frame.guides);
        let Some(bounds) = frame.selected().and_then(hit::bounds) else { return };

        let b = bounds.inflate(2.0);
        if let Some(path) = polyline(&b.corners(), true) {
            self.stroke(&path, solid(SELECTION_COLOR, 1.0), 1.0, None);
        }
        for corner in b.corners() {
            self.fill(&circle(corner, HANDLE_RADIUS_PX), solid(SELECTION_COLOR, 1.0));
        }
    }

    fn push_guides(&mut self, size: CanvasSize, mode: Symmetry) {
        let c = size.center();
        if matches!(mode, Symmetry::Horizontal | Symmetry::Quadrant) {
            if let Some(path) = polyline(&[Point::new(c.x, 0.0), Point::new(c.x, size.height)], false) {
                self.stroke(&path, solid(GUIDE_COLOR, 1.0), 1.0, Some(DASH_PX));
            }
        }
        if matches!(mode, Symmetry::Vertical | Symmetry::Quadrant) {
            if let Some(path) = polyline(&[Point::new(0.0, c.y), Point::new(size.width, c.y)], false) {
                self.stroke(&path, solid(GUIDE_COLOR, 1.0), 1.0, Some(DASH_PX));
            }
        }
    }
}

/// Append glyph curves, starting a new closed contour whenever a curve does
/// not continue from the previous end point.
fn append_outline(path: &mut BezPath, curves: &[OutlineCurve], map: impl Fn(ab_glyph::Point) -> kurbo::Point) {
    let mut last: Option<ab_glyph::Point> = None;
    for curve in curves {
        let (start, end) = match curve {
            OutlineCurve::Line(a, b) | OutlineCurve::Quad(a, _, b) | OutlineCurve::Cubic(a, _, _, b) => (*a, *b),
        };
        if last != Some(start) {
            if last.is_some() {
                path.close_path();
            }
            path.move_to(map(start));
        }
        match curve {
            OutlineCurve::Line(_, b) => path.line_to(map(*b)),
            OutlineCurve::Quad(_, c, b) => path.quad_to(map(*c), map(*b)),
            OutlineCurve::Cubic(_, c1, c2, b) => path.curve_to(map(*c1), map(*c2), map(*b)),
        }
        last = Some(end);
    }
    if last.is_some() {
        path.close_path();
    }
}

// =============================================================================
// Phase two: serialized list to pixels
// =============================================================================

fn sk_path(svg: &str) -> Option<tiny_skia::Path> {
    let bez = match BezPath::from_svg(svg) {
        Ok(bez) => bez,
        Err(e) => {
            tracing::warn!(error = %e, "skipping unparsable display path");
            return None;
        }
    };
    let mut pb = PathBuilder::new();
    for el in bez.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(px(p.x), px(p.y)),
            PathEl::LineTo(p) => pb.line_to(px(p.x), px(p.y)),
            PathEl::QuadTo(c, p) => pb.quad_to(px(c.x), px(c.y), px(p.x), px(p.y)),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(px(c1.x), px(c1.y), px(c2.x), px(c2.y), px(p.x), px(p.y)),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

fn sk_paint(brush: &Brush) -> Option<tiny_skia::Paint<'static>> {
    match brush {
        Brush::Solid { color } => Some(paint::solid(*color, 1.0)),
        Brush::Clear => Some(paint::eraser(EraseMode::Destructive, Color::TRANSPARENT)),
        Brush::LinearGradient { width } => {
            let shader = paint::rainbow_shader(*width)?;
            let mut paint = tiny_skia::Paint { shader, ..tiny_skia::Paint::default() };
            paint.anti_alias = true;
            Some(paint)
        }
    }
}

fn draw_item(pixmap: &mut Pixmap, item: &DisplayItem, images: &[ImageRef], transform: Transform) {
    match item {
        DisplayItem::Fill { path, brush } => {
            if let (Some(path), Some(paint)) = (sk_path(path), sk_paint(brush)) {
                pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
        }
        DisplayItem::Stroke { path, brush, width, dash } => {
            let mut stroke = paint::round_stroke(*width);
            if let Some(d) = dash {
                stroke.dash = StrokeDash::new(vec![px(*d), px(*d)], 0.0);
            }
            if let (Some(path), Some(paint)) = (sk_path(path), sk_paint(brush)) {
                pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
        }
        DisplayItem::Image { slot, x, y, width, height, opacity } => match images.get(*slot) {
            Some(image) => {
                paint::draw_image(pixmap, image.raster(), Point::new(*x, *y), (*width, *height), *opacity, transform);
            }
            None => tracing::warn!(slot, "display list references a missing image"),
        },
    }
}

/// Rasterize a serialized display list and encode it as PNG.
fn rasterize(
    json: &str,
    images: &[ImageRef],
    size: CanvasSize,
    density: f64,
    background: Color,
) -> Result<Vec<u8>, BackendError> {
    let items: Vec<DisplayItem> = serde_json::from_str(json)?;
    let mut pixmap = paint::new_pixmap(size, density, background)?;
    let transform = Transform::from_scale(px(density), px(density));
    for item in &items {
        draw_item(&mut pixmap, item, images, transform);
    }
    paint::encode_png(&pixmap)
}
