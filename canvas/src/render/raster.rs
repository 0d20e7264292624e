//! Immediate-mode backend: every element becomes tiny-skia draw calls on an
//! owned pixmap.
//!
//! Nothing is retained between frames. `render_all` clears the surface and
//! replays the whole frame; `export_png` does the same on a fresh pixmap at
//! the requested density, without chrome.

use ab_glyph::{Font as _, ScaleFont as _};
use async_trait::async_trait;
use tiny_skia::{FillRule, PathBuilder, PremultipliedColorU8, Pixmap, Rect, Transform};

use super::paint::{self, px};
use super::{BackendError, BackendStatus, Capabilities, Frame, RenderBackend, RenderOptions, SurfaceSpec};
use crate::color::Color;
use crate::consts::{DASH_PX, GUIDE_COLOR, HANDLE_RADIUS_PX, PATTERN_CORE_COLOR, RAINBOW, SELECTION_COLOR};
use crate::doc::{BrushKind, Element, Shape, Style};
use crate::geom::{self, CanvasSize, Point, Symmetry};
use crate::hit;

/// tiny-skia backend that draws straight to a pixmap.
pub struct RasterBackend {
    status: BackendStatus,
    spec: Option<SurfaceSpec>,
    surface: Option<Pixmap>,
}

impl Default for RasterBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterBackend {
    #[must_use]
    pub fn new() -> Self {
        Self { status: BackendStatus::Uninitialized, spec: None, surface: None }
    }

    /// The on-screen surface as of the last `render_all`.
    #[must_use]
    pub fn surface(&self) -> Option<&Pixmap> {
        self.surface.as_ref()
    }
}

#[async_trait]
impl RenderBackend for RasterBackend {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn status(&self) -> BackendStatus {
        self.status
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { retained: false, async_init: false, async_export: false, destructive_erase: true }
    }

    async fn initialize(&mut self, spec: SurfaceSpec) -> Result<(), BackendError> {
        if self.status.is_terminal() {
            return Err(BackendError::Terminal(self.status));
        }
        match paint::new_pixmap(spec.size, spec.density, spec.options.background) {
            Ok(pixmap) => {
                tracing::info!(backend = "raster", width = pixmap.width(), height = pixmap.height(), "backend ready");
                self.surface = Some(pixmap);
                self.spec = Some(spec);
                self.status = BackendStatus::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(backend = "raster", error = %e, "initialization failed");
                self.status = BackendStatus::Error;
                Err(e)
            }
        }
    }

    fn render_all(&mut self, frame: &Frame<'_>) -> Result<(), BackendError> {
        self.status.require_ready()?;
        let (Some(spec), Some(pixmap)) = (&self.spec, &mut self.surface) else {
            return Err(BackendError::NotReady(self.status));
        };
        pixmap.fill(paint::sk_color(spec.options.background, 1.0));
        let painter = Painter::new(&spec.options, spec.density);
        painter.draw_scene(pixmap, frame);
        painter.draw_chrome(pixmap, frame);
        Ok(())
    }

    async fn export_png(&self, frame: &Frame<'_>, density: f64) -> Result<Vec<u8>, BackendError> {
        self.status.require_ready()?;
        let spec = self.spec.as_ref().ok_or(BackendError::NotReady(self.status))?;
        let mut pixmap = paint::new_pixmap(frame.size, density, spec.options.background)?;
        super::warn_missing_font(frame, &spec.options);
        Painter::new(&spec.options, density).draw_scene(&mut pixmap, frame);
        paint::encode_png(&pixmap)
    }

    fn dispose(&mut self) {
        self.surface = None;
        self.status = BackendStatus::Disposed;
        tracing::info!(backend = "raster", "disposed");
    }
}

// =============================================================================
// Painter
// =============================================================================

/// One pass over a frame at a fixed density.
struct Painter<'o> {
    options: &'o RenderOptions,
    density: f64,
    transform: Transform,
}

impl<'o> Painter<'o> {
    fn new(options: &'o RenderOptions, density: f64) -> Self {
        Self { options, density, transform: Transform::from_scale(px(density), px(density)) }
    }

    fn draw_scene(&self, pixmap: &mut Pixmap, frame: &Frame<'_>) {
        for el in &frame.elements {
            self.draw_element(pixmap, el);
        }
    }

    fn draw_element(&self, pixmap: &mut Pixmap, el: &Element) {
        let style = &el.style;
        match &el.shape {
            Shape::Stroke { brush, points } => {
                let Some(path) = paint::polyline(points, false) else { return };
                let paint = match brush {
                    BrushKind::Eraser => paint::eraser(self.options.erase, self.options.background),
                    BrushKind::Pen | BrushKind::Highlighter => {
                        paint::solid(style.stroke.unwrap_or(Color::BLACK), style.opacity)
                    }
                };
                pixmap.stroke_path(&path, &paint, &paint::round_stroke(style.stroke_width), self.transform, None);
            }
            Shape::Rainbow { points, colors } => {
                let stroke = paint::round_stroke(style.stroke_width);
                for (i, seg) in points.windows(2).enumerate() {
                    let color = colors.get(i).copied().unwrap_or(RAINBOW[i % RAINBOW.len()]);
                    if let Some(path) = paint::polyline(seg, false) {
                        pixmap.stroke_path(&path, &paint::solid(color, style.opacity), &stroke, self.transform, None);
                    }
                }
            }
            Shape::SimpleLine { points } => {
                if let Some(path) = paint::polyline(points, false) {
                    self.outline(pixmap, &path, style);
                }
            }
            Shape::Arrow { from, to, head_length, head_width } => {
                if let Some(path) = paint::polyline(&[*from, *to], false) {
                    self.outline(pixmap, &path, style);
                }
                let head = geom::arrow_head(*from, *to, *head_length, *head_width);
                if let Some(path) = paint::polyline(&head, true) {
                    let paint = paint::solid(style.stroke.unwrap_or(Color::BLACK), style.opacity);
                    pixmap.fill_path(&path, &paint, FillRule::Winding, self.transform, None);
                }
            }
            Shape::Rect { origin, width, height } => {
                let b = hit::Bounds::from_origin(*origin, *width, *height);
                if let Some(rect) = Rect::from_ltrb(px(b.min.x), px(b.min.y), px(b.max.x), px(b.max.y)) {
                    self.fill_and_outline(pixmap, &PathBuilder::from_rect(rect), style);
                }
            }
            Shape::Ellipse { center, radius_x, radius_y } => {
                let b = hit::Bounds::around(*center, *radius_x, *radius_y);
                let oval = Rect::from_ltrb(px(b.min.x), px(b.min.y), px(b.max.x), px(b.max.y))
                    .and_then(PathBuilder::from_oval);
                if let Some(path) = oval {
                    self.fill_and_outline(pixmap, &path, style);
                }
            }
            Shape::Polygon { center, sides, radius, rotation } => {
                let pts = geom::regular_polygon(*center, *sides, *radius, *rotation);
                if let Some(path) = paint::polyline(&pts, true) {
                    self.fill_and_outline(pixmap, &path, style);
                }
            }
            Shape::Star { center, points, inner_radius, outer_radius } => {
                let pts = geom::star_points(*center, *points, *inner_radius, *outer_radius);
                if let Some(path) = paint::polyline(&pts, true) {
                    self.fill_and_outline(pixmap, &path, style);
                }
            }
            Shape::Heart { points } => {
                if let Some(path) = paint::polyline(points, true) {
                    self.fill_and_outline(pixmap, &path, style);
                }
            }
            Shape::Spray { dots, dot_radius } => {
                let paint = paint::solid(style.fill.unwrap_or(Color::BLACK), style.opacity);
                for dot in dots {
                    if let Some(path) = PathBuilder::from_circle(px(dot.x), px(dot.y), px(*dot_radius)) {
                        pixmap.fill_path(&path, &paint, FillRule::Winding, self.transform, None);
                    }
                }
            }
            Shape::Text { origin, text, font_size } => {
                let color = style.fill.unwrap_or(Color::BLACK).with_opacity(style.opacity);
                self.draw_text(pixmap, *origin, text, *font_size, color);
            }
            Shape::Image { origin, width, height, image } => {
                paint::draw_image(pixmap, image.raster(), *origin, (*width, *height), style.opacity, self.transform);
            }
            Shape::Pattern { center, size } => {
                let (petals, core) = geom::rosette(*center, *size);
                let petal_paint = paint::solid(style.fill.unwrap_or(Color::BLACK), style.opacity);
                let core_paint = paint::solid(PATTERN_CORE_COLOR, style.opacity);
                for (disc, paint) in petals.iter().map(|d| (d, &petal_paint)).chain([(&core, &core_paint)]) {
                    if let Some(path) = PathBuilder::from_circle(px(disc.center.x), px(disc.center.y), px(disc.radius)) {
                        pixmap.fill_path(&path, paint, FillRule::Winding, self.transform, None);
                    }
                }
            }
            Shape::Fill { width, height } => {
                if let Some(rect) = Rect::from_xywh(0.0, 0.0, px(*width), px(*height)) {
                    let paint = paint::solid(style.fill.unwrap_or(self.options.background), style.opacity);
                    pixmap.fill_rect(rect, &paint, self.transform, None);
                }
            }
            Shape::Gradient { width, height } => {
                let rect = Rect::from_xywh(0.0, 0.0, px(*width), px(*height));
                if let (Some(rect), Some(shader)) = (rect, paint::rainbow_shader(*width)) {
                    let mut paint = tiny_skia::Paint { shader, ..tiny_skia::Paint::default() };
                    paint.anti_alias = true;
                    pixmap.fill_rect(rect, &paint, self.transform, None);
                }
            }
        }
    }

    fn outline(&self, pixmap: &mut Pixmap, path: &tiny_skia::Path, style: &Style) {
        if let Some(stroke) = style.stroke {
            let paint = paint::solid(stroke, style.opacity);
            pixmap.stroke_path(path, &paint, &paint::round_stroke(style.stroke_width), self.transform, None);
        }
    }

    fn fill_and_outline(&self, pixmap: &mut Pixmap, path: &tiny_skia::Path, style: &Style) {
        if let Some(fill) = style.fill {
            pixmap.fill_path(path, &paint::solid(fill, style.opacity), FillRule::Winding, self.transform, None);
        }
        self.outline(pixmap, path, style);
    }

    /// Rasterize glyph coverage directly into the surface.
    fn draw_text(&self, pixmap: &mut Pixmap, origin: Point, text: &str, font_size: f64, color: Color) {
        let Some(font) = &self.options.font else {
            tracing::trace!(chars = text.chars().count(), "no font configured; skipping text");
            return;
        };
        let scale = px(font_size * self.density);
        let scaled = font.as_scaled(scale);
        let baseline = px(origin.y * self.density) + scaled.ascent();
        let mut caret = px(origin.x * self.density);
        let mut prev = None;
        for ch in text.chars() {
            let gid = font.glyph_id(ch);
            if let Some(p) = prev {
                caret += scaled.kern(p, gid);
            }
            let glyph = gid.with_scale_and_position(scale, ab_glyph::point(caret, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
                    let (x, y) = ((bounds.min.x + gx as f32) as i64, (bounds.min.y + gy as f32) as i64);
                    blend_pixel(pixmap, x, y, color, coverage);
                });
            }
            caret += scaled.h_advance(gid);
            prev = Some(gid);
        }
    }

    // --- Chrome ---

    fn draw_chrome(&self, pixmap: &mut Pixmap, frame: &Frame<'_>) {
        self.draw_guides(pixmap, frame.size, frame.guides);
        let Some(bounds) = frame.selected().and_then(hit::bounds) else { return };

        let b = bounds.inflate(2.0);
        let paint = paint::solid(SELECTION_COLOR, 1.0);
        if let Some(path) = paint::polyline(&b.corners(), true) {
            pixmap.stroke_path(&path, &paint, &paint::dashed(1.0, DASH_PX), self.transform, None);
        }
        for corner in b.corners() {
            let h = HANDLE_RADIUS_PX;
            if let Some(rect) = Rect::from_xywh(px(corner.x - h), px(corner.y - h), px(h * 2.0), px(h * 2.0)) {
                pixmap.fill_rect(rect, &paint, self.transform, None);
            }
        }
    }

    fn draw_guides(&self, pixmap: &mut Pixmap, size: CanvasSize, mode: Symmetry) {
        let c = size.center();
        let mut lines = Vec::new();
        if matches!(mode, Symmetry::Horizontal | Symmetry::Quadrant) {
            lines.push([Point::new(c.x, 0.0), Point::new(c.x, size.height)]);
        }
        if matches!(mode, Symmetry::Vertical | Symmetry::Quadrant) {
            lines.push([Point::new(0.0, c.y), Point::new(size.width, c.y)]);
        }
        let paint = paint::solid(GUIDE_COLOR, 1.0);
        for line in lines {
            if let Some(path) = paint::polyline(&line, false) {
                pixmap.stroke_path(&path, &paint, &paint::dashed(1.0, DASH_PX), self.transform, None);
            }
        }
    }
}

/// Source-over one pixel of `color` at `coverage` onto a premultiplied surface.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_possible_wrap)]
fn blend_pixel(pixmap: &mut Pixmap, x: i64, y: i64, color: Color, coverage: f32) {
    let (w, h) = (i64::from(pixmap.width()), i64::from(pixmap.height()));
    if x < 0 || y < 0 || x >= w || y >= h {
        return;
    }
    let idx = (y * w + x) as usize;
    let Some(dst) = pixmap.pixels_mut().get_mut(idx) else { return };

    let sa = f32::from(color.a) / 255.0 * coverage.clamp(0.0, 1.0);
    let inv = 1.0 - sa;
    let to_u8 = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    let a = to_u8(255.0 * sa + f32::from(dst.alpha()) * inv);
    let mix = |s: u8, d: u8| to_u8(f32::from(s) * sa + f32::from(d) * inv).min(a);
    let r = mix(color.r, dst.red());
    let g = mix(color.g, dst.green());
    let b = mix(color.b, dst.blue());
    if let Some(out) = PremultipliedColorU8::from_rgba(r, g, b, a) {
        *dst = out;
    }
}
