//! tiny-skia helpers shared by both backends: paints, strokes, surfaces,
//! image blits and PNG encoding.

use std::io::Cursor;

use tiny_skia::{
    BlendMode, FilterQuality, GradientStop, IntSize, LineCap, LineJoin, LinearGradient, Paint, Path, PathBuilder,
    Pixmap, PixmapPaint, Shader, SpreadMode, Stroke, StrokeDash, Transform,
};

use super::{BackendError, EraseMode};
use crate::color::Color;
use crate::consts::{GRADIENT_STOPS, MAX_SURFACE_DIM, RAINBOW};
use crate::doc::RasterImage;
use crate::geom::{CanvasSize, Point};

/// Narrow a canvas coordinate for tiny-skia.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn px(v: f64) -> f32 {
    v as f32
}

#[must_use]
pub fn sk_color(c: Color, opacity: f64) -> tiny_skia::Color {
    let c = c.with_opacity(opacity);
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Anti-aliased solid paint.
#[must_use]
pub fn solid(c: Color, opacity: f64) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(sk_color(c, opacity));
    paint.anti_alias = true;
    paint
}

/// Paint for an eraser stroke under the given mode.
#[must_use]
pub fn eraser(mode: EraseMode, background: Color) -> Paint<'static> {
    let mut paint = solid(background, 1.0);
    if mode == EraseMode::Destructive {
        paint.blend_mode = BlendMode::Clear;
    }
    paint
}

/// Round caps and joins.
#[must_use]
pub fn round_stroke(width: f64) -> Stroke {
    Stroke { width: px(width), line_cap: LineCap::Round, line_join: LineJoin::Round, ..Stroke::default() }
}

/// Thin dashed stroke for chrome.
#[must_use]
pub fn dashed(width: f64, dash: f64) -> Stroke {
    Stroke { width: px(width), dash: StrokeDash::new(vec![px(dash), px(dash)], 0.0), ..Stroke::default() }
}

/// Horizontal rainbow gradient spanning `width`.
#[must_use]
pub fn rainbow_shader(width: f64) -> Option<Shader<'static>> {
    let stops = RAINBOW
        .iter()
        .zip(GRADIENT_STOPS)
        .map(|(c, pos)| GradientStop::new(px(pos), sk_color(*c, 1.0)))
        .collect();
    LinearGradient::new(
        tiny_skia::Point::from_xy(0.0, 0.0),
        tiny_skia::Point::from_xy(px(width), 0.0),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    )
}

/// Device pixel dimensions for a canvas at `density`.
///
/// # Errors
///
/// [`BackendError::Surface`] when either edge is empty, non-finite or larger
/// than `MAX_SURFACE_DIM`.
pub fn device_size(size: CanvasSize, density: f64) -> Result<(u32, u32), BackendError> {
    let w = (size.width * density).ceil();
    let h = (size.height * density).ceil();
    let valid = |v: f64| v.is_finite() && (1.0..=MAX_SURFACE_DIM).contains(&v);
    if !valid(w) || !valid(h) {
        return Err(BackendError::Surface { width: size.width, height: size.height, density });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let dims = (w as u32, h as u32);
    Ok(dims)
}

/// A surface filled with `background`.
///
/// # Errors
///
/// See [`device_size`].
pub fn new_pixmap(size: CanvasSize, density: f64, background: Color) -> Result<Pixmap, BackendError> {
    let (w, h) = device_size(size, density)?;
    let mut pixmap =
        Pixmap::new(w, h).ok_or(BackendError::Surface { width: size.width, height: size.height, density })?;
    pixmap.fill(sk_color(background, 1.0));
    Ok(pixmap)
}

/// Open or closed polyline. `None` for fewer than two points.
#[must_use]
pub fn polyline(points: &[Point], close: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(px(first.x), px(first.y));
    for p in rest {
        pb.line_to(px(p.x), px(p.y));
    }
    if close {
        pb.close();
    }
    pb.finish()
}

/// Premultiplied copy of a decoded image. `None` if the buffer does not match
/// its dimensions.
#[must_use]
pub fn image_pixmap(raster: &RasterImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(raster.width, raster.height)?;
    let mut data = Vec::with_capacity(raster.rgba.len());
    for px in raster.rgba.chunks_exact(4) {
        let a = u16::from(px[3]);
        #[allow(clippy::cast_possible_truncation)]
        let mul = |c: u8| ((u16::from(c) * a + 127) / 255) as u8;
        data.extend_from_slice(&[mul(px[0]), mul(px[1]), mul(px[2]), px[3]]);
    }
    Pixmap::from_vec(data, size)
}

/// Blit `raster` scaled into the `width` x `height` box at `origin`.
pub fn draw_image(
    pixmap: &mut Pixmap,
    raster: &RasterImage,
    origin: Point,
    (width, height): (f64, f64),
    opacity: f64,
    base: Transform,
) {
    let Some(src) = image_pixmap(raster) else {
        tracing::warn!(width = raster.width, height = raster.height, "skipping malformed image");
        return;
    };
    let sx = width / f64::from(raster.width);
    let sy = height / f64::from(raster.height);
    let paint = PixmapPaint { opacity: px(opacity), quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
    let transform = base.pre_translate(px(origin.x), px(origin.y)).pre_scale(px(sx), px(sy));
    pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
}

/// Encode a surface as PNG (straight alpha).
///
/// # Errors
///
/// [`BackendError::Encode`] if the encoder fails.
pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, BackendError> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for p in pixmap.pixels() {
        let c = p.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or(BackendError::Capability("rgba buffer of surface size"))?;
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)?;
    Ok(out)
}
