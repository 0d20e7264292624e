//! Shared numeric constants and fixed palettes for the canvas crate.

use crate::color::Color;

// ── Surface ─────────────────────────────────────────────────────

/// Canvas width used when the host does not report one.
pub const DEFAULT_CANVAS_WIDTH: f64 = 600.0;

/// Canvas height used when the host does not report one.
pub const DEFAULT_CANVAS_HEIGHT: f64 = 500.0;

/// Surface background. Also the paint color of eraser strokes.
pub const BACKGROUND: Color = Color::WHITE;

/// Pixel-density multiplier for exports when the caller has no preference.
pub const DEFAULT_EXPORT_DENSITY: f64 = 2.0;

/// Largest surface edge, in device pixels, a backend will allocate.
pub const MAX_SURFACE_DIM: f64 = 16_384.0;

// ── Brushes ─────────────────────────────────────────────────────

/// UI bounds for the brush size.
pub const MIN_BRUSH_SIZE: u32 = 1;
pub const MAX_BRUSH_SIZE: u32 = 50;

/// Eraser strokes are this many times wider than the brush size.
pub const ERASER_WIDTH_FACTOR: f64 = 2.0;

/// Opacity of highlighter strokes.
pub const HIGHLIGHTER_OPACITY: f64 = 0.4;

/// Rainbow brush palette; also the gradient-fill stops, left to right.
pub const RAINBOW: [Color; 7] = [
    Color::rgb(0xFF, 0x6B, 0x6B),
    Color::rgb(0xFF, 0xA9, 0x4D),
    Color::rgb(0xFF, 0xE0, 0x66),
    Color::rgb(0x69, 0xDB, 0x7C),
    Color::rgb(0x4D, 0xAB, 0xF7),
    Color::rgb(0xDA, 0x77, 0xF2),
    Color::rgb(0xF7, 0x83, 0xAC),
];

/// Gradient-fill stop offsets matching [`RAINBOW`].
pub const GRADIENT_STOPS: [f64; 7] = [0.0, 0.17, 0.33, 0.5, 0.67, 0.83, 1.0];

// ── Spray ───────────────────────────────────────────────────────

/// Spray radius as a multiple of brush size.
pub const SPRAY_RADIUS_FACTOR: f64 = 2.0;

/// Dots sampled when the spray gesture starts.
pub const SPRAY_INITIAL_DENSITY: usize = 20;

/// Dots sampled on every pointer move.
pub const SPRAY_MOVE_DENSITY: usize = 10;

/// Radius of a single spray dot.
pub const SPRAY_DOT_RADIUS: f64 = 2.0;

// ── Pattern brush ───────────────────────────────────────────────

/// A new stamp is emitted once the pointer is farther than `size * factor`
/// from the previous one.
pub const PATTERN_SPACING_FACTOR: f64 = 3.0;

pub const PATTERN_PETALS: usize = 5;
pub const PATTERN_PETAL_RATIO: f64 = 0.6;
pub const PATTERN_CORE_RATIO: f64 = 0.4;
pub const PATTERN_CORE_COLOR: Color = Color::rgb(0xFF, 0xE0, 0x66);

// ── Shapes ──────────────────────────────────────────────────────

/// Angular steps for one revolution of the heart curve.
pub const HEART_SAMPLES: usize = 63;

/// Points on the star drawn by the star tool.
pub const STAR_POINTS: u32 = 5;

/// Inner-to-outer radius ratio for the star tool.
pub const STAR_INNER_RATIO: f64 = 0.4;

/// Arrowhead length and width as a multiple of brush size.
pub const ARROW_POINTER_FACTOR: f64 = 2.0;

/// Stamp outer radius as a multiple of brush size.
pub const STAMP_RADIUS_FACTOR: f64 = 2.0;

pub const STAMP_STROKE_WIDTH: f64 = 2.0;

// ── Text and stickers ───────────────────────────────────────────

pub const TEXT_FONT_FACTOR: f64 = 2.0;
pub const STICKER_FONT_FACTOR: f64 = 4.0;

/// Stickers are placed up and left of the pointer by this much.
pub const STICKER_OFFSET: f64 = 20.0;

/// Rough advance width per character, as a fraction of font size, used for
/// hit-testing text without a font.
pub const TEXT_ADVANCE_RATIO: f64 = 0.6;

// ── Templates and imports ───────────────────────────────────────

pub const TEMPLATE_STROKE: Color = Color::rgb(0x88, 0x88, 0x88);
pub const TEMPLATE_STROKE_WIDTH: f64 = 2.0;

/// Imported images land at `(IMPORT_OFFSET, IMPORT_OFFSET)`.
pub const IMPORT_OFFSET: f64 = 50.0;

/// Imported images are capped at the canvas size minus this margin.
pub const IMPORT_MARGIN: f64 = 100.0;

// ── Chrome ──────────────────────────────────────────────────────

/// Selection outline color.
pub const SELECTION_COLOR: Color = Color::rgb(0x1E, 0x90, 0xFF);

/// Symmetry guide color.
pub const GUIDE_COLOR: Color = Color::rgb(0xDD, 0xDD, 0xDD);

/// Dash length for selection and guide lines, in pixels.
pub const DASH_PX: f64 = 4.0;

/// Half-size of a selection handle, in pixels.
pub const HANDLE_RADIUS_PX: f64 = 4.0;
