//! Rendering: the backend contract and its two implementations.
//!
//! A backend receives a read-only [`Frame`] (the scene in z-order plus chrome
//! state) and produces pixels. It never mutates the scene. Two backends ship:
//!
//! | Backend | Mode | Initialization | Export |
//! |---------|------|----------------|--------|
//! | [`raster::RasterBackend`] | immediate: elements straight to tiny-skia calls | synchronous | inline |
//! | [`vector::VectorBackend`] | retained: elements to a serialized path display list | asynchronous | blocking worker |
//!
//! Selection handles and symmetry guides are chrome. They are drawn by
//! [`RenderBackend::render_all`] only and never appear in an export.
//!
//! Backend lifecycle is `Uninitialized -> Loading -> Ready -> (Error | Disposed)`.
//! `Error` and `Disposed` are terminal for that instance; hosts recover by
//! swapping in a fresh backend.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

pub mod paint;
pub mod raster;
pub mod vector;

use std::borrow::Cow;
use std::fmt;

use ab_glyph::FontArc;
use async_trait::async_trait;

use crate::color::Color;
use crate::consts::BACKGROUND;
use crate::doc::{Element, ElementId, Shape};
use crate::geom::{CanvasSize, Symmetry};

/// Backend lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStatus {
    Uninitialized,
    Loading,
    Ready,
    /// Initialization failed. Terminal.
    Error,
    /// Released by the host. Terminal.
    Disposed,
}

impl BackendStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Error | Self::Disposed)
    }

    /// Map a non-ready status to the error a draw call should report.
    fn require_ready(self) -> Result<(), BackendError> {
        match self {
            Self::Ready => Ok(()),
            Self::Error | Self::Disposed => Err(BackendError::Terminal(self)),
            Self::Uninitialized | Self::Loading => Err(BackendError::NotReady(self)),
        }
    }
}

/// Errors raised by render backends.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend not ready: {0:?}")]
    NotReady(BackendStatus),
    #[error("backend unusable: {0:?}")]
    Terminal(BackendStatus),
    #[error("unsupported surface {width}x{height} at density {density}")]
    Surface { width: f64, height: f64, density: f64 },
    #[error("missing capability: {0}")]
    Capability(&'static str),
    #[error("png encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("display list serialization failed: {0}")]
    DisplayList(#[from] serde_json::Error),
    #[error("export worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// What a backend can do, for hosts choosing between them.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Keeps a native scene representation between frames.
    pub retained: bool,
    /// `initialize` suspends before reaching `Ready`.
    pub async_init: bool,
    /// `export_png` hands rasterization to a blocking worker.
    pub async_export: bool,
    /// Supports [`EraseMode::Destructive`].
    pub destructive_erase: bool,
}

/// How eraser strokes are composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EraseMode {
    /// Paint the background color over existing content.
    #[default]
    PaintOver,
    /// Clear pixels to transparent.
    Destructive,
}

/// Per-surface rendering options.
#[derive(Clone)]
pub struct RenderOptions {
    pub background: Color,
    pub erase: EraseMode,
    /// Font for text and stickers. Text is skipped without one.
    pub font: Option<FontArc>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { background: BACKGROUND, erase: EraseMode::default(), font: None }
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("background", &self.background)
            .field("erase", &self.erase)
            .field("font", &self.font.as_ref().map(|_| "<font>"))
            .finish()
    }
}

/// Surface a backend is initialized against.
#[derive(Debug, Clone)]
pub struct SurfaceSpec {
    pub size: CanvasSize,
    /// Device pixels per canvas pixel for on-screen rendering.
    pub density: f64,
    pub options: RenderOptions,
}

impl SurfaceSpec {
    #[must_use]
    pub fn new(size: CanvasSize) -> Self {
        Self { size, density: 1.0, options: RenderOptions::default() }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Read-only view of what to draw.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub size: CanvasSize,
    /// Elements in z-order, including any in-progress gesture.
    pub elements: Vec<Cow<'a, Element>>,
    pub selection: Option<ElementId>,
    /// Symmetry mode whose center lines are shown as guides.
    pub guides: Symmetry,
}

impl<'a> Frame<'a> {
    #[must_use]
    pub fn new(size: CanvasSize, elements: Vec<Cow<'a, Element>>) -> Self {
        Self { size, elements, selection: None, guides: Symmetry::None }
    }

    /// The selected element, if it is part of this frame.
    #[must_use]
    pub fn selected(&self) -> Option<&Element> {
        let id = self.selection?;
        self.elements.iter().map(|el| &**el).find(|el| el.id == id)
    }

    /// Text and sticker elements that `options` leaves without a font.
    #[must_use]
    pub fn text_without_font(&self, options: &RenderOptions) -> usize {
        if options.font.is_some() {
            return 0;
        }
        self.elements.iter().filter(|el| matches!(el.shape, Shape::Text { .. })).count()
    }
}

/// Warn once per export when text or stickers will be missing from it.
pub(crate) fn warn_missing_font(frame: &Frame<'_>, options: &RenderOptions) {
    let dropped = frame.text_without_font(options);
    if dropped > 0 {
        tracing::warn!(dropped, "no font configured; text and stickers are left out of the export");
    }
}

/// Contract every rendering engine satisfies.
///
/// All draw entry points are read-only with respect to the scene and fail
/// with [`BackendError::NotReady`] or [`BackendError::Terminal`] unless the
/// backend is `Ready`.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn status(&self) -> BackendStatus;

    fn capabilities(&self) -> Capabilities;

    /// Bring the backend to `Ready`, or to the terminal `Error` state.
    async fn initialize(&mut self, spec: SurfaceSpec) -> Result<(), BackendError>;

    /// Redraw the surface from scratch, chrome included.
    fn render_all(&mut self, frame: &Frame<'_>) -> Result<(), BackendError>;

    /// Encode the frame as PNG at `density` device pixels per canvas pixel.
    /// Chrome is never included.
    async fn export_png(&self, frame: &Frame<'_>, density: f64) -> Result<Vec<u8>, BackendError>;

    /// Release native resources. Terminal.
    fn dispose(&mut self);
}

/// Registry of the shipped backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Raster,
    Vector,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [Self::Raster, Self::Vector];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Vector => "vector",
        }
    }

    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.name()).collect()
    }

    /// A fresh, uninitialized backend of this kind.
    #[must_use]
    pub fn create(self) -> Box<dyn RenderBackend> {
        match self {
            Self::Raster => Box::new(raster::RasterBackend::new()),
            Self::Vector => Box::new(vector::VectorBackend::new()),
        }
    }
}
