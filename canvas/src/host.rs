//! Host API facade.
//!
//! [`Sketchpad`] is the only surface outside code talks to. It owns the tool
//! engine, the active render backend and the import queue, and it never
//! returns an error: failures are logged and observable only as state that did
//! or did not change. Every mutating call redraws synchronously before it
//! returns, unless the backend is not `Ready` yet, in which case the redraw is
//! deferred until [`Sketchpad::start`] succeeds.

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use std::mem;

use base64::Engine as _;
use base64::engine::general_purpose;

use crate::doc::{ImageRef, RasterImage};
use crate::engine::{Action, EngineCore};
use crate::geom::{Point, Symmetry};
use crate::import::ImportQueue;
use crate::input::ToolConfig;
use crate::render::{BackendStatus, Frame, RenderBackend, SurfaceSpec};
use crate::templates::Template;

pub struct Sketchpad {
    core: EngineCore,
    backend: Box<dyn RenderBackend>,
    spec: SurfaceSpec,
    imports: ImportQueue,
    /// Symmetry of the most recent gesture, shown as guide lines.
    guides: Symmetry,
}

impl Sketchpad {
    /// A session over an empty scene. Call [`Self::start`] to bring the
    /// backend up.
    #[must_use]
    pub fn new(spec: SurfaceSpec, backend: Box<dyn RenderBackend>) -> Self {
        Self::with_engine(EngineCore::new(spec.size), spec, backend)
    }

    #[must_use]
    pub fn with_engine(core: EngineCore, spec: SurfaceSpec, backend: Box<dyn RenderBackend>) -> Self {
        Self { core, backend, spec, imports: ImportQueue::new(), guides: Symmetry::None }
    }

    // --- Backend lifecycle ---

    /// Initialize the backend and draw whatever the scene already holds.
    pub async fn start(&mut self) -> BackendStatus {
        match self.backend.initialize(self.spec.clone()).await {
            Ok(()) => self.redraw(),
            Err(e) => tracing::warn!(backend = self.backend.name(), error = %e, "backend failed to start"),
        }
        self.backend.status()
    }

    /// Dispose the current backend and start `next` against the same scene.
    pub async fn swap_backend(&mut self, next: Box<dyn RenderBackend>) -> BackendStatus {
        let mut previous = mem::replace(&mut self.backend, next);
        previous.dispose();
        tracing::info!(from = previous.name(), to = self.backend.name(), "switching backend");
        self.start().await
    }

    #[must_use]
    pub fn status(&self) -> BackendStatus {
        self.backend.status()
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.core
    }

    // --- Pointer and text input ---

    pub fn pointer_down(&mut self, pt: Point, cfg: &ToolConfig) -> Vec<Action> {
        self.commit_imports();
        self.guides = cfg.symmetry;
        let actions = self.core.on_pointer_down(pt, cfg);
        self.after(&actions);
        actions
    }

    pub fn pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let actions = self.core.on_pointer_move(pt);
        self.after(&actions);
        actions
    }

    pub fn pointer_up(&mut self) -> Vec<Action> {
        let actions = self.core.on_pointer_up();
        self.after(&actions);
        actions
    }

    pub fn submit_text(&mut self, value: &str, cfg: &ToolConfig) -> Vec<Action> {
        let actions = self.core.submit_text(value, cfg);
        self.after(&actions);
        actions
    }

    pub fn cancel_text(&mut self) -> Vec<Action> {
        let actions = self.core.cancel_text();
        self.after(&actions);
        actions
    }

    // --- Facade commands ---

    /// PNG of the scene, in-progress gesture included, as a data URL.
    ///
    /// `None` while the backend is not `Ready` or if encoding fails.
    pub async fn to_data_url(&mut self, density: f64) -> Option<String> {
        let png = self.export_png(density).await?;
        Some(format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png)))
    }

    /// Raw PNG bytes of the scene at `density`.
    pub async fn export_png(&mut self, density: f64) -> Option<Vec<u8>> {
        self.commit_imports();
        let frame = Frame::new(self.core.size, self.core.visible_elements());
        match self.backend.export_png(&frame, density).await {
            Ok(png) => Some(png),
            Err(e) => {
                tracing::warn!(backend = self.backend.name(), density, error = %e, "export failed");
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.commit_imports();
        let actions = self.core.clear();
        self.after(&actions);
    }

    pub fn undo(&mut self) {
        self.commit_imports();
        let actions = self.core.undo();
        self.after(&actions);
    }

    pub fn redo(&mut self) {
        self.commit_imports();
        let actions = self.core.redo();
        self.after(&actions);
    }

    /// Queue a data URL or bare base64 image. The element appears once the
    /// decode completes; see [`Self::settle_imports`].
    pub fn import_image(&mut self, payload: &str) {
        self.imports.submit(payload);
        self.commit_imports();
    }

    /// Queue raw encoded image bytes.
    pub fn import_image_bytes(&mut self, bytes: Vec<u8>) {
        self.imports.submit_bytes(bytes);
        self.commit_imports();
    }

    /// Wait for outstanding decodes and place them. Returns how many images
    /// were added.
    pub async fn settle_imports(&mut self) -> usize {
        let images = self.imports.settle().await;
        self.place_images(images)
    }

    /// Image decodes still running in the background.
    #[must_use]
    pub fn pending_imports(&self) -> usize {
        self.imports.pending()
    }

    /// Expand a named template. Unknown names are ignored.
    pub fn add_template(&mut self, name: &str) {
        self.commit_imports();
        let Some(template) = Template::from_name(name) else {
            tracing::debug!(template = name, "unknown template; ignoring");
            return;
        };
        let actions = self.core.add_template(template);
        self.after(&actions);
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.core.object_count()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.core.can_redo()
    }

    // --- Internals ---

    fn commit_imports(&mut self) {
        let images = self.imports.drain_ready();
        self.place_images(images);
    }

    fn place_images(&mut self, images: Vec<RasterImage>) -> usize {
        let count = images.len();
        for image in images {
            let id = self.core.place_image(ImageRef::new(image));
            tracing::debug!(%id, "image imported");
        }
        if count > 0 {
            self.redraw();
        }
        count
    }

    fn after(&mut self, actions: &[Action]) {
        if !actions.is_empty() {
            self.redraw();
        }
    }

    fn redraw(&mut self) {
        if self.backend.status() != BackendStatus::Ready {
            tracing::trace!(status = ?self.backend.status(), "backend not ready; deferring redraw");
            return;
        }
        let mut frame = Frame::new(self.core.size, self.core.visible_elements());
        frame.selection = self.core.selection();
        frame.guides = self.guides;
        if let Err(e) = self.backend.render_all(&frame) {
            tracing::warn!(backend = self.backend.name(), error = %e, "redraw failed");
        }
    }
}
