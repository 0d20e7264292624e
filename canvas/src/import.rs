//! Asynchronous image import.
//!
//! Payloads are decoded off the input path: on a blocking worker when a Tokio
//! runtime is running, inline otherwise. Results land on an unbounded channel
//! and are collected by the host with [`ImportQueue::drain_ready`] (non-blocking)
//! or [`ImportQueue::settle`] (waits for every worker). Failed decodes are
//! logged and dropped; they never reach the scene.

#[cfg(test)]
#[path = "import_test.rs"]
mod import_test;

use base64::Engine as _;
use base64::engine::general_purpose;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::doc::RasterImage;

/// Why an import was dropped.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("empty image payload")]
    Empty,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

type Outcome = Result<RasterImage, ImportError>;

/// Queue of in-flight decodes.
pub struct ImportQueue {
    tx: mpsc::UnboundedSender<Outcome>,
    rx: mpsc::UnboundedReceiver<Outcome>,
    workers: Vec<JoinHandle<()>>,
}

impl Default for ImportQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportQueue {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, workers: Vec::new() }
    }

    /// Queue a data URL (`data:image/png;base64,...`) or bare base64 payload.
    pub fn submit(&mut self, payload: &str) {
        match decode_payload(payload) {
            Ok(bytes) => self.submit_bytes(bytes),
            Err(e) => tracing::warn!(error = %e, "dropping image import"),
        }
    }

    /// Queue raw encoded image bytes (PNG or JPEG).
    pub fn submit_bytes(&mut self, bytes: Vec<u8>) {
        let tx = self.tx.clone();
        let job = move || {
            let outcome = decode_image(&bytes);
            if tx.send(outcome).is_err() {
                tracing::debug!("import queue gone; discarding decoded image");
            }
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => self.workers.push(handle.spawn_blocking(job)),
            Err(_) => job(),
        }
    }

    /// Decodes still running on a worker.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.workers.iter().filter(|w| !w.is_finished()).count()
    }

    /// Collect every decode that has completed so far without waiting.
    pub fn drain_ready(&mut self) -> Vec<RasterImage> {
        self.workers.retain(|w| !w.is_finished());
        let mut ready = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            match outcome {
                Ok(image) => ready.push(image),
                Err(e) => tracing::warn!(error = %e, "dropping image import"),
            }
        }
        ready
    }

    /// Wait for all in-flight decodes, then collect them.
    pub async fn settle(&mut self) -> Vec<RasterImage> {
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "image decode worker failed");
            }
        }
        self.drain_ready()
    }
}

/// Strip an optional data-URL header and decode the base64 body.
fn decode_payload(payload: &str) -> Result<Vec<u8>, ImportError> {
    let body = match payload.split_once(',') {
        Some((header, body)) if header.starts_with("data:") => body,
        _ => payload,
    };
    let body = body.trim();
    if body.is_empty() {
        return Err(ImportError::Empty);
    }
    Ok(general_purpose::STANDARD.decode(body)?)
}

fn decode_image(bytes: &[u8]) -> Outcome {
    if bytes.is_empty() {
        return Err(ImportError::Empty);
    }
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(RasterImage { width, height, rgba: rgba.into_raw() })
}
