//! Session scripts: a recorded sequence of host calls, replayed through the
//! facade.
//!
//! ```json
//! { "width": 600, "height": 500, "steps": [
//!     { "op": "configure", "tool": "rainbow", "size": 8, "symmetry": "quad" },
//!     { "op": "down", "x": 120, "y": 80 },
//!     { "op": "move", "x": 180, "y": 90 },
//!     { "op": "up" }
//! ] }
//! ```

#[cfg(test)]
#[path = "script_test.rs"]
mod script_test;

use std::fs;
use std::path::{Path, PathBuf};

use canvas::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use canvas::geom::Point;
use canvas::host::Sketchpad;
use canvas::input::{ToolConfig, ToolSettings};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid session script: {0}")]
    Json(#[from] serde_json::Error),
}

fn default_width() -> f64 {
    DEFAULT_CANVAS_WIDTH
}

fn default_height() -> f64 {
    DEFAULT_CANVAS_HEIGHT
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionScript {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One host call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Replace the toolbar state for subsequent steps.
    Configure(ToolSettings),
    Down { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Text { value: String },
    CancelText,
    Undo,
    Redo,
    Clear,
    Template { id: String },
    /// Image file, relative to the script's directory.
    Import { path: PathBuf },
}

impl SessionScript {
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not a valid script.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let raw = fs::read_to_string(path).map_err(|source| ScriptError::Io { path: path.to_owned(), source })?;
        Self::parse(&raw)
    }

    /// # Errors
    ///
    /// [`ScriptError::Json`] for malformed input.
    pub fn parse(raw: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Drive `pad` through every step, then wait for pending imports. Returns the
/// number of steps applied.
///
/// # Errors
///
/// [`ScriptError::Io`] when an imported file cannot be read.
pub async fn replay(script: &SessionScript, pad: &mut Sketchpad, base_dir: &Path) -> Result<usize, ScriptError> {
    let mut cfg = ToolConfig::default();
    for step in &script.steps {
        match step {
            Step::Configure(settings) => cfg = ToolConfig::from_settings(settings),
            Step::Down { x, y } => {
                pad.pointer_down(Point::new(*x, *y), &cfg);
            }
            Step::Move { x, y } => {
                pad.pointer_move(Point::new(*x, *y));
            }
            Step::Up => {
                pad.pointer_up();
            }
            Step::Text { value } => {
                pad.submit_text(value, &cfg);
            }
            Step::CancelText => {
                pad.cancel_text();
            }
            Step::Undo => pad.undo(),
            Step::Redo => pad.redo(),
            Step::Clear => pad.clear(),
            Step::Template { id } => pad.add_template(id),
            Step::Import { path } => {
                let full = base_dir.join(path);
                let bytes = fs::read(&full).map_err(|source| ScriptError::Io { path: full.clone(), source })?;
                pad.import_image_bytes(bytes);
            }
        }
        tracing::trace!(?step, objects = pad.object_count(), "step applied");
    }
    let pending = pad.pending_imports();
    let imported = pad.settle_imports().await;
    if pending > 0 || imported > 0 {
        tracing::debug!(pending, imported, "imports settled");
    }
    Ok(script.steps.len())
}
