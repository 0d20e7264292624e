//! Input model: tools, per-session tool configuration, and the gesture state
//! machine.
//!
//! `Tool` and `ToolConfig` capture what the user picked in the toolbar at the
//! time of a pointer event. `ToolSettings` is the raw, loosely-typed form the
//! host hands over; `ToolConfig::from_settings` validates it. `InputState` is
//! the active gesture tracked between pointer-down and pointer-up, carrying
//! the in-progress elements that are committed to the scene on release.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::catalog::{self, Stamp, Sticker};
use crate::color::Color;
use crate::consts::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::doc::{Element, ElementId};
use crate::geom::{Point, Symmetry};

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Pick and drag existing elements.
    Select,
    /// Freehand pen (default).
    #[default]
    Brush,
    Eraser,
    Highlighter,
    Spray,
    Rainbow,
    /// Rosette stamps spaced along the pointer path.
    Pattern,
    Line,
    Arrow,
    Rect,
    Circle,
    Triangle,
    Star,
    Heart,
    Sticker,
    Stamp,
    /// Flood the whole canvas with the brush color.
    Fill,
    /// Flood the whole canvas with the rainbow gradient.
    Gradient,
    Text,
}

/// How a tool reacts to pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Select,
    /// One finished element per pointer-down.
    Stamping,
    /// Elements grow with every pointer-move.
    Continuous,
    /// One element redefined from start and current position.
    Shape,
}

impl Tool {
    pub const ALL: [Tool; 19] = [
        Self::Select,
        Self::Brush,
        Self::Eraser,
        Self::Highlighter,
        Self::Spray,
        Self::Rainbow,
        Self::Pattern,
        Self::Line,
        Self::Arrow,
        Self::Rect,
        Self::Circle,
        Self::Triangle,
        Self::Star,
        Self::Heart,
        Self::Sticker,
        Self::Stamp,
        Self::Fill,
        Self::Gradient,
        Self::Text,
    ];

    /// Parse a toolbar identifier.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Brush => "brush",
            Self::Eraser => "eraser",
            Self::Highlighter => "highlighter",
            Self::Spray => "spray",
            Self::Rainbow => "rainbow",
            Self::Pattern => "pattern",
            Self::Line => "line",
            Self::Arrow => "arrow",
            Self::Rect => "rect",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Star => "star",
            Self::Heart => "heart",
            Self::Sticker => "sticker",
            Self::Stamp => "stamp",
            Self::Fill => "fill",
            Self::Gradient => "gradient",
            Self::Text => "text",
        }
    }

    #[must_use]
    pub fn category(self) -> ToolCategory {
        match self {
            Self::Select => ToolCategory::Select,
            Self::Sticker | Self::Stamp | Self::Fill | Self::Gradient | Self::Text => ToolCategory::Stamping,
            Self::Brush | Self::Eraser | Self::Highlighter | Self::Spray | Self::Rainbow | Self::Pattern => {
                ToolCategory::Continuous
            }
            Self::Line | Self::Arrow | Self::Rect | Self::Circle | Self::Triangle | Self::Star | Self::Heart => {
                ToolCategory::Shape
            }
        }
    }

    /// Whether pointer input for this tool is mirrored by the symmetry mode.
    #[must_use]
    pub fn is_mirrored(self) -> bool {
        self.category() == ToolCategory::Continuous
    }
}

/// Raw toolbar state as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub tool: String,
    pub color: String,
    pub size: u32,
    pub symmetry: String,
    pub sticker: Option<String>,
    pub stamp: Option<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Brush.name().to_owned(),
            color: "#000000".to_owned(),
            size: 5,
            symmetry: "none".to_owned(),
            sticker: None,
            stamp: None,
        }
    }
}

/// Validated tool configuration injected into every pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolConfig {
    pub tool: Tool,
    pub color: Color,
    /// Brush size, within `MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE`.
    pub size: u32,
    pub symmetry: Symmetry,
    pub sticker: Option<&'static Sticker>,
    pub stamp: Option<Stamp>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::from_settings(&ToolSettings::default())
    }
}

impl ToolConfig {
    /// Validate raw settings. Nothing here fails: unknown or malformed values
    /// fall back to safe defaults.
    #[must_use]
    pub fn from_settings(settings: &ToolSettings) -> Self {
        let tool = Tool::from_name(&settings.tool).unwrap_or_else(|| {
            tracing::debug!(tool = %settings.tool, "unknown tool; using brush");
            Tool::Brush
        });
        let color = Color::from_hex(&settings.color).unwrap_or_else(|e| {
            tracing::debug!(color = %settings.color, error = %e, "bad brush color; using black");
            Color::BLACK
        });
        let symmetry = Symmetry::from_name(&settings.symmetry).unwrap_or_else(|| {
            tracing::debug!(symmetry = %settings.symmetry, "unknown symmetry mode; using none");
            Symmetry::None
        });
        let sticker = settings.sticker.as_deref().and_then(catalog::sticker);
        let stamp = settings.stamp.as_deref().and_then(Stamp::from_name);

        Self {
            tool,
            color,
            size: settings.size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE),
            symmetry,
            sticker,
            stamp,
        }
    }

    /// Symmetry mode applied to this tool's pointer input. Only continuous
    /// tools are mirrored.
    #[must_use]
    pub fn mirroring(&self) -> Symmetry {
        if self.tool.is_mirrored() { self.symmetry } else { Symmetry::None }
    }

    /// Brush size as a float, for geometry.
    #[must_use]
    pub fn brush(&self) -> f64 {
        f64::from(self.size)
    }
}

/// Open inline text entry awaiting submit or cancel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextEntry {
    pub position: Point,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The id of the currently selected element, if any.
    pub selected: Option<ElementId>,
    pub text_entry: Option<TextEntry>,
}

/// What the active gesture is producing.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureAction {
    /// One growing element per symmetry arm, in reflection order.
    Freehand { elements: Vec<Element> },
    /// Rosettes are committed as they are emitted; only the spacing cursor
    /// lives here.
    Pattern { last_stamp: Point },
    /// Replaced wholesale on every move. `None` until the first move.
    Shape { preview: Option<Element> },
    /// Moving an existing element by `offset` from where it started.
    Drag { id: ElementId, offset: Point },
}

/// A pointer-down..pointer-up interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    /// Tool configuration snapshot taken at pointer-down.
    pub config: ToolConfig,
    pub start: Point,
    pub action: GestureAction,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    Drawing(Gesture),
}

impl InputState {
    #[must_use]
    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing(_))
    }
}
