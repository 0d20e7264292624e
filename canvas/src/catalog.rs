//! Fixed sticker and stamp catalogs offered by the toolbar.

use serde::{Deserialize, Serialize};

/// A sticker: an emoji dropped onto the canvas as a draggable text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sticker {
    pub id: &'static str,
    pub emoji: &'static str,
}

pub const STICKERS: [Sticker; 15] = [
    Sticker { id: "smile", emoji: "\u{1F60A}" },
    Sticker { id: "heart", emoji: "\u{2764}\u{FE0F}" },
    Sticker { id: "star", emoji: "\u{2B50}" },
    Sticker { id: "sun", emoji: "\u{2600}\u{FE0F}" },
    Sticker { id: "moon", emoji: "\u{1F319}" },
    Sticker { id: "rainbow", emoji: "\u{1F308}" },
    Sticker { id: "flower", emoji: "\u{1F338}" },
    Sticker { id: "tree", emoji: "\u{1F333}" },
    Sticker { id: "cat", emoji: "\u{1F431}" },
    Sticker { id: "dog", emoji: "\u{1F436}" },
    Sticker { id: "butterfly", emoji: "\u{1F98B}" },
    Sticker { id: "rocket", emoji: "\u{1F680}" },
    Sticker { id: "unicorn", emoji: "\u{1F984}" },
    Sticker { id: "crown", emoji: "\u{1F451}" },
    Sticker { id: "magic", emoji: "\u{2728}" },
];

/// Look up a sticker by id.
#[must_use]
pub fn sticker(id: &str) -> Option<&'static Sticker> {
    STICKERS.iter().find(|s| s.id == id)
}

/// Stamp shapes. Every stamp is filled and outlined in the brush color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stamp {
    Circle,
    Star5,
    Star6,
    Triangle,
    Square,
    Pentagon,
    Hexagon,
    Heart,
}

impl Stamp {
    pub const ALL: [Stamp; 8] = [
        Self::Circle,
        Self::Star5,
        Self::Star6,
        Self::Triangle,
        Self::Square,
        Self::Pentagon,
        Self::Hexagon,
        Self::Heart,
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Star5 => "star5",
            Self::Star6 => "star6",
            Self::Triangle => "triangle",
            Self::Square => "square",
            Self::Pentagon => "pentagon",
            Self::Hexagon => "hexagon",
            Self::Heart => "heart",
        }
    }

    /// Side count for polygon stamps, tip count for star stamps.
    #[must_use]
    pub fn vertices(self) -> Option<u32> {
        match self {
            Self::Star5 | Self::Pentagon => Some(5),
            Self::Star6 | Self::Hexagon => Some(6),
            Self::Triangle => Some(3),
            Self::Square => Some(4),
            Self::Circle | Self::Heart => None,
        }
    }
}
