//! Chapter data structure representing a named segment of a video.

use serde::{Deserialize, Serialize};

use crate::core::time::{self, Offset, Position};

/// Chapter number: 0-based position in the chapter list
pub type ChapterIndex = usize;

/// A named segment of a video starting at a fixed offset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub title: String,
    pub display_time: String,  // "H:MM:SS" or "M:SS"
    pub source_url: String,    // Deep link into the video at this chapter
    pub offset_seconds: Offset,
}

impl Chapter {
    /// Create a new chapter; the display time is derived from the offset
    pub fn new(title: impl Into<String>, offset_seconds: Offset, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            display_time: time::format_timestamp(offset_seconds),
            source_url: source_url.into(),
            offset_seconds,
        }
    }

    /// Offset as a player position
    pub fn start(&self) -> Position {
        time::to_position(self.offset_seconds)
    }

    /// Check if the player clock has reached this chapter
    pub fn has_started_at(&self, position: Position) -> bool {
        self.start() <= position
    }
}
