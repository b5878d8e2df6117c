//! Core types for chaptered videos.
//!
//! This module provides the chapter model and the time representation used
//! by the progress store and the playback tracker. Chapter offsets are whole
//! seconds; the player clock is fractional seconds.

pub mod chapter;
pub mod chapter_list;
pub mod time;

// Re-export core data structures for easier access.
pub use chapter::{Chapter, ChapterIndex};
pub use chapter_list::{ChapterList, ChapterListError};
pub use time::{Offset, Position};
