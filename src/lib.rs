//! Chapter progress tracking for course videos.
//!
//! A [`PlaybackTracker`] samples a [`Player`]'s clock, resolves it to a
//! chapter and records completion in a [`ProgressStore`] that is persisted
//! through a [`KeyValueStore`].

pub mod config;
pub mod core;
pub mod error;
pub mod playback;
pub mod progress;
pub mod source;

pub use crate::config::Config;
pub use crate::core::{Chapter, ChapterIndex, ChapterList};
pub use crate::error::{CourseError, Result};
pub use crate::playback::{PlaybackTracker, Player, PlayerState, SimulatedPlayer, TrackerPhase, TrackerUpdate};
pub use crate::progress::{FileStore, KeyValueStore, MemoryStore, ProgressStorage, ProgressStore, VideoProgress};
pub use crate::source::{ChapterSource, DirectoryChapterSource, StaticChapterSource, VideoId};
