use thiserror::Error;

use crate::core::ChapterIndex;
use crate::progress::StorageError;
use crate::source::{ChapterSourceError, VideoIdError};

#[derive(Error, Debug)]
pub enum CourseError {
    #[error(transparent)]
    VideoId(#[from] VideoIdError),

    #[error(transparent)]
    ChapterSource(#[from] ChapterSourceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Chapter {index} does not exist ({count} chapters)")]
    ChapterOutOfRange { index: ChapterIndex, count: usize },

    #[error("No video loaded")]
    NoVideoLoaded,
}

// Convenient crate-wide result type
pub type Result<T> = std::result::Result<T, CourseError>;
