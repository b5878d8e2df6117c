//! Chapter sources: where a video's chapter list comes from.
//!
//! The tracker only sees the [`ChapterSource`] contract. Descriptions are
//! read from a directory of text files named after the video identifier, or
//! held in memory.

pub mod description;
pub mod video_id;

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::core::{ChapterList, ChapterListError};

pub use description::parse_description;
pub use video_id::{VideoId, VideoIdError};

/// Error type for chapter sources
#[derive(Debug, thiserror::Error)]
pub enum ChapterSourceError {
    #[error("Video {0} not found")]
    NotFound(VideoId),
    #[error("Video {0} has no chapters")]
    NoChapters(VideoId),
    #[error("Malformed chapter list for {video}: {source}")]
    Malformed {
        video: VideoId,
        #[source]
        source: ChapterListError,
    },
    #[error("I/O error reading chapters for {video}: {source}")]
    Io {
        video: VideoId,
        #[source]
        source: io::Error,
    },
}

/// Given a video identifier, return its ordered chapter list
pub trait ChapterSource {
    fn fetch_chapters(&self, video: &VideoId) -> Result<ChapterList, ChapterSourceError>;
}

fn chapters_from_description(video: &VideoId, description: &str) -> Result<ChapterList, ChapterSourceError> {
    let chapters = parse_description(video, description).map_err(|source| ChapterSourceError::Malformed {
        video: video.clone(),
        source,
    })?;
    if chapters.is_empty() {
        return Err(ChapterSourceError::NoChapters(video.clone()));
    }
    Ok(chapters)
}

/// Reads `<dir>/<video-id>.txt` descriptions
#[derive(Debug, Clone)]
pub struct DirectoryChapterSource {
    dir: PathBuf,
}

impl DirectoryChapterSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn description_path(&self, video: &VideoId) -> PathBuf {
        self.dir.join(format!("{}.txt", video))
    }
}

impl ChapterSource for DirectoryChapterSource {
    fn fetch_chapters(&self, video: &VideoId) -> Result<ChapterList, ChapterSourceError> {
        let path = self.description_path(video);
        let description = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ChapterSourceError::NotFound(video.clone()));
            }
            Err(source) => {
                return Err(ChapterSourceError::Io {
                    video: video.clone(),
                    source,
                });
            }
        };
        log::debug!("Read description for {} from {}", video, path.display());
        chapters_from_description(video, &description)
    }
}

/// Descriptions held in memory, keyed by video
#[derive(Debug, Clone, Default)]
pub struct StaticChapterSource {
    descriptions: HashMap<VideoId, String>,
}

impl StaticChapterSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, video: VideoId, description: impl Into<String>) -> Self {
        self.descriptions.insert(video, description.into());
        self
    }
}

impl ChapterSource for StaticChapterSource {
    fn fetch_chapters(&self, video: &VideoId) -> Result<ChapterList, ChapterSourceError> {
        let description = self
            .descriptions
            .get(video)
            .ok_or_else(|| ChapterSourceError::NotFound(video.clone()))?;
        chapters_from_description(video, description)
    }
}
