//! Per-video progress record.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ChapterIndex;

/// Progress of one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoProgress {
    pub completed_chapters: BTreeSet<ChapterIndex>,
    /// Stored as -1 when no chapter has been watched yet
    #[serde(with = "last_watched")]
    pub last_watched_chapter: Option<ChapterIndex>,
    pub progress_percentage: u8,
    pub total_watch_time_seconds: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for VideoProgress {
    fn default() -> Self {
        Self {
            completed_chapters: BTreeSet::new(),
            last_watched_chapter: None,
            progress_percentage: 0,
            total_watch_time_seconds: 0,
            updated_at: None,
        }
    }
}

impl VideoProgress {
    pub fn is_completed(&self, chapter: ChapterIndex) -> bool {
        self.completed_chapters.contains(&chapter)
    }

    /// Drop chapters outside the list and recompute the percentage
    pub(crate) fn normalize(&mut self, chapter_count: usize) {
        self.completed_chapters.retain(|&chapter| chapter < chapter_count);
        if self.last_watched_chapter.is_some_and(|chapter| chapter >= chapter_count) {
            self.last_watched_chapter = None;
        }
        self.progress_percentage = percentage(self.completed_chapters.len(), chapter_count);
    }
}

/// `round(100 * completed / chapter_count)`, halves rounding up; 0 for no chapters
pub fn percentage(completed: usize, chapter_count: usize) -> u8 {
    if chapter_count == 0 {
        return 0;
    }
    let completed = completed.min(chapter_count) as u64;
    let count = chapter_count as u64;
    ((200 * completed + count) / (2 * count)) as u8
}

mod last_watched {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::core::ChapterIndex;

    pub fn serialize<S: Serializer>(value: &Option<ChapterIndex>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(chapter) => serializer.serialize_i64(*chapter as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ChapterIndex>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok())
    }
}
