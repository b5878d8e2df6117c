//! In-memory progress store and its pure update operations.
//!
//! Every update takes `&self` and returns a new store; the caller decides
//! when to persist the result.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ChapterIndex;
use crate::progress::record::{percentage, VideoProgress};
use crate::source::VideoId;

/// Progress of every video ever mutated, keyed by video identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressStore {
    videos: BTreeMap<VideoId, VideoProgress>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Progress of `video`; unknown videos have default (empty) progress
    pub fn progress(&self, video: &VideoId) -> VideoProgress {
        self.videos.get(video).cloned().unwrap_or_default()
    }

    /// Progress of `video` checked against a list of `chapter_count` chapters.
    ///
    /// Chapters the list no longer has are dropped from the copy and the
    /// percentage is recomputed; the stored record is left as is.
    pub fn progress_for(&self, video: &VideoId, chapter_count: usize) -> VideoProgress {
        let mut progress = self.progress(video);
        progress.normalize(chapter_count);
        progress
    }

    pub fn contains(&self, video: &VideoId) -> bool {
        self.videos.contains_key(video)
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VideoId, &VideoProgress)> {
        self.videos.iter()
    }

    /// Record a forward move into `new_chapter` after `watched_seconds` of
    /// sampling.
    ///
    /// Every chapter before `new_chapter` becomes completed; already completed
    /// chapters stay completed.
    pub fn apply_chapter_advance(
        &self,
        video: &VideoId,
        new_chapter: ChapterIndex,
        chapter_count: usize,
        watched_seconds: u64,
    ) -> Self {
        self.apply_chapter_advance_at(video, new_chapter, chapter_count, watched_seconds, Utc::now())
    }

    pub fn apply_chapter_advance_at(
        &self,
        video: &VideoId,
        new_chapter: ChapterIndex,
        chapter_count: usize,
        watched_seconds: u64,
        now: DateTime<Utc>,
    ) -> Self {
        self.update(video, chapter_count, now, |progress| {
            progress
                .completed_chapters
                .extend(0..new_chapter.min(chapter_count));
            progress.last_watched_chapter = Some(new_chapter);
            progress.total_watch_time_seconds = progress.total_watch_time_seconds.saturating_add(watched_seconds);
        })
    }

    /// Flip the completion of `chapter`. Out-of-range chapters leave the store unchanged.
    pub fn toggle_completion(&self, video: &VideoId, chapter: ChapterIndex, chapter_count: usize) -> Self {
        self.toggle_completion_at(video, chapter, chapter_count, Utc::now())
    }

    pub fn toggle_completion_at(
        &self,
        video: &VideoId,
        chapter: ChapterIndex,
        chapter_count: usize,
        now: DateTime<Utc>,
    ) -> Self {
        if chapter >= chapter_count {
            log::warn!(
                "Ignoring completion toggle for chapter {} of {} (only {} chapters)",
                chapter,
                video,
                chapter_count
            );
            return self.clone();
        }

        self.update(video, chapter_count, now, |progress| {
            if !progress.completed_chapters.remove(&chapter) {
                progress.completed_chapters.insert(chapter);
            }
            progress.last_watched_chapter = Some(chapter);
        })
    }

    /// Copy-on-write update of one record; the percentage is always recomputed.
    fn update<F>(&self, video: &VideoId, chapter_count: usize, now: DateTime<Utc>, mutate: F) -> Self
    where
        F: FnOnce(&mut VideoProgress),
    {
        let mut next = self.clone();
        let progress = next.videos.entry(video.clone()).or_default();
        mutate(progress);
        progress.normalize(chapter_count);
        debug_assert_eq!(
            progress.progress_percentage,
            percentage(progress.completed_chapters.len(), chapter_count)
        );
        progress.updated_at = Some(now);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn video() -> VideoId {
        VideoId::parse("dQw4w9WgXcQ").unwrap()
    }

    fn set(items: &[ChapterIndex]) -> BTreeSet<ChapterIndex> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_unknown_video_has_default_progress() {
        let store = ProgressStore::new();
        let progress = store.progress(&video());
        assert_eq!(progress, VideoProgress::default());
        assert!(!store.contains(&video()));
    }

    #[test]
    fn test_progress_for_shorter_chapter_list() {
        let stored = VideoProgress {
            completed_chapters: set(&[0, 1, 2, 3, 4]),
            last_watched_chapter: Some(4),
            progress_percentage: 100,
            total_watch_time_seconds: 12,
            updated_at: None,
        };
        let store: ProgressStore =
            serde_json::from_value(serde_json::json!({ "dQw4w9WgXcQ": stored })).unwrap();

        let progress = store.progress_for(&video(), 2);
        assert_eq!(progress.completed_chapters, set(&[0, 1]));
        assert_eq!(progress.progress_percentage, 100);
        assert_eq!(progress.last_watched_chapter, None);
        assert_eq!(progress.total_watch_time_seconds, 12);
        // The stored record itself is untouched.
        assert_eq!(store.progress(&video()), stored);

        let progress = store.progress_for(&video(), 10);
        assert_eq!(progress.progress_percentage, 50);
        assert_eq!(progress.last_watched_chapter, Some(4));
    }

    #[test]
    fn test_progress_for_unknown_video() {
        assert_eq!(ProgressStore::new().progress_for(&video(), 3), VideoProgress::default());
    }

    #[test]
    fn test_advance_scenario() {
        let store = ProgressStore::new().apply_chapter_advance(&video(), 1, 3, 1);
        let progress = store.progress(&video());
        assert_eq!(progress.completed_chapters, set(&[0]));
        assert_eq!(progress.progress_percentage, 33);
        assert_eq!(progress.last_watched_chapter, Some(1));
        assert_eq!(progress.total_watch_time_seconds, 1);
        assert!(progress.updated_at.is_some());
    }

    #[test]
    fn test_advance_is_pure() {
        let before = ProgressStore::new();
        let after = before.apply_chapter_advance(&video(), 2, 3, 1);
        assert!(before.is_empty());
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn test_advance_never_uncompletes() {
        let store = ProgressStore::new()
            .toggle_completion(&video(), 4, 5)
            .apply_chapter_advance(&video(), 2, 5, 1);
        let progress = store.progress(&video());
        assert_eq!(progress.completed_chapters, set(&[0, 1, 4]));
        assert_eq!(progress.progress_percentage, 60);
    }

    #[test]
    fn test_advance_accumulates_watch_time() {
        let store = ProgressStore::new()
            .apply_chapter_advance(&video(), 1, 4, 2)
            .apply_chapter_advance(&video(), 3, 4, 2);
        let progress = store.progress(&video());
        assert_eq!(progress.completed_chapters, set(&[0, 1, 2]));
        assert_eq!(progress.total_watch_time_seconds, 4);
        assert_eq!(progress.progress_percentage, 75);
    }

    #[test]
    fn test_toggle_scenario() {
        let once = ProgressStore::new().toggle_completion(&video(), 2, 3);
        let progress = once.progress(&video());
        assert_eq!(progress.completed_chapters, set(&[2]));
        assert_eq!(progress.progress_percentage, 33);
        assert_eq!(progress.last_watched_chapter, Some(2));

        let twice = once.toggle_completion(&video(), 2, 3);
        let progress = twice.progress(&video());
        assert!(progress.completed_chapters.is_empty());
        assert_eq!(progress.progress_percentage, 0);
    }

    #[test]
    fn test_double_toggle_restores_completed_set() {
        let t0 = Utc::now();
        let base = ProgressStore::new().apply_chapter_advance_at(&video(), 2, 4, 1, t0);
        let toggled = base
            .toggle_completion_at(&video(), 0, 4, t0 + Duration::seconds(1))
            .toggle_completion_at(&video(), 0, 4, t0 + Duration::seconds(2));

        let before = base.progress(&video());
        let after = toggled.progress(&video());
        assert_eq!(before.completed_chapters, after.completed_chapters);
        assert_eq!(before.progress_percentage, after.progress_percentage);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_toggle_out_of_range_is_noop() {
        let store = ProgressStore::new().toggle_completion(&video(), 3, 3);
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_chapters() {
        let store = ProgressStore::new().apply_chapter_advance(&video(), 0, 0, 1);
        assert_eq!(store.progress(&video()).progress_percentage, 0);
    }

    #[test]
    fn test_percentage_always_recomputed() {
        let mut store = ProgressStore::new();
        let steps: [(bool, ChapterIndex); 6] = [(true, 1), (false, 3), (false, 3), (true, 5), (false, 0), (false, 6)];
        for (advance, chapter) in steps {
            store = if advance {
                store.apply_chapter_advance(&video(), chapter, 7, 1)
            } else {
                store.toggle_completion(&video(), chapter, 7)
            };
            let progress = store.progress(&video());
            assert_eq!(
                progress.progress_percentage,
                percentage(progress.completed_chapters.len(), 7)
            );
            assert!(progress.completed_chapters.iter().all(|&c| c < 7));
        }
    }
}
