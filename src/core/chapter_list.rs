//! Ordered chapter list for a single video.

use std::fmt;

use crate::core::chapter::{Chapter, ChapterIndex};
use crate::core::time::{Offset, Position};

/// Error type for chapter list construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterListError {
    /// A chapter starts before the chapter preceding it
    OutOfOrder { index: ChapterIndex, offset: Offset, previous: Offset },
}

impl fmt::Display for ChapterListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChapterListError::OutOfOrder { index, offset, previous } => {
                write!(
                    f,
                    "Chapter {} starts at {}s, before the previous chapter at {}s",
                    index, offset, previous
                )
            }
        }
    }
}

impl std::error::Error for ChapterListError {}

/// Chapters of one video, sorted by non-decreasing `offset_seconds`.
///
/// The position of a chapter in the list is its identity. The list is
/// immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterList {
    chapters: Vec<Chapter>,
}

impl ChapterList {
    /// Build a chapter list, rejecting offsets that go backwards.
    pub fn new(chapters: Vec<Chapter>) -> Result<Self, ChapterListError> {
        for (index, pair) in chapters.windows(2).enumerate() {
            if pair[1].offset_seconds < pair[0].offset_seconds {
                return Err(ChapterListError::OutOfOrder {
                    index: index + 1,
                    offset: pair[1].offset_seconds,
                    previous: pair[0].offset_seconds,
                });
            }
        }
        Ok(Self { chapters })
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn get(&self, index: ChapterIndex) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chapter> {
        self.chapters.iter()
    }

    pub fn as_slice(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Resolve a player position to the current chapter.
    ///
    /// Returns the greatest index whose offset is `<= position`, or 0 when the
    /// position is before the first chapter (or not a number). Equal offsets
    /// resolve to the later chapter. An empty list resolves to 0.
    pub fn chapter_at(&self, position: Position) -> ChapterIndex {
        // Offsets are non-decreasing, so the predicate is true then false.
        let started = self.chapters.partition_point(|chapter| chapter.has_started_at(position));
        started.saturating_sub(1)
    }
}

impl<'a> IntoIterator for &'a ChapterList {
    type Item = &'a Chapter;
    type IntoIter = std::slice::Iter<'a, Chapter>;

    fn into_iter(self) -> Self::IntoIter {
        self.chapters.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(offsets: &[Offset]) -> ChapterList {
        let chapters = offsets
            .iter()
            .enumerate()
            .map(|(i, offset)| Chapter::new(format!("Chapter {}", i), *offset, ""))
            .collect();
        ChapterList::new(chapters).unwrap()
    }

    /// Reference resolution: scan from the end for the last started chapter
    fn linear_chapter_at(list: &ChapterList, position: Position) -> ChapterIndex {
        list.iter()
            .rposition(|chapter| chapter.has_started_at(position))
            .unwrap_or(0)
    }

    #[test]
    fn test_rejects_decreasing_offsets() {
        let chapters = vec![Chapter::new("a", 10, ""), Chapter::new("b", 5, "")];
        let err = ChapterList::new(chapters).unwrap_err();
        assert_eq!(err, ChapterListError::OutOfOrder { index: 1, offset: 5, previous: 10 });
    }

    #[test]
    fn test_chapter_at_scenario() {
        let chapters = list(&[0, 120, 300]);
        assert_eq!(chapters.chapter_at(150.0), 1);
        assert_eq!(chapters.chapter_at(0.0), 0);
        assert_eq!(chapters.chapter_at(119.99), 0);
        assert_eq!(chapters.chapter_at(120.0), 1);
        assert_eq!(chapters.chapter_at(300.0), 2);
        assert_eq!(chapters.chapter_at(10_000.0), 2);
    }

    #[test]
    fn test_chapter_at_before_first_offset() {
        let chapters = list(&[30, 60]);
        assert_eq!(chapters.chapter_at(10.0), 0);
        assert_eq!(chapters.chapter_at(-5.0), 0);
        assert_eq!(chapters.chapter_at(f64::NAN), 0);
    }

    #[test]
    fn test_chapter_at_ties_pick_highest_index() {
        let chapters = list(&[0, 60, 60, 60, 90]);
        assert_eq!(chapters.chapter_at(60.0), 3);
        assert_eq!(chapters.chapter_at(75.0), 3);
        assert_eq!(chapters.chapter_at(59.0), 0);
    }

    #[test]
    fn test_chapter_at_empty() {
        assert_eq!(ChapterList::default().chapter_at(42.0), 0);
    }

    #[test]
    fn test_binary_search_matches_linear_scan() {
        let layouts: [&[Offset]; 5] = [
            &[0],
            &[0, 0, 0],
            &[5, 10, 10, 20, 45, 45, 46],
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            &[100, 200, 300, 3600, 7200],
        ];
        for offsets in layouts {
            let chapters = list(offsets);
            let mut t = -2.0;
            while t < 7300.0 {
                assert_eq!(
                    chapters.chapter_at(t),
                    linear_chapter_at(&chapters, t),
                    "offsets {:?} at t={}",
                    offsets,
                    t
                );
                t += 0.5;
            }
        }
    }
}
