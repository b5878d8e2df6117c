//! Chapter extraction from a video description.
//!
//! Every line carrying a timestamp becomes a chapter; the title is what is
//! left of the line once the timestamp and its separators are removed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::time;
use crate::core::{Chapter, ChapterList, ChapterListError};
use crate::source::video_id::VideoId;

static TIMESTAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\[(]?\b((?:\d{1,2}:)?\d{1,2}:\d{2})\b[\])]?").expect("timestamp pattern is valid")
});

const SEPARATORS: &[char] = &['-', '–', '—', ':', '|', '.', '•', '·'];

/// Parse the chapters of `video` out of its description text.
///
/// Returns an empty list when no line carries a timestamp.
pub fn parse_description(video: &VideoId, description: &str) -> Result<ChapterList, ChapterListError> {
    let chapters = description
        .lines()
        .filter_map(|line| parse_line(video, line))
        .collect();
    ChapterList::new(chapters)
}

fn parse_line(video: &VideoId, line: &str) -> Option<Chapter> {
    let found = TIMESTAMP.captures_iter(line).find_map(|captures| {
        let whole = captures.get(0)?;
        let offset = time::parse_timestamp(captures.get(1)?.as_str())?;
        Some((whole, offset))
    })?;
    let (whole, offset) = found;

    let before = clean_title(&line[..whole.start()]);
    let after = clean_title(&line[whole.end()..]);
    // Titles usually follow the timestamp; some descriptions put them first.
    let title = if after.is_empty() { before } else { after };
    let title = if title.is_empty() {
        time::format_timestamp(offset)
    } else {
        title
    };

    Some(Chapter::new(title, offset, video.watch_url(offset)))
}

fn clean_title(text: &str) -> String {
    text.trim()
        .trim_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
        .to_string()
}
