//! Video identifiers and the references users type to name a video.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::time::Offset;

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id pattern is valid")
});

/// Error type for video reference parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VideoIdError {
    #[error("Unrecognized video reference: {0:?}")]
    Unrecognized(String),
}

/// Stable identifier scoping a progress record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    /// Parse a bare identifier or a watch/share/embed URL.
    pub fn parse(reference: &str) -> Result<Self, VideoIdError> {
        let reference = reference.trim();
        if VIDEO_ID.is_match(reference) {
            return Ok(Self(reference.to_string()));
        }

        let unrecognized = || VideoIdError::Unrecognized(reference.to_string());

        // Accept scheme-less links such as "youtu.be/abc".
        let url = Url::parse(reference)
            .or_else(|_| Url::parse(&format!("https://{}", reference)))
            .map_err(|_| unrecognized())?;

        let host = url.host_str().ok_or_else(unrecognized)?;
        let host = host
            .strip_prefix("www.")
            .or_else(|| host.strip_prefix("m."))
            .unwrap_or(host);

        let candidate = match host {
            "youtu.be" => url.path_segments().and_then(|mut s| s.next()).map(str::to_string),
            "youtube.com" | "youtube-nocookie.com" => {
                let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
                match segments.as_slice() {
                    ["watch"] => url
                        .query_pairs()
                        .find(|(key, _)| key == "v")
                        .map(|(_, value)| value.into_owned()),
                    ["embed" | "shorts" | "live" | "v", id, ..] => Some(id.to_string()),
                    _ => None,
                }
            }
            _ => None,
        };

        match candidate {
            Some(id) if VIDEO_ID.is_match(&id) => Ok(Self(id)),
            _ => Err(unrecognized()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deep link that starts playback at `offset` seconds
    pub fn watch_url(&self, offset: Offset) -> String {
        format!("https://www.youtube.com/watch?v={}&t={}s", self.0, offset)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_bare_id() {
        assert_eq!(VideoId::parse(ID).unwrap().as_str(), ID);
        assert_eq!(VideoId::parse("  dQw4w9WgXcQ \n").unwrap().as_str(), ID);
    }

    #[test]
    fn test_url_forms() {
        let refs = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42s",
            "http://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=abc",
            "youtu.be/dQw4w9WgXcQ",
            "www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?feature=share",
        ];
        for reference in refs {
            assert_eq!(VideoId::parse(reference).unwrap().as_str(), ID, "{}", reference);
        }
    }

    #[test]
    fn test_rejects_unrecognized() {
        let refs = [
            "",
            "short",
            "dQw4w9WgXcQ-too-long",
            "https://vimeo.com/123456",
            "https://www.youtube.com/watch?list=abc",
            "https://www.youtube.com/watch?v=bad",
            "not a url at all",
        ];
        for reference in refs {
            assert!(VideoId::parse(reference).is_err(), "{}", reference);
        }
    }

    #[test]
    fn test_watch_url() {
        let id = VideoId::parse(ID).unwrap();
        assert_eq!(id.watch_url(120), "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=120s");
    }
}
