//! Time representation for chapter offsets and the player clock.
//! Chapter offsets are whole seconds; the player clock is fractional seconds.

use std::time::Duration;

/// Chapter offset in whole seconds from the start of the video
pub type Offset = u64;

/// Player clock position in seconds (fractional)
pub type Position = f64;

/// Time constants for conversions
pub mod constants {
    use super::Offset;

    pub const SECONDS_PER_MINUTE: Offset = 60;
    pub const SECONDS_PER_HOUR: Offset = 3600;
}

use constants::{SECONDS_PER_HOUR, SECONDS_PER_MINUTE};

/// Convert a chapter offset to a player position
#[inline]
pub fn to_position(offset: Offset) -> Position {
    offset as Position
}

/// Whole seconds of a duration, rounded down
#[inline]
pub fn whole_seconds(duration: Duration) -> u64 {
    duration.as_secs()
}

/// Parse a display timestamp (`M:SS`, `MM:SS` or `H:MM:SS`) into seconds.
///
/// Minutes and seconds past the leading component must be two digits and
/// below 60. Returns `None` for anything else.
pub fn parse_timestamp(text: &str) -> Option<Offset> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    if parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }

    let numbers: Vec<Offset> = parts
        .iter()
        .map(|p| p.parse::<Offset>())
        .collect::<Result<_, _>>()
        .ok()?;

    match numbers.as_slice() {
        [minutes, seconds] => {
            if parts[1].len() != 2 || *seconds >= 60 {
                return None;
            }
            Some(minutes * SECONDS_PER_MINUTE + seconds)
        }
        [hours, minutes, seconds] => {
            if parts[1].len() != 2 || parts[2].len() != 2 || *minutes >= 60 || *seconds >= 60 {
                return None;
            }
            Some(hours * SECONDS_PER_HOUR + minutes * SECONDS_PER_MINUTE + seconds)
        }
        _ => None,
    }
}

/// Format seconds as `H:MM:SS` from one hour on, `M:SS` below
pub fn format_timestamp(offset: Offset) -> String {
    let hours = offset / SECONDS_PER_HOUR;
    let minutes = (offset % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = offset % SECONDS_PER_MINUTE;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
