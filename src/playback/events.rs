//! Events consumed by the tracker and updates it publishes.
//!
//! Everything that mutates tracker state arrives as a [`TrackerEvent`] on a
//! single queue; the tracker handles them one at a time.

use tokio::sync::mpsc;

use crate::core::{ChapterIndex, ChapterList};
use crate::playback::player::PlayerState;
use crate::playback::state::TrackerPhase;
use crate::progress::VideoProgress;
use crate::source::VideoId;

/// Input to the tracker's event loop
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// Sampling timer fired; `generation` identifies the timer that sent it
    Tick { generation: u64 },
    /// Player lifecycle or playback state change
    Player(PlayerState),
    Intent(UserIntent),
}

/// User-driven operations forwarded by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIntent {
    Load(String),
    SeekToChapter(ChapterIndex),
    ToggleCompletion(ChapterIndex),
    Shutdown,
}

/// State changes published for the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerUpdate {
    VideoLoaded {
        video: VideoId,
        chapters: ChapterList,
        progress: VideoProgress,
    },
    PhaseChanged(TrackerPhase),
    ChapterChanged(ChapterIndex),
    ProgressChanged(VideoProgress),
    /// User-visible message for a failed intent or save
    Notice(String),
}

pub type EventSender = mpsc::UnboundedSender<TrackerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<TrackerEvent>;

/// Cloneable handle for forwarding user intents to a running tracker
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    events: EventSender,
}

impl TrackerHandle {
    pub(crate) fn new(events: EventSender) -> Self {
        Self { events }
    }

    /// Returns `false` once the tracker has stopped
    pub fn load(&self, reference: impl Into<String>) -> bool {
        self.send(UserIntent::Load(reference.into()))
    }

    pub fn seek_to_chapter(&self, chapter: ChapterIndex) -> bool {
        self.send(UserIntent::SeekToChapter(chapter))
    }

    pub fn mark_chapter_completed(&self, chapter: ChapterIndex) -> bool {
        self.send(UserIntent::ToggleCompletion(chapter))
    }

    pub fn shutdown(&self) -> bool {
        self.send(UserIntent::Shutdown)
    }

    fn send(&self, intent: UserIntent) -> bool {
        self.events.send(TrackerEvent::Intent(intent)).is_ok()
    }
}
