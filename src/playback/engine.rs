//! Playback tracker: bridges the player clock to chapter progress.
//! All state changes happen on one event queue; updates go out over a crossbeam channel.

use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::time::Duration;

use crossbeam::channel;
use tokio::sync::mpsc;

use crate::core::time;
use crate::core::{ChapterIndex, ChapterList};
use crate::error::{CourseError, Result};
use crate::playback::events::{
    EventReceiver, EventSender, TrackerEvent, TrackerHandle, TrackerUpdate, UserIntent,
};
use crate::playback::player::{Player, PlayerState};
use crate::playback::state::{TrackerPhase, TrackerState};
use crate::playback::sync::SamplingTimer;
use crate::progress::{KeyValueStore, ProgressStorage, ProgressStore, VideoProgress};
use crate::source::{ChapterSource, VideoId};

/// Default period between clock samples, and the shortest one accepted
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// The video currently loaded into the tracker
#[derive(Debug, Clone)]
pub struct VideoSession {
    pub video: VideoId,
    pub chapters: ChapterList,
    pub current_chapter: ChapterIndex,
}

/// Tracks chapter progress for one video at a time
pub struct PlaybackTracker<P, S> {
    player: P,
    source: Box<dyn ChapterSource + Send>,
    storage: ProgressStorage<S>,
    store: ProgressStore,
    session: Option<VideoSession>,
    state: TrackerState,
    sample_interval: Duration,
    next_generation: u64,
    events_tx: EventSender,
    events_rx: EventReceiver,
    /// Set while a renderer holds the receiving end
    updates_tx: Option<channel::Sender<TrackerUpdate>>,
}

impl<P: Player, S: KeyValueStore> PlaybackTracker<P, S> {
    /// Create a tracker; stored progress is loaded immediately.
    ///
    /// Watch time is credited in whole seconds, so `sample_interval` is
    /// raised to at least [`DEFAULT_SAMPLE_INTERVAL`].
    pub fn new(
        mut player: P,
        source: impl ChapterSource + Send + 'static,
        storage: ProgressStorage<S>,
        sample_interval: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let player_events = events_tx.clone();
        player.on_state_change(Box::new(move |state| {
            let _ = player_events.send(TrackerEvent::Player(state));
        }));

        let store = storage.load();
        log::info!("Loaded progress for {} video(s)", store.len());

        Self {
            player,
            source: Box::new(source),
            storage,
            store,
            session: None,
            state: TrackerState::Idle,
            sample_interval: sample_interval.max(DEFAULT_SAMPLE_INTERVAL),
            next_generation: 0,
            events_tx,
            events_rx,
            updates_tx: None,
        }
    }

    /// Handle for forwarding user intents into [`run`](Self::run)
    pub fn handle(&self) -> TrackerHandle {
        TrackerHandle::new(self.events_tx.clone())
    }

    /// Open the update stream for the renderer.
    ///
    /// There is one renderer at a time: a second call disconnects the
    /// receiver returned by the first. Updates are not queued before this is
    /// called or after the receiver is dropped.
    pub fn updates(&mut self) -> channel::Receiver<TrackerUpdate> {
        let (tx, rx) = channel::unbounded();
        self.updates_tx = Some(tx);
        rx
    }

    pub fn phase(&self) -> TrackerPhase {
        self.state.phase()
    }

    pub fn session(&self) -> Option<&VideoSession> {
        self.session.as_ref()
    }

    pub fn current_chapter(&self) -> Option<ChapterIndex> {
        self.session.as_ref().map(|s| s.current_chapter)
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// Progress of the loaded video, checked against its chapter list
    pub fn progress(&self) -> Option<VideoProgress> {
        self.session
            .as_ref()
            .map(|s| self.store.progress_for(&s.video, s.chapters.len()))
    }

    pub fn sample_interval(&self) -> Duration {
        self.sample_interval
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Process events until a shutdown intent arrives
    pub async fn run(mut self) -> Self {
        while let Some(event) = self.events_rx.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }
        self.shutdown();
        self
    }

    /// Process every event already queued, without waiting for more
    pub fn drain_events(&mut self) -> ControlFlow<()> {
        while let Ok(event) = self.events_rx.try_recv() {
            if self.handle_event(event).is_break() {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Handle one event. Failed intents are reported as notices.
    ///
    /// Sampling runs on a tokio task, so a `Playing` event handled outside a
    /// tokio runtime is reported as a notice and the tracker stays where it is.
    pub fn handle_event(&mut self, event: TrackerEvent) -> ControlFlow<()> {
        match event {
            TrackerEvent::Tick { generation } => self.on_tick(generation),
            TrackerEvent::Player(state) => self.on_player_state(state),
            TrackerEvent::Intent(UserIntent::Shutdown) => return ControlFlow::Break(()),
            TrackerEvent::Intent(intent) => {
                let result = match intent {
                    UserIntent::Load(reference) => self.load_video(&reference),
                    UserIntent::SeekToChapter(chapter) => self.seek_to_chapter(chapter),
                    UserIntent::ToggleCompletion(chapter) => self.mark_chapter_completed(chapter),
                    UserIntent::Shutdown => Ok(()),
                };
                if let Err(e) = result {
                    log::warn!("{}", e);
                    self.notify(TrackerUpdate::Notice(e.to_string()));
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Load the chapters of `reference`.
    ///
    /// On failure nothing changes: the previous video, its timer and its
    /// progress stay as they were.
    pub fn load_video(&mut self, reference: &str) -> Result<()> {
        let video = VideoId::parse(reference)?;
        let chapters = self.source.fetch_chapters(&video)?;

        self.transition(TrackerState::Idle);
        log::info!("Loaded {} chapter(s) for {}", chapters.len(), video);

        let progress = self.store.progress_for(&video, chapters.len());
        self.session = Some(VideoSession {
            video: video.clone(),
            chapters: chapters.clone(),
            current_chapter: 0,
        });
        self.transition(TrackerState::Ready);
        self.notify(TrackerUpdate::VideoLoaded {
            video,
            chapters,
            progress,
        });
        Ok(())
    }

    /// Move the player to the start of `chapter`.
    ///
    /// The current chapter changes immediately; the next sample reconciles it
    /// with the player's actual position.
    pub fn seek_to_chapter(&mut self, chapter: ChapterIndex) -> Result<()> {
        let session = self.session.as_mut().ok_or(CourseError::NoVideoLoaded)?;
        let target = session.chapters.get(chapter).ok_or(CourseError::ChapterOutOfRange {
            index: chapter,
            count: session.chapters.len(),
        })?;

        self.player.seek_to(target.start());
        session.current_chapter = chapter;
        log::debug!("Seek to chapter {} at {}", chapter, target.display_time);
        self.notify(TrackerUpdate::ChapterChanged(chapter));
        Ok(())
    }

    /// Flip the completion of `chapter`, regardless of playback state
    pub fn mark_chapter_completed(&mut self, chapter: ChapterIndex) -> Result<()> {
        let session = self.session.as_ref().ok_or(CourseError::NoVideoLoaded)?;
        let count = session.chapters.len();
        if chapter >= count {
            return Err(CourseError::ChapterOutOfRange { index: chapter, count });
        }

        let video = session.video.clone();
        let next = self.store.toggle_completion(&video, chapter, count);
        self.commit(&video, next);
        Ok(())
    }

    /// React to a player lifecycle or playback state change.
    /// `Playing` starts sampling only inside a tokio runtime.
    pub fn on_player_state(&mut self, state: PlayerState) {
        if !self.state.has_video() {
            log::debug!("Ignoring player state {:?} with no video loaded", state);
            return;
        }

        match state {
            PlayerState::Ready => log::debug!("Player ready"),
            PlayerState::Playing => {
                if !self.state.is_sampling() {
                    self.start_sampling();
                }
            }
            PlayerState::Paused => self.transition(TrackerState::Paused),
            PlayerState::Ended => self.transition(TrackerState::Ended),
        }
    }

    fn on_tick(&mut self, generation: u64) {
        if self.state.timer_generation() != Some(generation) {
            log::trace!("Dropping tick from cancelled timer {}", generation);
            return;
        }
        self.sample();
    }

    /// One resolution step: read the clock, resolve the chapter, record advances.
    pub fn sample(&mut self) {
        // Player not initialized yet; try again next tick.
        let Some(position) = self.player.position() else {
            return;
        };
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.chapters.is_empty() {
            return;
        }

        let resolved = session.chapters.chapter_at(position);
        let previous = session.current_chapter;
        let ordering = resolved.cmp(&previous);
        if ordering == Ordering::Equal {
            return;
        }

        session.current_chapter = resolved;
        let video = session.video.clone();
        let count = session.chapters.len();
        log::debug!("Chapter {} -> {} at {:.1}s", previous, resolved, position);
        self.notify(TrackerUpdate::ChapterChanged(resolved));

        // Moving backwards never un-completes anything.
        if ordering == Ordering::Greater {
            let watched = time::whole_seconds(self.sample_interval);
            let next = self.store.apply_chapter_advance(&video, resolved, count, watched);
            self.commit(&video, next);
        }
    }

    /// End the session: release the timer and unload the video
    pub fn shutdown(&mut self) {
        self.transition(TrackerState::Idle);
        self.session = None;
    }

    fn start_sampling(&mut self) {
        if tokio::runtime::Handle::try_current().is_err() {
            log::warn!("Cannot sample outside a tokio runtime");
            self.notify(TrackerUpdate::Notice("Playback sampling needs a tokio runtime".to_string()));
            return;
        }
        self.state.cancel_timer();
        self.next_generation += 1;
        let timer = SamplingTimer::start(self.sample_interval, self.next_generation, self.events_tx.clone());
        self.transition(TrackerState::Sampling { timer });
    }

    fn transition(&mut self, next: TrackerState) {
        self.state.cancel_timer();
        let previous = std::mem::replace(&mut self.state, next).phase();
        let current = self.state.phase();
        if previous != current {
            log::debug!("Tracker {:?} -> {:?}", previous, current);
            self.notify(TrackerUpdate::PhaseChanged(current));
        }
    }

    /// Replace the store with `next`, then persist it
    fn commit(&mut self, video: &VideoId, next: ProgressStore) {
        self.store = next;
        if let Err(e) = self.storage.save(&self.store) {
            log::warn!("Failed to save progress: {}", e);
            self.notify(TrackerUpdate::Notice(format!("Progress not saved: {}", e)));
        }
        let count = self.session.as_ref().map_or(0, |s| s.chapters.len());
        self.notify(TrackerUpdate::ProgressChanged(self.store.progress_for(video, count)));
    }

    fn notify(&mut self, update: TrackerUpdate) {
        let Some(tx) = &self.updates_tx else {
            return;
        };
        if tx.send(update).is_err() {
            log::debug!("Renderer went away; dropping updates until a new one subscribes");
            self.updates_tx = None;
        }
    }
}
