//! Player control surface consumed by the tracker.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::time::Instant;

use crate::core::Position;

/// Lifecycle and playback states reported by a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// The player finished initializing and can report its clock
    Ready,
    Playing,
    Paused,
    Ended,
}

/// Callback invoked on every player state change
pub type StateListener = Box<dyn Fn(PlayerState) + Send + Sync>;

/// Opaque player capability: read the clock, move it, observe state changes.
pub trait Player {
    /// Current clock position in seconds; `None` until the player is initialized
    fn position(&self) -> Option<Position>;

    /// Move the clock to `position` seconds
    fn seek_to(&mut self, position: Position);

    /// Register a listener for state changes
    fn on_state_change(&mut self, listener: StateListener);
}

#[derive(Default)]
struct SimulatedInner {
    ready: bool,
    /// Clock position when `anchor_instant` was taken (or the frozen position)
    anchor_position: Position,
    /// `Some` while playing
    anchor_instant: Option<Instant>,
    rate: f64,
    listeners: Vec<StateListener>,
}

impl SimulatedInner {
    fn position(&self) -> Position {
        match self.anchor_instant {
            Some(instant) => self.anchor_position + instant.elapsed().as_secs_f64() * self.rate,
            None => self.anchor_position,
        }
    }

    fn emit(&self, state: PlayerState) {
        for listener in &self.listeners {
            listener(state);
        }
    }
}

/// Player whose clock advances with tokio time.
///
/// Cloning yields another handle to the same player, so a caller can keep
/// driving it (play, pause, end) after handing a clone to the tracker.
#[derive(Clone)]
pub struct SimulatedPlayer {
    inner: Arc<Mutex<SimulatedInner>>,
}

impl SimulatedPlayer {
    /// A player that is not initialized yet
    pub fn new() -> Self {
        Self::with_rate(1.0)
    }

    /// A player whose clock advances `rate` seconds per real second
    pub fn with_rate(rate: f64) -> Self {
        let inner = SimulatedInner {
            rate: if rate.is_finite() && rate > 0.0 { rate } else { 1.0 },
            ..SimulatedInner::default()
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Finish initialization; the clock becomes readable
    pub fn make_ready(&self) {
        let mut inner = self.lock();
        inner.ready = true;
        inner.emit(PlayerState::Ready);
    }

    pub fn play(&self) {
        let mut inner = self.lock();
        if inner.anchor_instant.is_none() {
            inner.anchor_instant = Some(Instant::now());
        }
        inner.emit(PlayerState::Playing);
    }

    pub fn pause(&self) {
        let mut inner = self.lock();
        inner.anchor_position = inner.position();
        inner.anchor_instant = None;
        inner.emit(PlayerState::Paused);
    }

    pub fn end(&self) {
        let mut inner = self.lock();
        inner.anchor_position = inner.position();
        inner.anchor_instant = None;
        inner.emit(PlayerState::Ended);
    }

    /// Move the clock as if the user dragged the player's own scrubber
    pub fn scrub_to(&self, position: Position) {
        let mut inner = self.lock();
        inner.anchor_position = position.max(0.0);
        if inner.anchor_instant.is_some() {
            inner.anchor_instant = Some(Instant::now());
        }
    }

    pub fn is_playing(&self) -> bool {
        self.lock().anchor_instant.is_some()
    }
}

impl Default for SimulatedPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimulatedPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("SimulatedPlayer")
            .field("ready", &inner.ready)
            .field("position", &inner.position())
            .field("playing", &inner.anchor_instant.is_some())
            .field("rate", &inner.rate)
            .finish()
    }
}

impl Player for SimulatedPlayer {
    fn position(&self) -> Option<Position> {
        let inner = self.lock();
        inner.ready.then(|| inner.position())
    }

    fn seek_to(&mut self, position: Position) {
        self.scrub_to(position);
    }

    fn on_state_change(&mut self, listener: StateListener) {
        self.lock().listeners.push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_clock_unreadable_until_ready() {
        let player = SimulatedPlayer::new();
        assert_eq!(player.position(), None);
        player.make_ready();
        assert_eq!(player.position(), Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_advances_only_while_playing() {
        let player = SimulatedPlayer::new();
        player.make_ready();
        player.play();
        tokio::time::advance(Duration::from_secs(10)).await;
        player.pause();
        tokio::time::advance(Duration::from_secs(10)).await;

        let position = player.position().unwrap();
        assert!((position - 10.0).abs() < 1e-6, "{}", position);
        assert!(!player.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_and_seek() {
        let mut player = SimulatedPlayer::with_rate(4.0);
        player.make_ready();
        player.seek_to(100.0);
        player.play();
        tokio::time::advance(Duration::from_secs(5)).await;
        let position = player.position().unwrap();
        assert!((position - 120.0).abs() < 1e-6, "{}", position);
    }

    #[test]
    fn test_listeners_receive_states() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut player = SimulatedPlayer::new();
        let sink = Arc::clone(&seen);
        player.on_state_change(Box::new(move |state| sink.lock().unwrap().push(state)));

        player.make_ready();
        player.pause();
        player.end();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![PlayerState::Ready, PlayerState::Paused, PlayerState::Ended]
        );
    }
}
