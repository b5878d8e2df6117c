//! Tracker state machine.

use crate::playback::sync::SamplingTimer;

/// Tracker state.
///
/// Only `Sampling` holds a timer, so leaving it releases the timer.
#[derive(Debug, Default)]
pub enum TrackerState {
    /// Idle - no chapters loaded
    #[default]
    Idle,
    /// Ready - chapters loaded, playback not started
    Ready,
    /// Sampling - player is playing and the timer is running
    Sampling { timer: SamplingTimer },
    /// Paused - playback paused, timer released
    Paused,
    /// Ended - playback reached the end, timer released
    Ended,
}

/// Timer-free view of [`TrackerState`] for comparisons and notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerPhase {
    Idle,
    Ready,
    Sampling,
    Paused,
    Ended,
}

impl TrackerState {
    pub fn phase(&self) -> TrackerPhase {
        match self {
            TrackerState::Idle => TrackerPhase::Idle,
            TrackerState::Ready => TrackerPhase::Ready,
            TrackerState::Sampling { .. } => TrackerPhase::Sampling,
            TrackerState::Paused => TrackerPhase::Paused,
            TrackerState::Ended => TrackerPhase::Ended,
        }
    }

    /// Check if the sampling timer is running
    pub fn is_sampling(&self) -> bool {
        matches!(self, TrackerState::Sampling { .. })
    }

    /// Check if chapters are loaded
    pub fn has_video(&self) -> bool {
        !matches!(self, TrackerState::Idle)
    }

    /// Generation of the active timer, if any
    pub fn timer_generation(&self) -> Option<u64> {
        match self {
            TrackerState::Sampling { timer } => Some(timer.generation()),
            _ => None,
        }
    }

    /// Cancel the active timer, if any
    pub fn cancel_timer(&mut self) {
        if let TrackerState::Sampling { timer } = self {
            timer.cancel();
        }
    }
}
