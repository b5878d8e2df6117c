//! Periodic sampling timer.
//! The timer only enqueues ticks; sampling itself runs on the tracker's event loop.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::playback::events::{EventSender, TrackerEvent};

/// Owned handle to a running sampling timer.
///
/// Dropping the handle cancels the timer. Cancelling twice is a no-op.
#[derive(Debug)]
pub struct SamplingTimer {
    generation: u64,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SamplingTimer {
    /// Start ticking every `interval`, first tick one interval from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(interval: Duration, generation: u64, events: EventSender) -> Self {
        let first = Instant::now() + interval;
        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(first, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if events.send(TrackerEvent::Tick { generation }).is_err() {
                    // Tracker is gone
                    break;
                }
            }
        });

        log::debug!("Sampling timer {} started ({:?})", generation, interval);
        Self {
            generation,
            interval,
            handle: Some(handle),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the timer
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("Sampling timer {} cancelled", self.generation);
        }
    }
}

impl Drop for SamplingTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
