pub mod engine;
pub mod events;
pub mod player;
pub mod state;
pub mod sync;

pub use engine::{PlaybackTracker, VideoSession, DEFAULT_SAMPLE_INTERVAL};
pub use events::{TrackerEvent, TrackerHandle, TrackerUpdate, UserIntent};
pub use player::{Player, PlayerState, SimulatedPlayer, StateListener};
pub use state::{TrackerPhase, TrackerState};
pub use sync::SamplingTimer;
