//! Session events
//!
//! Event-based communication for UI synchronization. Events accumulate on
//! the session and are drained with
//! [`PlaybackSession::take_events`](crate::PlaybackSession::take_events).

use crate::types::{PlaybackState, RepeatMode};
use arioso_core::TrackId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A track's playback unit started (fresh load or resume target change)
    TrackStarted {
        /// ID of the track that started
        track_id: TrackId,
        /// ID of the previously started track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// A track reached its natural end
    TrackFinished {
        /// ID of the finished track
        track_id: TrackId,
    },

    /// Periodic position update while playing
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration
        duration_ms: u64,
    },

    /// User queue contents changed (add/remove/reorder/clear/consume)
    QueueChanged {
        /// New user queue length
        user_queue_length: usize,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume (0.0-1.0)
        volume: f32,
    },

    /// Shuffle toggled
    ShuffleChanged {
        /// Whether shuffle is now enabled
        enabled: bool,
    },

    /// Repeat mode cycled
    RepeatChanged {
        /// The new repeat mode
        mode: RepeatMode,
    },

    /// An error occurred (load failure, output refusal)
    Error {
        /// Human-readable error message
        message: String,
    },
}
