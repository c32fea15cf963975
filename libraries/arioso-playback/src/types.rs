//! Core types for the playback engine

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Playback state
///
/// Exactly one output unit (or none) is live at any time; every state
/// transition fully stops and releases the previous unit before a new one
/// is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    Idle,

    /// A load is in flight
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track (unit released, resume offset retained)
    Paused,

    /// The output backend refused to start a unit
    Error,
}

/// Repeat mode, consulted only at advance decision points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop at the end of the context
    Off,

    /// Wrap to the start of the context
    All,

    /// Loop the current track indefinitely
    One,
}

impl RepeatMode {
    /// The next mode in the Off -> All -> One -> Off cycle
    #[must_use]
    pub fn cycled(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

/// Configuration for a playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f32,

    /// Initial shuffle state (default: off)
    pub shuffle: bool,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Base path tracks' storage-relative paths are resolved against
    pub library_base_path: PathBuf,

    /// Minimum interval between position update events (default: 250ms)
    pub position_tick: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            shuffle: false,
            repeat: RepeatMode::Off,
            library_base_path: PathBuf::new(),
            position_tick: Duration::from_millis(250),
        }
    }
}
