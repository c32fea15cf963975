//! Error types for the playback engine
//!
//! Queue operations are bounds-checked no-ops rather than errors; load and
//! decode failures travel as [`arioso_core::LoadError`] through the load
//! pipeline and surface on the session as `last_error`.

use thiserror::Error;

/// Playback engine errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// No track is currently loaded
    #[error("no track loaded")]
    NoTrackLoaded,

    /// Invalid volume level
    #[error("invalid volume: {0}. Must be between 0.0 and 1.0")]
    InvalidVolume(f32),

    /// Invalid seek position (non-finite seconds)
    #[error("invalid seek position: {0}")]
    InvalidSeekPosition(f64),

    /// The output backend refused to start a playback unit
    #[error("output backend error: {0}")]
    Output(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
