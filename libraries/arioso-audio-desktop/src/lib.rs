//! Desktop audio backends for the Arioso playback engine
//!
//! Wires the engine's collaborator traits to real desktop I/O:
//!
//! - [`FsByteSource`]: reads track files from the local filesystem
//! - [`SymphoniaDecoder`]: decodes whole tracks to interleaved stereo f32
//! - [`CpalOutput`]: plays decoded buffers through the default CPAL device
//!
//! [`create_session`] assembles a ready-to-use [`PlaybackSession`] from the
//! three. The session (and the CPAL streams it owns) must stay on the
//! thread that created it.

#![forbid(unsafe_code)]

pub mod decoder;
pub mod error;
pub mod fetch;
pub mod output;

pub use decoder::SymphoniaDecoder;
pub use error::{AudioError, Result};
pub use fetch::FsByteSource;
pub use output::CpalOutput;

use arioso_playback::{PlaybackConfig, PlaybackSession};
use std::sync::Arc;

/// Build a playback session backed by the desktop implementations
#[must_use]
pub fn create_session(config: PlaybackConfig) -> PlaybackSession {
    PlaybackSession::new(
        config,
        Box::new(CpalOutput::new()),
        Arc::new(FsByteSource::new()),
        Arc::new(SymphoniaDecoder::new()),
    )
}
