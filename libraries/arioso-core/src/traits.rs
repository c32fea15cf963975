//! Collaborator traits consumed by the playback core
//!
//! The playback engine never touches the filesystem, a decoder library, or
//! the recents store directly; those concerns are provided by implementers
//! of these traits (desktop implementations live in `arioso-audio-desktop`).

use crate::error::LoadError;
use crate::types::{DecodedAudio, TrackId};
use async_trait::async_trait;
use std::path::Path;

/// Provides the raw bytes for a resolved track path.
///
/// The desktop implementation reads from disk; a test implementation can
/// serve from memory. Fetching is the only suspending operation in the
/// playback core's load pipeline.
#[async_trait]
pub trait TrackByteSource: Send + Sync {
    /// Fetch the full contents of the audio file at `path`
    ///
    /// # Errors
    /// Returns [`LoadError::Io`] if the file cannot be read
    async fn fetch(&self, path: &Path) -> Result<Vec<u8>, LoadError>;
}

/// Decodes raw audio bytes into a playable buffer.
pub trait AudioDecoder: Send + Sync {
    /// Decode an entire track into interleaved stereo f32 samples
    ///
    /// `path` is only used for error reporting and format hinting.
    ///
    /// # Errors
    /// Returns [`LoadError::Decode`] if the data is corrupt or the format
    /// is unsupported
    fn decode(&self, bytes: &[u8], path: &Path) -> Result<DecodedAudio, LoadError>;

    /// Check if the decoder recognizes the given file extension
    fn supports_format(&self, path: &Path) -> bool;
}

/// Fire-and-forget sink for "track played" notifications.
///
/// Consumed externally for recents tracking; the playback core reports each
/// track at most once per load attempt.
pub trait PlayedObserver: Send + Sync {
    /// Called when playback of a track has started
    fn track_played(&self, track_id: &TrackId);
}
