//! Error types for track loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while turning a track reference into decoded audio.
///
/// Both variants carry the offending path so the failure can be surfaced
/// to the user without further context.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The audio file could not be read (missing, unreadable, ...)
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path of the file that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The audio data could not be decoded (corrupt or unsupported format)
    #[error("failed to decode {path}: {reason}")]
    Decode {
        /// Path of the file that could not be decoded
        path: PathBuf,
        /// Decoder-specific failure description
        reason: String,
    },
}

impl LoadError {
    /// Create an I/O load error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a decode load error
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Path of the file the load failed on
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Decode { path, .. } => path,
        }
    }
}
