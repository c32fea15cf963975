/// Audio output errors
use thiserror::Error;

/// Result type for audio backend operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Desktop audio backend errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// No output device available
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuild(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    Play(String),

    /// CPAL error
    #[error("CPAL error: {0}")]
    Cpal(String),
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::StreamBuild(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::Play(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::Cpal(err.to_string())
    }
}
