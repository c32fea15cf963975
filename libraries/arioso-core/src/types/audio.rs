//! Decoded audio buffer type

use std::sync::Arc;
use std::time::Duration;

/// A fully decoded track, ready for an output backend.
///
/// Samples are interleaved stereo f32 in `[-1.0, 1.0]`. The sample buffer
/// is shared behind an [`Arc`] so cloning a `DecodedAudio` (for pause/resume
/// or repeat-one restarts) never copies audio data.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples: `[L, R, L, R, ...]`
    pub samples: Arc<Vec<f32>>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels (always 2 after decoding)
    pub channels: u16,

    /// Total playable duration, derived from the sample count
    pub duration: Duration,
}

impl DecodedAudio {
    /// Create a decoded buffer, deriving the duration from the sample count
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        let frames = if channels == 0 {
            0
        } else {
            samples.len() / channels as usize
        };
        let duration = if sample_rate == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(frames as f64 / f64::from(sample_rate))
        };
        Self {
            samples: Arc::new(samples),
            sample_rate,
            channels,
            duration,
        }
    }

    /// Number of audio frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }

    /// Convert a position to an interleaved sample index, clamped to the
    /// end of the buffer and aligned to a frame boundary.
    pub fn sample_index_at(&self, position: Duration) -> usize {
        let frame = (position.as_secs_f64() * f64::from(self.sample_rate)) as usize;
        frame.min(self.frame_count()) * self.channels as usize
    }
}
