//! CPAL output backend
//!
//! Each playback unit is its own CPAL stream over the default output
//! device. The callback walks the decoded stereo buffer at a fractional
//! step (source rate / device rate, linear interpolation between frames),
//! applies the current volume, and fires the completion handle once when
//! the cursor passes the end of the buffer. Dropping the stream stops the
//! unit; the completion handle is taken on stop so a torn-down unit can
//! never report a natural end.

use crate::error::{AudioError, Result};
use arioso_core::DecodedAudio;
use arioso_playback::output::{AudioOutput, OutputUnit, UnitCompletion};
use arioso_playback::PlaybackError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error};

/// Output backend producing one CPAL stream per playback unit.
///
/// The device is resolved lazily on each [`begin`](AudioOutput::begin), so
/// a device that appears after startup (or changes) is picked up on the
/// next track.
#[derive(Debug, Default)]
pub struct CpalOutput;

impl CpalOutput {
    /// Create a CPAL output backend
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn begin_stream(
        &self,
        audio: &DecodedAudio,
        offset: Duration,
        volume: f32,
        completion: UnitCompletion,
    ) -> Result<CpalUnit> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;
        let config: StreamConfig = device.default_output_config()?.into();
        let device_rate = config.sample_rate;
        let device_channels = config.channels.max(1) as usize;

        let volume_bits = Arc::new(AtomicU32::new(volume.to_bits()));
        let completion = Arc::new(Mutex::new(Some(completion)));

        let samples = Arc::clone(&audio.samples);
        let source_channels = usize::from(audio.channels.max(1));
        let total_frames = audio.frame_count();
        let step = f64::from(audio.sample_rate) / f64::from(device_rate);
        let mut cursor = audio.sample_index_at(offset) as f64 / source_channels as f64;

        debug!(
            device_rate,
            device_channels,
            source_rate = audio.sample_rate,
            offset_ms = offset.as_millis() as u64,
            "starting output stream"
        );

        let cb_volume = Arc::clone(&volume_bits);
        let cb_completion = Arc::clone(&completion);
        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let gain = f32::from_bits(cb_volume.load(Ordering::Relaxed));
                for frame in data.chunks_mut(device_channels) {
                    let frame_idx = cursor as usize;
                    if frame_idx >= total_frames {
                        frame.fill(0.0);
                        if let Ok(mut slot) = cb_completion.lock() {
                            if let Some(handle) = slot.take() {
                                handle.finished();
                            }
                        }
                        continue;
                    }

                    let (left, right) = interpolated_frame(
                        &samples,
                        cursor,
                        total_frames,
                        source_channels,
                    );
                    write_frame(frame, left * gain, right * gain);
                    cursor += step;
                }
            },
            |err| error!(error = %err, "audio stream error"),
            None,
        )?;
        stream.play()?;

        Ok(CpalUnit {
            _stream: stream,
            volume: volume_bits,
            completion,
        })
    }
}

impl AudioOutput for CpalOutput {
    fn begin(
        &mut self,
        audio: DecodedAudio,
        offset: Duration,
        volume: f32,
        completion: UnitCompletion,
    ) -> arioso_playback::Result<Box<dyn OutputUnit>> {
        match self.begin_stream(&audio, offset, volume, completion) {
            Ok(unit) => Ok(Box::new(unit)),
            Err(err) => Err(PlaybackError::Output(err.to_string())),
        }
    }
}

/// A live CPAL stream playing one decoded buffer
struct CpalUnit {
    _stream: Stream,
    volume: Arc<AtomicU32>,
    completion: Arc<Mutex<Option<UnitCompletion>>>,
}

impl OutputUnit for CpalUnit {
    fn set_volume(&mut self, volume: f32) {
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn stop(self: Box<Self>) {
        // Disarm the completion before the stream is dropped: a torn-down
        // unit must never look like a natural end.
        if let Ok(mut slot) = self.completion.lock() {
            slot.take();
        }
    }
}

/// Read the stereo frame at a fractional cursor position, linearly
/// interpolating with the following frame
fn interpolated_frame(
    samples: &[f32],
    cursor: f64,
    total_frames: usize,
    source_channels: usize,
) -> (f32, f32) {
    let frame_idx = cursor as usize;
    let frac = (cursor - frame_idx as f64) as f32;
    let next_idx = (frame_idx + 1).min(total_frames.saturating_sub(1));

    let sample = |frame: usize, channel: usize| -> f32 {
        samples
            .get(frame * source_channels + channel.min(source_channels - 1))
            .copied()
            .unwrap_or(0.0)
    };

    let left = sample(frame_idx, 0) * (1.0 - frac) + sample(next_idx, 0) * frac;
    let right = sample(frame_idx, 1) * (1.0 - frac) + sample(next_idx, 1) * frac;
    (left, right)
}

/// Write a stereo sample pair into a device frame of any channel count
fn write_frame(frame: &mut [f32], left: f32, right: f32) {
    match frame.len() {
        0 => {}
        1 => frame[0] = (left + right) * 0.5,
        _ => {
            frame[0] = left;
            frame[1] = right;
            for extra in &mut frame[2..] {
                *extra = 0.0;
            }
        }
    }
}
