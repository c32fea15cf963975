//! Symphonia-based whole-track decoder
//!
//! Decodes an entire track from an in-memory byte buffer into interleaved
//! stereo f32. All sample formats go through one generic interleaving
//! helper with a per-format normalization function:
//!
//! - Float formats pass through (F32) or cast (F64)
//! - Signed integers divide by their MAX value
//! - Unsigned integers normalize to `[0, 1]` then scale to `[-1, 1]`
//! - 24-bit types extract `.inner()` before normalizing
//!
//! Mono input is duplicated to stereo; channels beyond the first two are
//! dropped.

use arioso_core::{AudioDecoder, DecodedAudio, LoadError};
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// File extensions the decoder will attempt
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "wav", "ogg", "oga", "m4a", "mp4", "aac",
];

/// Whole-track decoder backed by Symphonia.
///
/// Stateless: each call probes the container, decodes every packet of the
/// default audio track, and returns one contiguous buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a Symphonia decoder
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, bytes: &[u8], path: &Path) -> Result<DecodedAudio, LoadError> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LoadError::decode(path, format!("failed to probe format: {e}")))?;
        let mut format_reader = probed.format;

        let track = format_reader
            .default_track()
            .ok_or_else(|| LoadError::decode(path, "no audio tracks found"))?;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| LoadError::decode(path, format!("failed to create decoder: {e}")))?;

        let mut samples = Vec::new();
        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(LoadError::decode(path, format!("error reading packet: {e}")))
                }
            };
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => samples.extend(convert_to_stereo_f32(&decoded)),
                // Per-packet decode errors are recoverable; skip the packet.
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!(path = %path.display(), error = %e, "skipping undecodable packet");
                }
                Err(e) => return Err(LoadError::decode(path, format!("decode error: {e}"))),
            }
        }

        if samples.is_empty() {
            return Err(LoadError::decode(path, "no audio frames decoded"));
        }

        let audio = DecodedAudio::new(samples, sample_rate, 2);
        debug!(
            path = %path.display(),
            sample_rate,
            frames = audio.frame_count(),
            duration_ms = audio.duration.as_millis() as u64,
            "decoded track"
        );
        Ok(audio)
    }

    fn supports_format(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// Interleave a planar buffer to stereo f32, normalizing each sample.
/// Mono input duplicates the single channel into both outputs.
fn interleave_to_stereo_f32<T, F>(buf: &AudioBuffer<T>, normalize: F) -> Vec<f32>
where
    T: symphonia::core::sample::Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    let mut output = Vec::with_capacity(frames * 2);

    for frame_idx in 0..frames {
        output.push(normalize(buf.chan(0)[frame_idx]));
        if channels > 1 {
            output.push(normalize(buf.chan(1)[frame_idx]));
        } else {
            output.push(normalize(buf.chan(0)[frame_idx]));
        }
    }

    output
}

/// Convert any Symphonia buffer variant to interleaved stereo f32 in
/// `[-1.0, 1.0]`
fn convert_to_stereo_f32(decoded: &AudioBufferRef) -> Vec<f32> {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_to_stereo_f32(buf, |s| s),
        AudioBufferRef::F64(buf) => interleave_to_stereo_f32(buf, |s| s as f32),

        AudioBufferRef::S8(buf) => interleave_to_stereo_f32(buf, |s| f32::from(s) / f32::from(i8::MAX)),
        AudioBufferRef::S16(buf) => {
            interleave_to_stereo_f32(buf, |s| f32::from(s) / f32::from(i16::MAX))
        }
        AudioBufferRef::S24(buf) => {
            interleave_to_stereo_f32(buf, |s| s.inner() as f32 / 8_388_607.0)
        }
        AudioBufferRef::S32(buf) => {
            interleave_to_stereo_f32(buf, |s| s as f32 / i32::MAX as f32)
        }

        AudioBufferRef::U8(buf) => {
            interleave_to_stereo_f32(buf, |s| (f32::from(s) / f32::from(u8::MAX)) * 2.0 - 1.0)
        }
        AudioBufferRef::U16(buf) => {
            interleave_to_stereo_f32(buf, |s| (f32::from(s) / f32::from(u16::MAX)) * 2.0 - 1.0)
        }
        AudioBufferRef::U24(buf) => {
            interleave_to_stereo_f32(buf, |s| (s.inner() as f32 / 8_388_607.0) * 2.0 - 1.0)
        }
        AudioBufferRef::U32(buf) => {
            interleave_to_stereo_f32(buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Build a 16-bit PCM WAV file in memory
    fn wav_bytes(sample_rate: u32, channels: u16, num_frames: usize) -> Vec<u8> {
        let data_len = num_frames * channels as usize * 2;
        let mut bytes = Vec::with_capacity(44 + data_len);

        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");

        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channels.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * u32::from(channels) * 2).to_le_bytes());
        bytes.extend_from_slice(&(channels * 2).to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());

        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(data_len as u32).to_le_bytes());
        for _ in 0..num_frames * channels as usize {
            bytes.extend_from_slice(&0i16.to_le_bytes());
        }

        bytes
    }

    #[test]
    fn decodes_a_stereo_wav() {
        let bytes = wav_bytes(44_100, 2, 44_100);
        let audio = SymphoniaDecoder::new()
            .decode(&bytes, Path::new("test.wav"))
            .expect("decode wav");

        assert_eq!(audio.sample_rate, 44_100);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frame_count(), 44_100);
        assert_eq!(audio.duration, Duration::from_secs(1));
    }

    #[test]
    fn mono_wav_is_duplicated_to_stereo() {
        let bytes = wav_bytes(22_050, 1, 22_050);
        let audio = SymphoniaDecoder::new()
            .decode(&bytes, Path::new("mono.wav"))
            .expect("decode mono wav");

        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frame_count(), 22_050);
        assert_eq!(audio.duration, Duration::from_secs(1));
    }

    #[test]
    fn garbage_bytes_fail_with_a_decode_error() {
        let err = SymphoniaDecoder::new()
            .decode(&[0xDE, 0xAD, 0xBE, 0xEF], Path::new("bad.mp3"))
            .expect_err("garbage should not decode");
        assert!(matches!(err, LoadError::Decode { .. }));
        assert!(err.to_string().contains("bad.mp3"));
    }

    #[test]
    fn supports_known_extensions_case_insensitively() {
        let decoder = SymphoniaDecoder::new();
        assert!(decoder.supports_format(Path::new("a.flac")));
        assert!(decoder.supports_format(Path::new("a.MP3")));
        assert!(!decoder.supports_format(Path::new("a.txt")));
        assert!(!decoder.supports_format(Path::new("noext")));
    }
}
