//! Whole-file decoding with Symphonia
//!
//! Soundboard assets are short, so each one is decoded up front into an
//! interleaved stereo f32 buffer at the output device's sample rate. Playback
//! then only copies samples.
//!
//! ## Conversion
//!
//! - **Sample types**: all Symphonia formats (F32, F64, S8-S32, U8-U32) are
//!   normalized to [-1.0, 1.0]
//! - **Channel layouts**: mono is duplicated to stereo, extra channels dropped
//! - **Sample rate**: resampled with rubato when the file's rate differs from
//!   the target

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Channels in every decoded buffer
pub const OUTPUT_CHANNELS: usize = 2;

/// Decoded sound: interleaved stereo f32 at a fixed sample rate
#[derive(Debug, Clone)]
pub struct DecodedSound {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl DecodedSound {
    /// Wrap interleaved stereo samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Interleaved stereo samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of stereo frames
    pub fn frames(&self) -> usize {
        self.samples.len() / OUTPUT_CHANNELS
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate.max(1) as f64)
    }
}

/// Decode a whole file into stereo f32 at `target_sample_rate`
///
/// # Returns
/// * `Ok(sound)` - Fully decoded, resampled if needed
/// * `Err(_)` - File missing, unsupported, corrupt, or empty
pub fn decode_file(path: &Path, target_sample_rate: u32) -> Result<DecodedSound> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Hint for format detection
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format_reader = probed.format;

    let track = format_reader
        .default_track()
        .ok_or_else(|| AudioError::DecodeError("No audio tracks found".into()))?;
    let track_id = track.id;
    let source_sample_rate = track.codec_params.sample_rate.unwrap_or(44100);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();

    loop {
        let packet = match format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        // Skip packets from other tracks
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => samples.extend(convert_to_stereo_f32(decoded)),
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!("Skipping corrupt packet in {}: {}", path.display(), e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    if samples.is_empty() {
        return Err(AudioError::DecodeError(format!(
            "No audio frames in {}",
            path.display()
        )));
    }

    let samples = if source_sample_rate == target_sample_rate {
        samples
    } else {
        tracing::debug!(
            "Resampling {} from {} Hz to {} Hz",
            path.display(),
            source_sample_rate,
            target_sample_rate
        );
        resample_stereo(&samples, source_sample_rate, target_sample_rate)?
    };

    Ok(DecodedSound::new(samples, target_sample_rate))
}

/// Resample interleaved stereo samples in one pass
pub fn resample_stereo(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    let frames = samples.len() / OUTPUT_CHANNELS;
    if frames == 0 {
        return Ok(Vec::new());
    }

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        target_rate as f64 / source_rate as f64,
        2.0,
        params,
        frames,
        OUTPUT_CHANNELS,
    )
    .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    // Deinterleave for rubato
    let mut deinterleaved = vec![Vec::with_capacity(frames); OUTPUT_CHANNELS];
    for frame in samples.chunks_exact(OUTPUT_CHANNELS) {
        for (channel, sample) in deinterleaved.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }

    let mut resampled = resampler
        .process(&deinterleaved, None)
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

    // The sinc filter delays its output; drain it with silence so the tail
    // is not cut, then skip the delay so playback starts on the first sample
    let delay = resampler.output_delay();
    let output_frames = (frames as f64 * target_rate as f64 / source_rate as f64).round() as usize;
    while resampled[0].len() < delay + output_frames {
        let flushed = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| AudioError::ResampleError(e.to_string()))?;
        if flushed[0].is_empty() {
            break;
        }
        for (channel, tail) in resampled.iter_mut().zip(flushed) {
            channel.extend(tail);
        }
    }

    let end = resampled[0].len().min(delay + output_frames);
    let mut interleaved = Vec::with_capacity(end.saturating_sub(delay) * OUTPUT_CHANNELS);
    for frame_idx in delay..end {
        for channel_data in &resampled {
            interleaved.push(channel_data[frame_idx]);
        }
    }

    Ok(interleaved)
}

/// Interleave a planar Symphonia buffer to stereo f32
///
/// Mono is duplicated to both channels; channels beyond the second are dropped.
fn interleave_to_stereo_f32<T, F>(
    buf: &symphonia::core::audio::AudioBuffer<T>,
    normalize: F,
) -> Vec<f32>
where
    T: symphonia::core::sample::Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    let mut output = Vec::with_capacity(frames * OUTPUT_CHANNELS);

    let left = buf.chan(0);
    let right = if channels > 1 { buf.chan(1) } else { left };

    for frame_idx in 0..frames {
        output.push(normalize(left[frame_idx]));
        output.push(normalize(right[frame_idx]));
    }

    output
}

/// Convert any Symphonia sample format to interleaved stereo f32
fn convert_to_stereo_f32(decoded: AudioBufferRef) -> Vec<f32> {
    match decoded {
        // Float formats - already normalized
        AudioBufferRef::F32(buf) => interleave_to_stereo_f32(&buf, |s| s),
        AudioBufferRef::F64(buf) => interleave_to_stereo_f32(&buf, |s| s as f32),

        // Signed integer formats - divide by MAX
        AudioBufferRef::S8(buf) => interleave_to_stereo_f32(&buf, |s| s as f32 / i8::MAX as f32),
        AudioBufferRef::S16(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / i16::MAX as f32)
        }
        AudioBufferRef::S24(buf) => {
            interleave_to_stereo_f32(&buf, |s| s.inner() as f32 / 8388607.0)
        }
        AudioBufferRef::S32(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / i32::MAX as f32)
        }

        // Unsigned integer formats - normalize and center around 0
        AudioBufferRef::U8(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u8::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U16(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U24(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s.inner() as f32 / 16777215.0) * 2.0 - 1.0)
        }
        AudioBufferRef::U32(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_sound_frames_and_duration() {
        let sound = DecodedSound::new(vec![0.0; 48000 * 2], 48000);
        assert_eq!(sound.frames(), 48000);
        assert_eq!(sound.duration(), Duration::from_secs(1));
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample_stereo(&[], 44100, 48000).unwrap().is_empty());
    }

    #[test]
    fn resample_changes_length_by_ratio() {
        let samples = vec![0.25f32; 44100 * 2];
        let resampled = resample_stereo(&samples, 44100, 48000).unwrap();

        assert_eq!(resampled.len() % OUTPUT_CHANNELS, 0);
        assert_eq!(resampled.len() / OUTPUT_CHANNELS, 48000);

        let resampled = resample_stereo(&vec![0.25f32; 48000 * 2], 48000, 22050).unwrap();
        assert_eq!(resampled.len() / OUTPUT_CHANNELS, 22050);
    }

    #[test]
    fn resample_keeps_onset_and_tail() {
        let samples = vec![0.25f32; 4410 * 2];
        let resampled = resample_stereo(&samples, 44100, 48000).unwrap();
        let frames = resampled.len() / OUTPUT_CHANNELS;
        assert_eq!(frames, 4800);

        // No filter delay in front of the sound
        assert!(resampled[..20 * OUTPUT_CHANNELS].iter().any(|s| s.abs() > 0.1));

        // Interior sits at the input level, the last frames are not silence
        let middle = frames / 2 * OUTPUT_CHANNELS;
        assert!((resampled[middle] - 0.25).abs() < 0.01);
        assert!(resampled[(frames - 20) * OUTPUT_CHANNELS..]
            .iter()
            .any(|s| s.abs() > 0.1));
    }

    #[test]
    fn resample_single_frame() {
        let resampled = resample_stereo(&[0.5, 0.5], 44100, 88200).unwrap();
        assert_eq!(resampled.len(), 2 * OUTPUT_CHANNELS);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = decode_file(Path::new("/definitely/not/here.wav"), 48000).unwrap_err();
        assert!(matches!(err, AudioError::Io(_)));
    }
}
