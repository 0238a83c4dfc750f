//! Fixed-size voice mixer
//!
//! The mixer owns a pool of lanes. Each lane plays at most one decoded sound
//! with its own gain. The output callback sums every playing lane into the
//! device buffer; lanes are handed out and returned by the backend.

use crate::decoder::{DecodedSound, OUTPUT_CHANNELS};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default number of lanes (simultaneous sounds)
pub const DEFAULT_LANES: usize = 8;

/// Handle to one mixer lane
///
/// Not `Clone`: exactly one owner may hold a lane until it is released.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct MixerChannel {
    lane: usize,
}

impl MixerChannel {
    pub fn lane(&self) -> usize {
        self.lane
    }
}

#[derive(Debug)]
struct Voice {
    sound: Arc<DecodedSound>,
    /// Next frame to read
    position: usize,
    looping: bool,
    paused: bool,
    finished: bool,
}

#[derive(Debug)]
struct Lane {
    in_use: bool,
    gain: f32,
    voice: Option<Voice>,
}

impl Lane {
    fn idle() -> Self {
        Self {
            in_use: false,
            gain: 1.0,
            voice: None,
        }
    }
}

/// Mixer shared between the backend and the output callback
#[derive(Debug)]
pub struct Mixer {
    lanes: Mutex<Vec<Lane>>,
}

impl Mixer {
    pub fn new(lane_count: usize) -> Self {
        Self {
            lanes: Mutex::new((0..lane_count).map(|_| Lane::idle()).collect()),
        }
    }

    fn lanes(&self) -> MutexGuard<'_, Vec<Lane>> {
        self.lanes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub fn lane_count(&self) -> usize {
        self.lanes().len()
    }

    /// Reserve a free lane, `None` when all lanes are taken
    pub fn acquire(&self) -> Option<MixerChannel> {
        let mut lanes = self.lanes();
        let index = lanes.iter().position(|lane| !lane.in_use)?;
        let lane = &mut lanes[index];
        lane.in_use = true;
        lane.gain = 1.0;
        lane.voice = None;
        Some(MixerChannel { lane: index })
    }

    /// Silence a lane and return it to the pool
    pub fn release(&self, channel: MixerChannel) {
        if let Some(lane) = self.lanes().get_mut(channel.lane) {
            *lane = Lane::idle();
        }
    }

    /// Start `sound` from the beginning on `channel`
    pub fn start(&self, channel: &MixerChannel, sound: Arc<DecodedSound>, looping: bool) {
        if let Some(lane) = self.lanes().get_mut(channel.lane) {
            lane.voice = Some(Voice {
                sound,
                position: 0,
                looping,
                paused: false,
                finished: false,
            });
        }
    }

    fn with_voice(&self, channel: &MixerChannel, f: impl FnOnce(&mut Voice)) {
        if let Some(voice) = self
            .lanes()
            .get_mut(channel.lane)
            .and_then(|lane| lane.voice.as_mut())
        {
            f(voice);
        }
    }

    pub fn pause(&self, channel: &MixerChannel) {
        self.with_voice(channel, |voice| voice.paused = true);
    }

    pub fn resume(&self, channel: &MixerChannel) {
        self.with_voice(channel, |voice| voice.paused = false);
    }

    pub fn set_gain(&self, channel: &MixerChannel, gain: f32) {
        if let Some(lane) = self.lanes().get_mut(channel.lane) {
            lane.gain = gain.clamp(0.0, 1.0);
        }
    }

    pub fn gain(&self, channel: &MixerChannel) -> f32 {
        self.lanes().get(channel.lane).map_or(0.0, |lane| lane.gain)
    }

    /// Whether a non-looping voice has played to its end
    ///
    /// A lane with nothing started counts as finished.
    pub fn is_finished(&self, channel: &MixerChannel) -> bool {
        match self.lanes().get(channel.lane).and_then(|lane| lane.voice.as_ref()) {
            Some(voice) => voice.finished,
            None => true,
        }
    }

    /// Number of lanes currently producing sound
    pub fn active_voices(&self) -> usize {
        self.lanes()
            .iter()
            .filter_map(|lane| lane.voice.as_ref())
            .filter(|voice| !voice.paused && !voice.finished)
            .count()
    }

    /// Free every lane
    pub fn clear(&self) {
        for lane in self.lanes().iter_mut() {
            *lane = Lane::idle();
        }
    }

    /// Mix all playing voices into an interleaved device buffer
    ///
    /// Stereo voices are mapped to the first two device channels; a mono
    /// device gets the average of left and right. Extra device channels stay
    /// silent.
    pub fn mix(&self, output: &mut [f32], device_channels: usize) {
        output.fill(0.0);
        if device_channels == 0 {
            return;
        }

        let mut lanes = self.lanes();
        for lane in lanes.iter_mut() {
            let gain = lane.gain;
            let Some(voice) = lane.voice.as_mut() else {
                continue;
            };
            if voice.paused || voice.finished {
                continue;
            }

            let samples = voice.sound.samples();
            let total_frames = samples.len() / OUTPUT_CHANNELS;
            if total_frames == 0 {
                voice.finished = true;
                continue;
            }

            for frame in output.chunks_exact_mut(device_channels) {
                if voice.position >= total_frames {
                    if voice.looping {
                        voice.position = 0;
                    } else {
                        voice.finished = true;
                        break;
                    }
                }

                let base = voice.position * OUTPUT_CHANNELS;
                let left = samples[base] * gain;
                let right = samples[base + 1] * gain;

                if device_channels == 1 {
                    frame[0] += (left + right) * 0.5;
                } else {
                    frame[0] += left;
                    frame[1] += right;
                }

                voice.position += 1;
            }

            // Reached the end exactly on a buffer boundary
            if !voice.looping && voice.position >= total_frames {
                voice.finished = true;
            }
        }

        for sample in output.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new(DEFAULT_LANES)
    }
}
