//! Platform-agnostic audio backend trait
//!
//! Abstracts decoding and mixing for different platforms. The tracker only ever
//! talks to the backend through this trait, which keeps it testable without an
//! audio device.

use crate::error::BackendError;
use std::path::Path;

/// Audio backend: decode + mix
///
/// A `Sound` is a loaded, decodable asset. A `Channel` is one mixing lane; the
/// tracker binds at most one sound to a channel and hands the channel back via
/// [`AudioBackend::stop`] when done. Backends with a bounded pool return `None`
/// from [`AudioBackend::acquire_channel`] when every lane is taken; unbounded
/// backends always return a channel.
pub trait AudioBackend: Send + 'static {
    /// Decoded sound owned by the tracker
    type Sound: Send + 'static;

    /// Mixing lane owned by the tracker while a sound is active
    type Channel: Send + 'static;

    /// Decode/load the asset at `path`
    fn load(&mut self, path: &Path) -> Result<Self::Sound, BackendError>;

    /// Take a free mixing lane
    fn acquire_channel(&mut self) -> Option<Self::Channel>;

    /// Start `sound` on `channel` from the beginning
    ///
    /// With `looping` the sound repeats until stopped; otherwise it plays once and
    /// the channel reports [`AudioBackend::is_finished`].
    fn play(&mut self, channel: &Self::Channel, sound: &Self::Sound, looping: bool);

    /// Pause the channel, keeping its position
    fn pause(&mut self, channel: &Self::Channel);

    /// Resume a paused channel
    fn resume(&mut self, channel: &Self::Channel);

    /// Stop the channel and return it to the pool
    fn stop(&mut self, channel: Self::Channel);

    /// Apply a linear volume level (0.0-1.0)
    fn set_volume(&mut self, channel: &Self::Channel, level: f32);

    /// Whether a one-shot sound on this channel has played to the end
    fn is_finished(&self, channel: &Self::Channel) -> bool;

    /// Release global backend resources (output device, mixer)
    fn shutdown(&mut self);
}
