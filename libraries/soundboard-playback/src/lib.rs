//! Soundboard - Playback State Tracking
//!
//! Platform-agnostic core of the soundboard.
//!
//! This crate provides:
//! - Sound directory scanning (one asset per file, one volume control per asset)
//! - Playback state tracking (start, pause/resume toggle, stop, stop-all, shutdown)
//! - Volume sync loop (per-sound task polling the volume control every 100ms)
//! - One-shot sounds by name prefix, looping for everything else
//! - Single-slot and concurrent modes
//! - State-change events for UI synchronization
//!
//! # Architecture
//!
//! `soundboard-playback` does no audio I/O itself:
//! - No dependency on CPAL (desktop audio)
//! - No dependency on any UI toolkit
//!
//! Decoding and mixing are provided via the [`AudioBackend`] trait.
//!
//! # Example
//!
//! ```rust,no_run
//! use soundboard_playback::{
//!     AudioBackend, PlaybackTracker, ScanOptions, SoundLibrary, TrackerConfig,
//! };
//!
//! # fn demo<B: AudioBackend>(backend: B) -> soundboard_playback::Result<()> {
//! let library = SoundLibrary::scan("SFX", &ScanOptions::default())?;
//! let tracker = PlaybackTracker::new(backend, library, TrackerConfig::default())?;
//!
//! // Button click
//! tracker.toggle("beep.wav")?;
//!
//! // Slider move (picked up by the sync loop within 100ms)
//! if let Some(volume) = tracker.volume_control("beep.wav") {
//!     volume.set(0.8);
//! }
//!
//! // Window close
//! tracker.shutdown()?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod events;
mod library;
mod sync;
#[cfg(test)]
mod testing;
mod tracker;
pub mod types;
mod volume;

// Public exports
pub use backend::AudioBackend;
pub use error::{BackendError, Result, SoundboardError};
pub use events::{ButtonStyle, SoundboardEvent};
pub use library::{ScanOptions, SoundEntry, SoundLibrary};
pub use tracker::PlaybackTracker;
pub use types::{ConcurrencyMode, PlaybackState, SoundId, TrackerConfig};
pub use volume::{VolumeControl, DEFAULT_VOLUME};
