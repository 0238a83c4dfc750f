//! Desktop audio backend for the soundboard using CPAL
//!
//! This crate provides [`CpalBackend`], the desktop implementation of the
//! [`soundboard_playback::AudioBackend`] trait.
//!
//! # Features
//!
//! - Cross-platform audio output using CPAL
//! - Whole-file decoding with Symphonia (WAV, MP3, OGG and more)
//! - Automatic sample rate conversion
//! - Fixed pool of mixer lanes with per-lane volume
//!
//! # Example
//!
//! ```no_run
//! use soundboard_audio_desktop::{CpalBackend, DesktopConfig};
//! use soundboard_playback::{PlaybackTracker, ScanOptions, SoundLibrary, TrackerConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = CpalBackend::new(&DesktopConfig::default())?;
//! let library = SoundLibrary::scan("SFX", &ScanOptions::default())?;
//! let tracker = PlaybackTracker::new(backend, library, TrackerConfig::default())?;
//!
//! tracker.toggle("rain.ogg")?;
//! tracker.shutdown()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod backend;
pub mod decoder;
mod error;
pub mod mixer;

pub use backend::{CpalBackend, DesktopConfig};
pub use decoder::{decode_file, DecodedSound};
pub use error::{AudioError, Result};
pub use mixer::{Mixer, MixerChannel};
