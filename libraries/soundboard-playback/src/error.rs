//! Error types for playback state tracking

use std::path::PathBuf;
use thiserror::Error;

/// Soundboard errors
#[derive(Debug, Error)]
pub enum SoundboardError {
    /// Sound directory could not be read
    #[error("Failed to scan sound directory {}: {reason}", .path.display())]
    DirectoryScan { path: PathBuf, reason: String },

    /// Sound id does not name a scanned asset (or the file is gone)
    #[error("Sound not found: {0}")]
    AssetNotFound(String),

    /// Backend failed to decode/load a sound
    #[error("Failed to load {id}: {reason}")]
    AudioLoad { id: String, reason: String },

    /// Every mixing channel is in use
    #[error("No free channel to play {0}")]
    NoChannelAvailable(String),

    /// Tracker was shut down
    #[error("Soundboard has been shut down")]
    ShutDown,

    /// Tracker was created outside a tokio runtime
    #[error("No tokio runtime available for the volume sync loop")]
    RuntimeUnavailable,
}

/// Errors reported by an audio backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Decoding failed
    #[error("Decode error: {0}")]
    Decode(String),

    /// Output device error
    #[error("Output error: {0}")]
    Output(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for soundboard operations
pub type Result<T> = std::result::Result<T, SoundboardError>;
