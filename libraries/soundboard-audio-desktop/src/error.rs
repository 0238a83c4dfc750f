//! Desktop audio errors

use soundboard_playback::BackendError;
use thiserror::Error;

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// Device not found
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// Output thread could not be started or died during setup
    #[error("Output thread error: {0}")]
    OutputThread(String),

    /// Failed to open, probe or decode a file
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Sample rate conversion error
    #[error("Sample rate conversion error: {0}")]
    ResampleError(String),

    /// Invalid configuration
    #[error("Invalid audio configuration: {0}")]
    InvalidConfig(String),

    /// CPAL error
    #[error("CPAL error: {0}")]
    CpalError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::PlayError(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::CpalError(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        AudioError::DecodeError(err.to_string())
    }
}

impl From<AudioError> for BackendError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Io(e) => BackendError::Io(e),
            AudioError::DecodeError(_) | AudioError::ResampleError(_) => {
                BackendError::Decode(err.to_string())
            }
            other => BackendError::Output(other.to_string()),
        }
    }
}
