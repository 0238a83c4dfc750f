//! Soundboard Events
//!
//! One-way notifications for UI synchronization. Emitted on every playback
//! state transition and on per-sound failures. Delivery is fire-and-forget:
//! when the subscriber falls behind, events are dropped rather than blocking
//! the tracker.

use crate::types::{PlaybackState, SoundId};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// Capacity of the event channel
const EVENT_CAPACITY: usize = 64;

/// Events emitted by the playback tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SoundboardEvent {
    /// A sound changed state (button should re-render)
    StateChanged {
        /// Sound that changed
        id: SoundId,
        /// The new playback state
        state: PlaybackState,
    },

    /// A per-sound operation failed
    Error {
        /// Sound the failure belongs to
        id: SoundId,
        /// Error message
        message: String,
    },
}

/// Visual state of a sound's button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonStyle {
    /// Default button color
    Default,
    /// Highlight color (sound is playing)
    Highlighted,
}

impl From<PlaybackState> for ButtonStyle {
    fn from(state: PlaybackState) -> Self {
        match state {
            PlaybackState::Playing => ButtonStyle::Highlighted,
            PlaybackState::Paused | PlaybackState::Stopped => ButtonStyle::Default,
        }
    }
}

/// Bounded broadcast point for tracker events
#[derive(Debug, Clone)]
pub(crate) struct EventBus {
    tx: Sender<SoundboardEvent>,
    rx: Receiver<SoundboardEvent>,
}

impl EventBus {
    pub(crate) fn new() -> Self {
        let (tx, rx) = bounded(EVENT_CAPACITY);
        Self { tx, rx }
    }

    /// Receiver handle; all handles share one queue
    pub(crate) fn subscribe(&self) -> Receiver<SoundboardEvent> {
        self.rx.clone()
    }

    pub(crate) fn state_changed(&self, id: &str, state: PlaybackState) {
        self.emit(SoundboardEvent::StateChanged {
            id: id.to_string(),
            state,
        });
    }

    pub(crate) fn error(&self, id: &str, message: impl Into<String>) {
        self.emit(SoundboardEvent::Error {
            id: id.to_string(),
            message: message.into(),
        });
    }

    fn emit(&self, event: SoundboardEvent) {
        if let Err(TrySendError::Full(event)) = self.tx.try_send(event) {
            tracing::debug!("Event channel full, dropping {:?}", event);
        }
    }
}
