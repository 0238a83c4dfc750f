//! Volume sync loop
//!
//! One task per active sound. Every poll interval it re-reads the sound's
//! volume control and pushes the level into the live channel. The task is owned
//! by the sound's tracker entry and aborted when the sound stops; it also exits
//! on its own once its entry is gone or belongs to a newer session.
//!
//! The same tick notices one-shot sounds that played to the end and releases
//! them.

use crate::backend::AudioBackend;
use crate::events::EventBus;
use crate::tracker::{lock, TrackerState};
use crate::types::{PlaybackState, SoundId};
use std::sync::{Mutex, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Result of one sync tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    /// Volume applied, keep polling
    Continue,
    /// One-shot sound reached its end and was released
    Finished,
    /// Sound no longer active under this session
    Gone,
}

/// Spawn the sync task for `id`
pub(crate) fn spawn<B: AudioBackend>(
    runtime: &Handle,
    state: Weak<Mutex<TrackerState<B>>>,
    id: SoundId,
    session: u64,
    interval: Duration,
    events: EventBus,
) -> JoinHandle<()> {
    runtime.spawn(run(state, id, session, interval, events))
}

async fn run<B: AudioBackend>(
    state: Weak<Mutex<TrackerState<B>>>,
    id: SoundId,
    session: u64,
    interval: Duration,
    events: EventBus,
) {
    // Initial volume is applied by start(); first poll is one interval later
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let Some(shared) = state.upgrade() else {
            break;
        };

        let tick = lock(&shared).sync_tick(&id, session, &events);

        match tick {
            Tick::Continue => {}
            Tick::Finished => {
                tracing::debug!("{} finished playing", id);
                break;
            }
            Tick::Gone => break,
        }
    }
}

impl<B: AudioBackend> TrackerState<B> {
    /// Apply the current volume to `id` and check for one-shot completion
    ///
    /// A finished one-shot is released and its Stopped event published while
    /// the caller still holds the lock.
    pub(crate) fn sync_tick(&mut self, id: &str, session: u64, events: &EventBus) -> Tick {
        let Some(active) = self.active.get(id) else {
            return Tick::Gone;
        };

        if active.session != session {
            return Tick::Gone;
        }

        self.backend.set_volume(&active.channel, active.volume.get());

        if active.looping || active.paused || !self.backend.is_finished(&active.channel) {
            return Tick::Continue;
        }

        // Dropping our own JoinHandle detaches it; the task returns right after
        if let Some(active) = self.active.remove(id) {
            self.backend.stop(active.channel);
        }
        events.state_changed(id, PlaybackState::Stopped);

        Tick::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::NullBackend;
    use crate::tracker::ActiveSound;
    use crate::types::TrackerConfig;
    use crate::volume::VolumeControl;
    use crate::{SoundLibrary, SoundboardEvent};
    use std::collections::HashMap;

    fn state_with_one_shot(backend: NullBackend) -> TrackerState<NullBackend> {
        let mut active = HashMap::new();
        active.insert(
            "sfxhorn.wav".to_string(),
            ActiveSound {
                sound: (),
                channel: 0,
                volume: VolumeControl::new(0.3),
                paused: false,
                looping: false,
                session: 1,
                sync: None,
            },
        );

        TrackerState {
            backend,
            library: SoundLibrary::empty("SFX"),
            config: TrackerConfig::default(),
            active,
            unplayable: HashMap::new(),
            next_session: 1,
            shut_down: false,
        }
    }

    #[test]
    fn finished_tick_publishes_stopped_before_returning() {
        let events = EventBus::new();
        let rx = events.subscribe();
        let mut state = state_with_one_shot(NullBackend::finished());

        let tick = state.sync_tick("sfxhorn.wav", 1, &events);

        assert_eq!(tick, Tick::Finished);
        assert!(state.active.is_empty());
        assert_eq!(
            rx.try_recv().unwrap(),
            SoundboardEvent::StateChanged {
                id: "sfxhorn.wav".to_string(),
                state: PlaybackState::Stopped,
            }
        );
    }

    #[test]
    fn running_tick_applies_volume_without_events() {
        let events = EventBus::new();
        let rx = events.subscribe();
        let backend = NullBackend::default();
        let volumes = backend.volumes.clone();
        let mut state = state_with_one_shot(backend);

        assert_eq!(state.sync_tick("sfxhorn.wav", 1, &events), Tick::Continue);
        assert_eq!(*volumes.lock().unwrap(), vec![0.3]);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stale_session_is_gone() {
        let events = EventBus::new();
        let mut state = state_with_one_shot(NullBackend::finished());

        assert_eq!(state.sync_tick("sfxhorn.wav", 0, &events), Tick::Gone);
        assert_eq!(state.sync_tick("beep.wav", 1, &events), Tick::Gone);
        assert_eq!(state.active.len(), 1);
    }
}
