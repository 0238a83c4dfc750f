//! Playback tracker - core orchestration
//!
//! Maps each sound id to its runtime resources (decoded sound, mixing channel,
//! volume control, sync task) and drives the backend through
//! start / toggle / stop / stop-all / shutdown.
//!
//! All state sits behind one mutex so UI callbacks and sync tasks may run on any
//! thread. The lock is never held across an await point.

use crate::backend::AudioBackend;
use crate::error::{BackendError, Result, SoundboardError};
use crate::events::{EventBus, SoundboardEvent};
use crate::library::{SoundEntry, SoundLibrary};
use crate::sync;
use crate::types::{ConcurrencyMode, PlaybackState, SoundId, TrackerConfig};
use crate::volume::VolumeControl;
use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Lock tracker state, recovering from a poisoned mutex
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runtime resources of one Playing/Paused sound
pub(crate) struct ActiveSound<B: AudioBackend> {
    pub(crate) sound: B::Sound,
    pub(crate) channel: B::Channel,
    pub(crate) volume: VolumeControl,
    pub(crate) paused: bool,
    pub(crate) looping: bool,
    /// Distinguishes restarts of the same id for stale sync tasks
    pub(crate) session: u64,
    pub(crate) sync: Option<JoinHandle<()>>,
}

/// Everything guarded by the tracker mutex
pub(crate) struct TrackerState<B: AudioBackend> {
    pub(crate) backend: B,
    pub(crate) library: SoundLibrary,
    pub(crate) config: TrackerConfig,
    /// Present iff the sound is Playing or Paused
    pub(crate) active: HashMap<SoundId, ActiveSound<B>>,
    /// Sounds whose load failed; unplayable for the session
    pub(crate) unplayable: HashMap<SoundId, String>,
    pub(crate) next_session: u64,
    pub(crate) shut_down: bool,
}

impl<B: AudioBackend> TrackerState<B> {
    fn state_of(&self, id: &str) -> PlaybackState {
        match self.active.get(id) {
            None => PlaybackState::Stopped,
            Some(active) if active.paused => PlaybackState::Paused,
            Some(_) => PlaybackState::Playing,
        }
    }

    /// Load through the backend, retrying up to `load_attempts` times
    fn load(&mut self, path: &Path) -> std::result::Result<B::Sound, BackendError> {
        let attempts = self.config.load_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.backend.load(path) {
                Ok(sound) => return Ok(sound),
                Err(e) if attempt < attempts => {
                    tracing::debug!(
                        "Load attempt {}/{} for {} failed: {}",
                        attempt,
                        attempts,
                        path.display(),
                        e
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Playback state tracker
///
/// Owns the audio backend and the scanned library. Operations take `&self` so
/// the tracker can be shared with UI callbacks.
pub struct PlaybackTracker<B: AudioBackend> {
    shared: Arc<Mutex<TrackerState<B>>>,
    runtime: Handle,
    events: EventBus,
}

impl<B: AudioBackend> PlaybackTracker<B> {
    /// Create a tracker on the current tokio runtime
    ///
    /// # Returns
    /// * `Ok(tracker)` - Ready, every sound Stopped
    /// * `Err(RuntimeUnavailable)` - Called outside a tokio runtime
    pub fn new(backend: B, library: SoundLibrary, config: TrackerConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| SoundboardError::RuntimeUnavailable)?;
        Ok(Self::with_runtime(backend, library, config, runtime))
    }

    /// Create a tracker whose sync tasks run on `runtime`
    pub fn with_runtime(
        backend: B,
        library: SoundLibrary,
        config: TrackerConfig,
        runtime: Handle,
    ) -> Self {
        let state = TrackerState {
            backend,
            library,
            config,
            active: HashMap::new(),
            unplayable: HashMap::new(),
            next_session: 0,
            shut_down: false,
        };

        Self {
            shared: Arc::new(Mutex::new(state)),
            runtime,
            events: EventBus::new(),
        }
    }

    /// Toggle a sound: Stopped → start, Playing → pause, Paused → resume
    ///
    /// Returns the sound's new state.
    pub fn toggle(&self, id: &str) -> Result<PlaybackState> {
        let mut state = self.lock_running()?;
        let current = state.state_of(id);

        match current {
            PlaybackState::Stopped => self.start_locked(&mut state, id)?,
            PlaybackState::Playing => self.pause_locked(&mut state, id),
            PlaybackState::Paused => self.resume_locked(&mut state, id),
        }

        Ok(state.state_of(id))
    }

    /// Start a sound
    ///
    /// Loads the asset on first use, applies its current volume, takes a channel
    /// and spawns its volume sync task. Starting an active sound does nothing.
    ///
    /// # Returns
    /// * `Err(AssetNotFound)` - Not a scanned asset, or its file is gone
    /// * `Err(AudioLoad)` - Backend could not load it (now or earlier this session)
    /// * `Err(NoChannelAvailable)` - Every mixing channel is busy
    pub fn start(&self, id: &str) -> Result<()> {
        let mut state = self.lock_running()?;
        self.start_locked(&mut state, id)
    }

    /// Stop a sound and release its handle and channel
    ///
    /// Stopping a stopped sound is a no-op.
    pub fn stop(&self, id: &str) -> Result<()> {
        let mut state = self.lock_running()?;
        self.stop_locked(&mut state, id);
        Ok(())
    }

    /// Stop every active sound
    pub fn stop_all(&self) -> Result<()> {
        let mut state = self.lock_running()?;
        self.stop_all_locked(&mut state);
        Ok(())
    }

    /// Stop everything and release the backend
    ///
    /// Valid exactly once. Every later operation fails with `ShutDown`.
    pub fn shutdown(&self) -> Result<()> {
        let mut state = self.lock_running()?;

        self.stop_all_locked(&mut state);
        state.backend.shutdown();
        state.shut_down = true;

        tracing::info!("Soundboard shut down");
        Ok(())
    }

    /// Current state of a sound (unknown ids are Stopped)
    pub fn state(&self, id: &str) -> PlaybackState {
        lock(&self.shared).state_of(id)
    }

    /// Ids of all Playing/Paused sounds, sorted
    pub fn active_ids(&self) -> Vec<SoundId> {
        let state = lock(&self.shared);
        let mut ids: Vec<SoundId> = state.active.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Whether a volume sync task is running for `id`
    pub fn is_syncing(&self, id: &str) -> bool {
        lock(&self.shared)
            .active
            .get(id)
            .and_then(|active| active.sync.as_ref())
            .is_some_and(|task| !task.is_finished())
    }

    /// Scanned sounds, ordered by id
    pub fn sounds(&self) -> Vec<SoundEntry> {
        lock(&self.shared).library.entries().to_vec()
    }

    /// Volume control bound to a sound's slider
    pub fn volume_control(&self, id: &str) -> Option<VolumeControl> {
        lock(&self.shared)
            .library
            .get(id)
            .map(|entry| entry.volume.clone())
    }

    /// Tracker configuration
    pub fn config(&self) -> TrackerConfig {
        lock(&self.shared).config.clone()
    }

    /// Whether `shutdown` has run
    pub fn is_shut_down(&self) -> bool {
        lock(&self.shared).shut_down
    }

    /// Receive state-change and error events
    ///
    /// All receivers share one queue: each event goes to one receiver.
    pub fn subscribe(&self) -> Receiver<SoundboardEvent> {
        self.events.subscribe()
    }

    /// Run `f` with the backend (inspection in tests and diagnostics)
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&lock(&self.shared).backend)
    }

    fn lock_running(&self) -> Result<MutexGuard<'_, TrackerState<B>>> {
        let state = lock(&self.shared);
        if state.shut_down {
            return Err(SoundboardError::ShutDown);
        }
        Ok(state)
    }

    fn start_locked(&self, state: &mut TrackerState<B>, id: &str) -> Result<()> {
        let entry = state.library.resolve(id)?;
        let path = entry.path.clone();
        let volume = entry.volume.clone();

        if state.active.contains_key(id) {
            tracing::debug!("{} already active, start ignored", id);
            return Ok(());
        }

        if state.config.mode == ConcurrencyMode::SingleSlot {
            let others: Vec<SoundId> = state.active.keys().cloned().collect();
            for other in others {
                self.stop_locked(state, &other);
            }
        }

        if let Some(reason) = state.unplayable.get(id) {
            return Err(SoundboardError::AudioLoad {
                id: id.to_string(),
                reason: reason.clone(),
            });
        }

        let sound = match state.load(&path) {
            Ok(sound) => sound,
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!("Failed to load {}: {}", id, reason);
                state.unplayable.insert(id.to_string(), reason.clone());
                self.events.error(id, format!("Failed to load: {}", reason));
                return Err(SoundboardError::AudioLoad {
                    id: id.to_string(),
                    reason,
                });
            }
        };

        let Some(channel) = state.backend.acquire_channel() else {
            tracing::warn!("No free channel for {}, not starting", id);
            self.events.error(id, "No free channel");
            return Err(SoundboardError::NoChannelAvailable(id.to_string()));
        };

        let looping = !state.config.is_one_shot(id);
        state.backend.set_volume(&channel, volume.get());
        state.backend.play(&channel, &sound, looping);

        state.next_session += 1;
        let session = state.next_session;
        let sync = sync::spawn(
            &self.runtime,
            Arc::downgrade(&self.shared),
            id.to_string(),
            session,
            state.config.volume_poll_interval,
            self.events.clone(),
        );

        state.active.insert(
            id.to_string(),
            ActiveSound {
                sound,
                channel,
                volume,
                paused: false,
                looping,
                session,
                sync: Some(sync),
            },
        );

        tracing::debug!("Started {} (looping: {})", id, looping);
        self.events.state_changed(id, PlaybackState::Playing);
        Ok(())
    }

    fn pause_locked(&self, state: &mut TrackerState<B>, id: &str) {
        let Some(active) = state.active.get_mut(id) else {
            return;
        };

        state.backend.pause(&active.channel);
        active.paused = true;

        tracing::debug!("Paused {}", id);
        self.events.state_changed(id, PlaybackState::Paused);
    }

    fn resume_locked(&self, state: &mut TrackerState<B>, id: &str) {
        let Some(active) = state.active.get_mut(id) else {
            return;
        };

        state.backend.resume(&active.channel);
        active.paused = false;

        tracing::debug!("Resumed {}", id);
        self.events.state_changed(id, PlaybackState::Playing);
    }

    /// Returns whether `id` was active
    fn stop_locked(&self, state: &mut TrackerState<B>, id: &str) -> bool {
        let Some(active) = state.active.remove(id) else {
            return false;
        };

        if let Some(sync) = active.sync {
            sync.abort();
        }
        state.backend.stop(active.channel);

        tracing::debug!("Stopped {}", id);
        self.events.state_changed(id, PlaybackState::Stopped);
        true
    }

    fn stop_all_locked(&self, state: &mut TrackerState<B>) {
        let ids: Vec<SoundId> = state.active.keys().cloned().collect();
        for id in ids {
            self.stop_locked(state, &id);
        }
    }
}
