//! Minimal backend for in-crate unit tests

use crate::backend::AudioBackend;
use crate::error::BackendError;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Backend with numbered channels that records applied volumes
#[derive(Debug, Default)]
pub(crate) struct NullBackend {
    /// Whether every channel reports its sound as played to the end
    pub(crate) finished: bool,
    pub(crate) volumes: Arc<Mutex<Vec<f32>>>,
    next_channel: usize,
}

impl NullBackend {
    pub(crate) fn finished() -> Self {
        Self {
            finished: true,
            ..Self::default()
        }
    }
}

impl AudioBackend for NullBackend {
    type Sound = ();
    type Channel = usize;

    fn load(&mut self, _path: &Path) -> Result<(), BackendError> {
        Ok(())
    }

    fn acquire_channel(&mut self) -> Option<usize> {
        self.next_channel += 1;
        Some(self.next_channel)
    }

    fn play(&mut self, _channel: &usize, _sound: &(), _looping: bool) {}

    fn pause(&mut self, _channel: &usize) {}

    fn resume(&mut self, _channel: &usize) {}

    fn stop(&mut self, _channel: usize) {}

    fn set_volume(&mut self, _channel: &usize, level: f32) {
        self.volumes.lock().unwrap().push(level);
    }

    fn is_finished(&self, _channel: &usize) -> bool {
        self.finished
    }

    fn shutdown(&mut self) {}
}
