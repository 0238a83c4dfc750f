//! Shared test helpers: a recording fake backend and sound directory fixtures

#![allow(dead_code)]

use soundboard_playback::{
    AudioBackend, BackendError, PlaybackTracker, ScanOptions, SoundLibrary, TrackerConfig,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// What the fake backend knows about one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelState {
    /// Load number of the sound bound to this channel
    pub sound: Option<usize>,
    pub looping: bool,
    pub paused: bool,
    pub volume: f32,
    pub finished: bool,
}

/// Everything the fake backend records
#[derive(Debug, Default)]
pub struct BackendLog {
    /// Paths passed to `load`, in call order
    pub loads: Vec<PathBuf>,
    /// Channels currently handed out
    pub channels: HashMap<usize, ChannelState>,
    /// Total channels ever acquired
    pub acquired: usize,
    pub stops: usize,
    pub shutdown_calls: usize,
    next_channel: usize,
}

/// Decoded sound stand-in
#[derive(Debug)]
pub struct FakeSound {
    pub load: usize,
}

/// Channel stand-in
#[derive(Debug)]
pub struct FakeChannel(pub usize);

/// Recording backend with an optional channel limit and failing files
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub log: Arc<Mutex<BackendLog>>,
    pub capacity: Option<usize>,
    /// File names whose load always fails
    pub failing: HashSet<String>,
    /// Load failures before a file succeeds
    pub flaky: Arc<Mutex<HashMap<String, u32>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn flaky(self, name: &str, failures: u32) -> Self {
        self.flaky.lock().unwrap().insert(name.to_string(), failures);
        self
    }

    /// Mark every non-looping channel as played to the end
    pub fn finish_one_shots(&self) {
        let mut log = self.log.lock().unwrap();
        for channel in log.channels.values_mut() {
            if !channel.looping {
                channel.finished = true;
            }
        }
    }

    pub fn load_count(&self) -> usize {
        self.log.lock().unwrap().loads.len()
    }

    pub fn open_channels(&self) -> usize {
        self.log.lock().unwrap().channels.len()
    }

    /// Channel state of the sound loaded from `name`
    pub fn channel_for(&self, name: &str) -> Option<ChannelState> {
        let log = self.log.lock().unwrap();
        let loads: Vec<usize> = log
            .loads
            .iter()
            .enumerate()
            .filter(|(_, path)| path.file_name().and_then(|n| n.to_str()) == Some(name))
            .map(|(i, _)| i)
            .collect();

        log.channels
            .values()
            .find(|channel| channel.sound.is_some_and(|s| loads.contains(&s)))
            .cloned()
    }
}

impl AudioBackend for FakeBackend {
    type Sound = FakeSound;
    type Channel = FakeChannel;

    fn load(&mut self, path: &Path) -> Result<FakeSound, BackendError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        if self.failing.contains(&name) {
            return Err(BackendError::Decode(format!("corrupt file {}", name)));
        }

        if let Some(remaining) = self.flaky.lock().unwrap().get_mut(&name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(BackendError::Decode("transient failure".to_string()));
            }
        }

        let mut log = self.log.lock().unwrap();
        log.loads.push(path.to_path_buf());
        Ok(FakeSound {
            load: log.loads.len() - 1,
        })
    }

    fn acquire_channel(&mut self) -> Option<FakeChannel> {
        let mut log = self.log.lock().unwrap();
        if self.capacity.is_some_and(|cap| log.channels.len() >= cap) {
            return None;
        }

        let id = log.next_channel;
        log.next_channel += 1;
        log.acquired += 1;
        log.channels.insert(
            id,
            ChannelState {
                sound: None,
                looping: false,
                paused: false,
                volume: 1.0,
                finished: false,
            },
        );
        Some(FakeChannel(id))
    }

    fn play(&mut self, channel: &FakeChannel, sound: &FakeSound, looping: bool) {
        let mut log = self.log.lock().unwrap();
        let state = log.channels.get_mut(&channel.0).expect("play on released channel");
        state.sound = Some(sound.load);
        state.looping = looping;
        state.paused = false;
        state.finished = false;
    }

    fn pause(&mut self, channel: &FakeChannel) {
        let mut log = self.log.lock().unwrap();
        log.channels.get_mut(&channel.0).expect("pause on released channel").paused = true;
    }

    fn resume(&mut self, channel: &FakeChannel) {
        let mut log = self.log.lock().unwrap();
        log.channels.get_mut(&channel.0).expect("resume on released channel").paused = false;
    }

    fn stop(&mut self, channel: FakeChannel) {
        let mut log = self.log.lock().unwrap();
        log.channels.remove(&channel.0).expect("double stop");
        log.stops += 1;
    }

    fn set_volume(&mut self, channel: &FakeChannel, level: f32) {
        let mut log = self.log.lock().unwrap();
        log.channels.get_mut(&channel.0).expect("volume on released channel").volume = level;
    }

    fn is_finished(&self, channel: &FakeChannel) -> bool {
        let log = self.log.lock().unwrap();
        log.channels.get(&channel.0).is_some_and(|c| c.finished)
    }

    fn shutdown(&mut self) {
        self.log.lock().unwrap().shutdown_calls += 1;
    }
}

/// Temp directory holding empty files with the given names
pub fn sound_dir(names: &[&str]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for name in names {
        fs::write(temp.path().join(name), b"fake audio").unwrap();
    }
    temp
}

/// Tracker over a fake backend and a scanned temp directory
///
/// Must run inside a tokio runtime. Keep the `TempDir` alive for the test.
pub fn tracker_with(
    backend: FakeBackend,
    names: &[&str],
    config: TrackerConfig,
) -> (PlaybackTracker<FakeBackend>, TempDir) {
    let dir = sound_dir(names);
    let library = SoundLibrary::scan(dir.path(), &ScanOptions::default()).unwrap();
    let tracker = PlaybackTracker::new(backend, library, config).unwrap();
    (tracker, dir)
}
