//! Core types for playback state tracking

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sound identifier: the asset's file name, extension included
///
/// Doubles as the button label.
pub type SoundId = String;

/// Playback state of a single sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not loaded, no resources held
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused, handle and channel retained
    Paused,
}

impl PlaybackState {
    /// Whether the sound holds backend resources
    pub fn is_active(self) -> bool {
        !matches!(self, PlaybackState::Stopped)
    }
}

/// How many sounds may be active at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcurrencyMode {
    /// One sound process-wide; starting another stops the current one
    SingleSlot,

    /// Every sound tracked independently
    #[default]
    Concurrent,
}

/// Configuration for the playback tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Concurrency mode (default: Concurrent)
    pub mode: ConcurrencyMode,

    /// Name prefix marking one-shot sounds, matched case-insensitively
    /// (default: "sfx"). `None` loops every sound.
    pub one_shot_prefix: Option<String>,

    /// Volume sync polling interval (default: 100ms)
    pub volume_poll_interval: Duration,

    /// Load attempts per start before a sound is marked unplayable (default: 1)
    pub load_attempts: u32,
}

impl TrackerConfig {
    /// Classic single-sound board: one slot, every sound loops
    pub fn single_slot() -> Self {
        Self {
            mode: ConcurrencyMode::SingleSlot,
            one_shot_prefix: None,
            ..Self::default()
        }
    }

    /// Whether `id` plays once instead of looping
    pub fn is_one_shot(&self, id: &str) -> bool {
        match &self.one_shot_prefix {
            Some(prefix) if !prefix.is_empty() => id
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
            _ => false,
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            mode: ConcurrencyMode::Concurrent,
            one_shot_prefix: Some("sfx".to_string()),
            volume_poll_interval: Duration::from_millis(100),
            load_attempts: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.mode, ConcurrencyMode::Concurrent);
        assert_eq!(config.one_shot_prefix.as_deref(), Some("sfx"));
        assert_eq!(config.volume_poll_interval, Duration::from_millis(100));
        assert_eq!(config.load_attempts, 1);
    }

    #[test]
    fn one_shot_prefix_is_case_insensitive() {
        let config = TrackerConfig::default();
        assert!(config.is_one_shot("sfxhorn.wav"));
        assert!(config.is_one_shot("SFX_door.ogg"));
        assert!(config.is_one_shot("SfxPop.mp3"));
        assert!(!config.is_one_shot("beep.wav"));
        assert!(!config.is_one_shot("horn_sfx.wav"));
        assert!(!config.is_one_shot("sf"));
    }

    #[test]
    fn single_slot_loops_everything() {
        let config = TrackerConfig::single_slot();
        assert_eq!(config.mode, ConcurrencyMode::SingleSlot);
        assert!(!config.is_one_shot("sfxhorn.wav"));
    }

    #[test]
    fn multibyte_names_do_not_panic() {
        let config = TrackerConfig::default();
        assert!(!config.is_one_shot("ß.wav"));
        assert!(!config.is_one_shot("éé"));
    }

    #[test]
    fn stopped_is_not_active() {
        assert!(!PlaybackState::Stopped.is_active());
        assert!(PlaybackState::Playing.is_active());
        assert!(PlaybackState::Paused.is_active());
    }
}
