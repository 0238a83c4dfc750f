/// Soundboard configuration
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use soundboard_audio_desktop::DesktopConfig;
use soundboard_playback::{ConcurrencyMode, ScanOptions, TrackerConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "soundboard.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoundboardConfig {
    #[serde(default = "default_sounds")]
    pub sounds: SoundSettings,

    #[serde(default = "default_playback")]
    pub playback: PlaybackSettings,

    #[serde(default = "default_audio")]
    pub audio: AudioSettings,

    #[serde(default = "default_ui")]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SoundSettings {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default)]
    pub mode: ConcurrencyMode,

    /// Empty string disables one-shot sounds (everything loops)
    #[serde(default = "default_one_shot_prefix")]
    pub one_shot_prefix: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_load_attempts")]
    pub load_attempts: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioSettings {
    #[serde(default = "default_channels")]
    pub channels: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiSettings {
    #[serde(default = "default_columns")]
    pub columns: usize,
}

impl SoundboardConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `soundboard.toml` is read when
    /// present. Environment variables override the file, e.g.
    /// `SOUNDBOARD__PLAYBACK__MODE=single-slot`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with SOUNDBOARD__)
        settings = settings.add_source(
            config::Environment::with_prefix("SOUNDBOARD")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.sounds.default_volume) {
            return Err(AppError::Config(format!(
                "sounds.default_volume must be between 0.0 and 1.0, got {}",
                self.sounds.default_volume
            )));
        }

        if self.sounds.extensions.iter().any(|ext| ext.is_empty()) {
            return Err(AppError::Config(
                "sounds.extensions must not contain empty entries".to_string(),
            ));
        }

        if self.playback.poll_interval_ms == 0 {
            return Err(AppError::Config(
                "playback.poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.playback.load_attempts == 0 {
            return Err(AppError::Config(
                "playback.load_attempts must be at least 1".to_string(),
            ));
        }

        if self.audio.channels == 0 {
            return Err(AppError::Config(
                "audio.channels must be at least 1".to_string(),
            ));
        }

        if self.ui.columns == 0 {
            return Err(AppError::Config(
                "ui.columns must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Switch to the classic one-sound board: single slot, every sound loops
    pub fn set_single_slot(&mut self) {
        self.playback.mode = ConcurrencyMode::SingleSlot;
        self.playback.one_shot_prefix.clear();
    }

    /// Tracker settings; single-slot mode never plays one-shots
    pub fn tracker_config(&self) -> TrackerConfig {
        let prefix = match self.playback.mode {
            ConcurrencyMode::SingleSlot => "",
            ConcurrencyMode::Concurrent => self.playback.one_shot_prefix.trim(),
        };
        TrackerConfig {
            mode: self.playback.mode,
            one_shot_prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            volume_poll_interval: Duration::from_millis(self.playback.poll_interval_ms),
            load_attempts: self.playback.load_attempts,
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            extensions: self.sounds.extensions.clone(),
            default_volume: self.sounds.default_volume,
        }
    }

    pub fn desktop_config(&self) -> DesktopConfig {
        DesktopConfig {
            channels: self.audio.channels,
        }
    }
}

// Default values
fn default_sounds() -> SoundSettings {
    SoundSettings {
        directory: default_directory(),
        extensions: default_extensions(),
        default_volume: default_volume(),
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("SFX")
}

fn default_extensions() -> Vec<String> {
    ScanOptions::default().extensions
}

fn default_volume() -> f32 {
    soundboard_playback::DEFAULT_VOLUME
}

fn default_playback() -> PlaybackSettings {
    PlaybackSettings {
        mode: ConcurrencyMode::default(),
        one_shot_prefix: default_one_shot_prefix(),
        poll_interval_ms: default_poll_interval_ms(),
        load_attempts: default_load_attempts(),
    }
}

fn default_one_shot_prefix() -> String {
    "sfx".to_string()
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_load_attempts() -> u32 {
    1
}

fn default_audio() -> AudioSettings {
    AudioSettings {
        channels: default_channels(),
    }
}

fn default_channels() -> usize {
    DesktopConfig::default().channels
}

fn default_ui() -> UiSettings {
    UiSettings {
        columns: default_columns(),
    }
}

fn default_columns() -> usize {
    4
}

impl Default for SoundboardConfig {
    fn default() -> Self {
        Self {
            sounds: default_sounds(),
            playback: default_playback(),
            audio: default_audio(),
            ui: default_ui(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_tracker_defaults() {
        let config = SoundboardConfig::default();
        assert!(config.validate().is_ok());

        let tracker = config.tracker_config();
        let expected = TrackerConfig::default();
        assert_eq!(tracker.mode, expected.mode);
        assert_eq!(tracker.one_shot_prefix, expected.one_shot_prefix);
        assert_eq!(tracker.volume_poll_interval, expected.volume_poll_interval);
        assert_eq!(tracker.load_attempts, expected.load_attempts);

        assert_eq!(config.sounds.directory, PathBuf::from("SFX"));
        assert_eq!(config.scan_options().default_volume, 0.5);
        assert_eq!(config.desktop_config().channels, 8);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[sounds]
directory = "/tmp/board"

[playback]
mode = "single-slot"
one_shot_prefix = ""

[ui]
columns = 2
"#
        )
        .unwrap();

        let config = SoundboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.sounds.directory, PathBuf::from("/tmp/board"));
        assert_eq!(config.playback.mode, ConcurrencyMode::SingleSlot);
        assert_eq!(config.ui.columns, 2);

        // Untouched sections keep their defaults
        assert_eq!(config.audio.channels, 8);
        assert_eq!(config.playback.poll_interval_ms, 100);

        // Empty prefix: every sound loops
        assert_eq!(config.tracker_config().one_shot_prefix, None);
    }

    #[test]
    fn single_slot_flag_loops_every_sound() {
        let mut config = SoundboardConfig::default();
        config.set_single_slot();
        assert!(config.validate().is_ok());
        assert!(config.playback.one_shot_prefix.is_empty());

        let tracker = config.tracker_config();
        assert_eq!(tracker.mode, ConcurrencyMode::SingleSlot);
        assert_eq!(tracker.one_shot_prefix, None);
        assert!(!tracker.is_one_shot("sfxhorn.wav"));
    }

    #[test]
    fn single_slot_from_file_ignores_prefix() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[playback]
mode = "single-slot"
one_shot_prefix = "sfx"
"#
        )
        .unwrap();

        let config = SoundboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.tracker_config().one_shot_prefix, None);
        assert!(!config.tracker_config().is_one_shot("sfxhorn.wav"));
    }

    #[test]
    fn explicit_missing_file_is_error() {
        let result = SoundboardConfig::load(Some(Path::new("/definitely/missing.toml")));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = SoundboardConfig::default();
        config.sounds.default_volume = 1.5;
        assert!(config.validate().is_err());

        let mut config = SoundboardConfig::default();
        config.playback.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = SoundboardConfig::default();
        config.audio.channels = 0;
        assert!(config.validate().is_err());

        let mut config = SoundboardConfig::default();
        config.ui.columns = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_config_serializes_to_toml() {
        let text = toml::to_string_pretty(&SoundboardConfig::default()).unwrap();
        assert!(text.contains("[sounds]"));
        assert!(text.contains("mode = \"concurrent\""));

        let parsed: SoundboardConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.ui.columns, 4);
    }
}
