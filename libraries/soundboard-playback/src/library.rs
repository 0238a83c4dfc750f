//! Sound directory scanning
//!
//! Builds the set of playable assets from one directory (non-recursive).
//! Each asset gets its own volume control, which the UI shell binds to its
//! slider.

use crate::error::{Result, SoundboardError};
use crate::types::SoundId;
use crate::volume::{VolumeControl, DEFAULT_VOLUME};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognized by default (matched case-sensitively)
const DEFAULT_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg"];

/// Scan options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// File extensions (without the dot) treated as sound assets
    pub extensions: Vec<String>,

    /// Initial volume of every scanned sound (default: 0.5)
    pub default_volume: f32,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            default_volume: DEFAULT_VOLUME,
        }
    }
}

impl ScanOptions {
    /// Check a file name against the extension list
    ///
    /// Suffix match, case-sensitive: `beep.wav` matches, `beep.WAV` does not.
    pub fn matches(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            file_name
                .strip_suffix(ext.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }
}

/// One playable asset
#[derive(Debug, Clone)]
pub struct SoundEntry {
    /// File name, also the display label
    pub id: SoundId,

    /// Full path for decoding
    pub path: PathBuf,

    /// Volume control bound to this sound's slider
    pub volume: VolumeControl,
}

/// Scanned sound assets, ordered by id
#[derive(Debug, Clone, Default)]
pub struct SoundLibrary {
    directory: PathBuf,
    entries: Vec<SoundEntry>,
    index: HashMap<SoundId, usize>,
}

impl SoundLibrary {
    /// Library with no sounds (what the shell opens with after a failed scan)
    pub fn empty(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Scan `directory` for sound assets
    ///
    /// Only direct children are considered. Unreadable child entries are
    /// skipped with a warning. An unreadable directory is an error.
    pub fn scan(directory: impl AsRef<Path>, options: &ScanOptions) -> Result<Self> {
        let directory = directory.as_ref();
        let scan_error = |reason: String| SoundboardError::DirectoryScan {
            path: directory.to_path_buf(),
            reason,
        };

        if !directory.exists() {
            return Err(scan_error("directory does not exist".to_string()));
        }

        if !directory.is_dir() {
            return Err(scan_error("not a directory".to_string()));
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(scan_error(e.to_string())),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", directory.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                tracing::warn!("Skipping non UTF-8 file name: {:?}", entry.file_name());
                continue;
            };

            if options.matches(name) {
                entries.push(SoundEntry {
                    id: name.to_string(),
                    path: entry.path().to_path_buf(),
                    volume: VolumeControl::new(options.default_volume),
                });
            }
        }

        entries.sort_by(|a, b| a.id.cmp(&b.id));
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.id.clone(), i))
            .collect();

        tracing::info!(
            "Found {} sounds in {}",
            entries.len(),
            directory.display()
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            entries,
            index,
        })
    }

    /// Look up an asset and check that its file still exists
    pub fn resolve(&self, id: &str) -> Result<&SoundEntry> {
        let entry = self
            .get(id)
            .ok_or_else(|| SoundboardError::AssetNotFound(id.to_string()))?;

        if !entry.path.is_file() {
            return Err(SoundboardError::AssetNotFound(id.to_string()));
        }

        Ok(entry)
    }

    /// Get an asset by id
    pub fn get(&self, id: &str) -> Option<&SoundEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// All assets, ordered by id
    pub fn entries(&self) -> &[SoundEntry] {
        &self.entries
    }

    /// Scanned directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
