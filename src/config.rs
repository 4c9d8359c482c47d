//! Settings persistence
//!
//! Load and save user preferences to a TOML file. The file is created with
//! defaults on first run and rewritten on every accepted change.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::converter::{validate_width, CharacterSet};
use crate::error::{Error, Result};

/// Fastest animation the settings dialog allows
pub const MIN_FRAME_INTERVAL_MS: u64 = 20;
/// Slowest animation the settings dialog allows
pub const MAX_FRAME_INTERVAL_MS: u64 = 5000;
/// Upper bound on images fetched per search
pub const MAX_IMAGE_COUNT: usize = 12;
/// Slowest per-cell reveal; 0 shows new artworks at once
pub const MAX_REVEAL_DELAY_MS: u64 = 100;

pub const DEFAULT_SEARCH_URL: &str = "https://www.bing.com/images/search?q={query}&form=HDRSC2";

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub save_folder: PathBuf,
    pub load_folder: PathBuf,
    pub frame_interval_ms: u64,
    pub default_width: usize,
    pub image_count: usize,
    pub charset: CharacterSet,
    pub search_url: String,
    /// Pause between revealing two cells of a newly shown artwork
    pub reveal_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            save_folder: cwd.clone(),
            load_folder: cwd,
            frame_interval_ms: 200,
            default_width: 80,
            image_count: 3,
            charset: CharacterSet::Standard,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            reveal_delay_ms: 5,
        }
    }
}

impl Settings {
    /// Replace values outside the ranges `SettingsStore::update` accepts
    /// with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Settings::default();
        if validate_interval(self.frame_interval_ms).is_err() {
            warn!(value = self.frame_interval_ms, "frame_interval_ms out of range, using default");
            self.frame_interval_ms = defaults.frame_interval_ms;
        }
        if validate_width(self.default_width).is_err() {
            warn!(value = self.default_width, "default_width out of range, using default");
            self.default_width = defaults.default_width;
        }
        if validate_image_count(self.image_count).is_err() {
            warn!(value = self.image_count, "image_count out of range, using default");
            self.image_count = defaults.image_count;
        }
        if validate_reveal_delay(self.reveal_delay_ms).is_err() {
            warn!(value = self.reveal_delay_ms, "reveal_delay_ms out of range, using default");
            self.reveal_delay_ms = defaults.reveal_delay_ms;
        }
        if !self.search_url.contains("{query}") {
            warn!(value = %self.search_url, "search_url has no {{query}} placeholder, using default");
            self.search_url = defaults.search_url;
        }
        self
    }
}

/// Partial settings change; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub save_folder: Option<PathBuf>,
    pub load_folder: Option<PathBuf>,
    pub frame_interval_ms: Option<u64>,
    pub default_width: Option<usize>,
    pub image_count: Option<usize>,
    pub charset: Option<CharacterSet>,
    pub reveal_delay_ms: Option<u64>,
}

/// Owns the settings file location
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at the platform config location
    pub fn open_default() -> Self {
        Self::at(Self::default_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the configuration file path
    pub fn default_path() -> PathBuf {
        if let Some(proj_dirs) = ProjectDirs::from("com", "chromaglyph", "chromaglyph") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("chromaglyph.toml")
        }
    }

    /// Read settings, falling back to defaults. A missing file is created and
    /// out-of-range values are reset.
    pub fn load(&self) -> Settings {
        if !self.path.exists() {
            let defaults = Settings::default();
            if let Err(e) = self.write(&defaults) {
                warn!(path = %self.path.display(), error = %e, "could not create settings file");
            }
            return defaults;
        }

        match fs::read_to_string(&self.path) {
            Ok(contents) => match toml::from_str::<Settings>(&contents) {
                Ok(settings) => settings.sanitized(),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "settings file unreadable, using defaults");
                    Settings::default()
                }
            },
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "settings file unreadable, using defaults");
                Settings::default()
            }
        }
    }

    /// Validate and apply a partial update, then persist it.
    ///
    /// On error nothing is written and the caller keeps its previous value.
    pub fn update(&self, current: &Settings, update: SettingsUpdate) -> Result<Settings> {
        let mut next = current.clone();

        if let Some(folder) = update.save_folder {
            ensure_writable_dir(&folder)?;
            next.save_folder = folder;
        }
        if let Some(folder) = update.load_folder {
            ensure_dir(&folder)?;
            next.load_folder = folder;
        }
        if let Some(ms) = update.frame_interval_ms {
            next.frame_interval_ms = validate_interval(ms)?;
        }
        if let Some(width) = update.default_width {
            next.default_width = validate_width(width)?;
        }
        if let Some(count) = update.image_count {
            next.image_count = validate_image_count(count)?;
        }
        if let Some(charset) = update.charset {
            next.charset = charset;
        }
        if let Some(ms) = update.reveal_delay_ms {
            next.reveal_delay_ms = validate_reveal_delay(ms)?;
        }

        self.write(&next)?;
        info!(path = %self.path.display(), "settings saved");
        Ok(next)
    }

    fn write(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string_pretty(settings)
            .map_err(|e| Error::InvalidInput(format!("settings not serializable: {e}")))?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

pub fn validate_interval(ms: u64) -> Result<u64> {
    if (MIN_FRAME_INTERVAL_MS..=MAX_FRAME_INTERVAL_MS).contains(&ms) {
        Ok(ms)
    } else {
        Err(Error::InvalidInput(format!(
            "frame interval must be between {MIN_FRAME_INTERVAL_MS} and {MAX_FRAME_INTERVAL_MS} ms, got {ms}"
        )))
    }
}

pub fn validate_image_count(count: usize) -> Result<usize> {
    if (1..=MAX_IMAGE_COUNT).contains(&count) {
        Ok(count)
    } else {
        Err(Error::InvalidInput(format!(
            "image count must be between 1 and {MAX_IMAGE_COUNT}, got {count}"
        )))
    }
}

pub fn validate_reveal_delay(ms: u64) -> Result<u64> {
    if ms <= MAX_REVEAL_DELAY_MS {
        Ok(ms)
    } else {
        Err(Error::InvalidInput(format!(
            "reveal delay must be at most {MAX_REVEAL_DELAY_MS} ms, got {ms}"
        )))
    }
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else if path.exists() {
        Err(Error::invalid_path(path, "not a directory"))
    } else {
        Err(Error::invalid_path(path, "does not exist"))
    }
}

/// Existing directory we can create files in
pub fn ensure_writable_dir(path: &Path) -> Result<()> {
    ensure_dir(path)?;
    let scratch = path.join(".chromaglyph-write-check");
    fs::write(&scratch, b"")
        .map_err(|e| Error::invalid_path(path, format!("not writable: {e}")))?;
    let _ = fs::remove_file(&scratch);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.frame_interval_ms, 200);
        assert_eq!(settings.default_width, 80);
        assert_eq!(settings.image_count, 3);
        assert!(settings.search_url.contains("{query}"));
    }

    #[test]
    fn test_load_creates_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("nested").join("config.toml"));

        let settings = store.load();
        assert_eq!(settings, Settings::default());
        assert!(store.path().exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "frame_interval_ms = 500\n").unwrap();

        let settings = SettingsStore::at(&path).load();
        assert_eq!(settings.frame_interval_ms, 500);
        assert_eq!(settings.default_width, 80);
    }

    #[test]
    fn test_out_of_range_values_reset_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "frame_interval_ms = 0\nimage_count = 0\ndefault_width = 5\nreveal_delay_ms = 99999\nsearch_url = \"https://example.com\"\ncharset = \"Blocks\"\n",
        )
        .unwrap();

        let settings = SettingsStore::at(&path).load();
        let defaults = Settings::default();
        assert_eq!(settings.frame_interval_ms, defaults.frame_interval_ms);
        assert_eq!(settings.image_count, defaults.image_count);
        assert_eq!(settings.default_width, defaults.default_width);
        assert_eq!(settings.reveal_delay_ms, defaults.reveal_delay_ms);
        assert_eq!(settings.search_url, DEFAULT_SEARCH_URL);
        // In-range values survive
        assert_eq!(settings.charset, CharacterSet::Blocks);
    }

    #[test]
    fn test_garbage_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        assert_eq!(SettingsStore::at(&path).load(), Settings::default());
    }

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.toml"));
        let current = store.load();

        let updated = store
            .update(
                &current,
                SettingsUpdate {
                    save_folder: Some(dir.path().to_path_buf()),
                    frame_interval_ms: Some(350),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.frame_interval_ms, 350);
        assert_eq!(store.load(), updated);
    }

    #[test]
    fn test_update_rejects_missing_folder() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.toml"));
        let current = store.load();

        let err = store
            .update(
                &current,
                SettingsUpdate {
                    load_folder: Some(dir.path().join("missing")),
                    frame_interval_ms: Some(999),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(err, Error::InvalidPath { .. }));
        // Rejected update leaves the file untouched
        assert_eq!(store.load(), current);
    }

    #[test]
    fn test_update_rejects_file_as_folder() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let store = SettingsStore::at(dir.path().join("config.toml"));

        let err = store
            .update(
                &Settings::default(),
                SettingsUpdate {
                    save_folder: Some(file),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }

    #[test]
    fn test_interval_bounds() {
        assert!(validate_interval(MIN_FRAME_INTERVAL_MS).is_ok());
        assert!(validate_interval(MAX_FRAME_INTERVAL_MS).is_ok());
        assert!(validate_interval(5).is_err());
        assert!(validate_interval(10_000).is_err());
    }

    #[test]
    fn test_update_rejects_slow_reveal() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("config.toml"));
        let current = store.load();
        let result = store.update(
            &current,
            SettingsUpdate {
                reveal_delay_ms: Some(MAX_REVEAL_DELAY_MS + 1),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let updated = store
            .update(
                &current,
                SettingsUpdate {
                    reveal_delay_ms: Some(0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.reveal_delay_ms, 0);
    }

    #[test]
    fn test_config_serialization() {
        let settings = Settings {
            charset: CharacterSet::Custom(" .o0".into()),
            ..Settings::default()
        };
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
    }
}
