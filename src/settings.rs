//! Per-user settings cached on disk between sessions: the last display
//! settings this controller published and the theme flag. Read once at
//! startup, written on every save. A missing or broken file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{Alignment, BroadcastState, Language, DEFAULT_FONT_SIZE};

/// File name inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub alignment: Alignment,
    pub visible_languages: Vec<Language>,
    pub tamil_font_size: u32,
    pub hindi_font_size: u32,
    pub english_font_size: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            alignment: Alignment::TopBottom,
            visible_languages: Language::ALL.to_vec(),
            tamil_font_size: DEFAULT_FONT_SIZE,
            hindi_font_size: DEFAULT_FONT_SIZE,
            english_font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl DisplaySettings {
    pub fn from_state(state: &BroadcastState) -> Self {
        Self {
            alignment: state.alignment,
            visible_languages: state.visible_languages.clone(),
            tamil_font_size: state.tamil_font_size,
            hindi_font_size: state.hindi_font_size,
            english_font_size: state.english_font_size,
        }
    }

    /// Overlay the cached settings on `base`, leaving the live flag and the
    /// section index alone.
    pub fn apply_to(&self, base: &BroadcastState) -> BroadcastState {
        let visible_languages = if self.visible_languages.is_empty() {
            base.visible_languages.clone()
        } else {
            self.visible_languages.clone()
        };
        BroadcastState {
            alignment: self.alignment,
            visible_languages,
            tamil_font_size: positive_or_default(self.tamil_font_size),
            hindi_font_size: positive_or_default(self.hindi_font_size),
            english_font_size: positive_or_default(self.english_font_size),
            ..base.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSettings {
    pub dark_theme: bool,
    pub display: DisplaySettings,
}

/// Reads and writes [`LocalSettings`] at a fixed path.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached settings, falling back to defaults when the file is
    /// missing or cannot be parsed.
    pub fn load(&self) -> LocalSettings {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "no cached settings");
                return LocalSettings::default();
            }
        };
        match toml::from_str(&contents) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "ignoring unreadable settings");
                LocalSettings::default()
            }
        }
    }

    pub fn save(&self, settings: &LocalSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("failed to create settings directory")?;
            }
        }
        let contents = toml::to_string_pretty(settings).context("failed to encode settings")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("failed to write settings to {}", self.path.display()))
    }
}

fn positive_or_default(size: u32) -> u32 {
    if size == 0 {
        DEFAULT_FONT_SIZE
    } else {
        size
    }
}
