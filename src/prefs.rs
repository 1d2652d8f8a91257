//! Persistent user preferences
//!
//! A small string key-value store kept as a JSON object in the platform
//! config directory (`~/.config/weathernews/preferences.json` on Linux).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::warn;

use crate::theme::{Theme, THEME_KEY};

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to access preferences: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    /// Store in the platform config directory, if one exists
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "weathernews")?;
        Some(Self::with_path(
            project_dirs.config_dir().join("preferences.json"),
        ))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all entries; a missing or corrupt file reads as empty
    fn load(&self) -> BTreeMap<String, String> {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(error = %e, path = %self.path.display(), "ignoring unreadable preferences");
            BTreeMap::new()
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.load().remove(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }

    /// The stored theme, or the default when absent or unrecognised
    pub fn load_theme(&self) -> Theme {
        self.get(THEME_KEY)
            .and_then(|value| Theme::parse(&value))
            .unwrap_or_default()
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), PreferenceError> {
        self.set(THEME_KEY, theme.as_str())
    }
}
