//! Persisted light/dark theme preference.
//!
//! The preference is a single `theme = "dark" | "light"` entry in
//! `preferences.toml` inside the config directory. It is read once when the
//! store is opened and written through on every change.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::PreferenceError;

const PREFERENCES_FILE_NAME: &str = "preferences.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Only the exact value `"dark"` selects the dark theme.
    pub fn from_stored(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default)]
    theme: Option<String>,
}

#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    theme: Theme,
}

impl ThemeStore {
    /// Open the store in `config_dir`, reading the persisted theme.
    ///
    /// A missing or unreadable file yields the light theme; the file is not
    /// created until the first change.
    pub fn open(config_dir: &Path) -> Self {
        let path = config_dir.join(PREFERENCES_FILE_NAME);
        let theme = match read_preferences(&path) {
            Ok(prefs) => prefs
                .theme
                .as_deref()
                .map(Theme::from_stored)
                .unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Ignoring saved theme: {}", e);
                Theme::default()
            }
        };

        tracing::debug!("Theme preference loaded: {}", theme.as_str());
        Self { path, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    /// Set the theme and persist it immediately.
    pub fn set(&mut self, theme: Theme) -> Result<(), PreferenceError> {
        write_preferences(
            &self.path,
            &Preferences {
                theme: Some(theme.as_str().to_string()),
            },
        )?;
        self.theme = theme;
        tracing::info!("Theme set to {}", theme.as_str());
        Ok(())
    }

    /// Flip between light and dark, returning the new theme.
    pub fn toggle(&mut self) -> Result<Theme, PreferenceError> {
        let next = self.theme.toggled();
        self.set(next)?;
        Ok(next)
    }
}

fn read_preferences(path: &Path) -> Result<Preferences, PreferenceError> {
    if !path.exists() {
        return Ok(Preferences::default());
    }
    let contents =
        std::fs::read_to_string(path).map_err(|e| PreferenceError::Read(e.to_string()))?;
    toml::from_str(&contents).map_err(|e| PreferenceError::Parse(e.to_string()))
}

fn write_preferences(path: &Path, prefs: &Preferences) -> Result<(), PreferenceError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| PreferenceError::Write(e.to_string()))?;
    }
    let contents =
        toml::to_string(prefs).map_err(|e| PreferenceError::Write(e.to_string()))?;
    std::fs::write(path, contents).map_err(|e| PreferenceError::Write(e.to_string()))
}
