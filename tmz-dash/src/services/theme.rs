//! Light/dark theme preference
//!
//! The only state persisted across restarts. Stored under a single key in
//! the preferences TOML file, read once at startup, and written only when
//! the value actually changes (reads never touch the file).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tmz_common::config::write_toml;
use tmz_common::{Error, Result};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Key holding the theme in the preferences file
pub const THEME_KEY: &str = "theme";

/// UI colour scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::InvalidInput(format!("Unknown theme: {}", other))),
        }
    }
}

/// Owner of the theme preference
#[derive(Debug)]
pub struct ThemeStore {
    path: PathBuf,
    current: RwLock<Theme>,
}

impl ThemeStore {
    /// Read the stored preference from `path`, defaulting to light
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let theme = read_theme(&path).unwrap_or_default();

        info!(theme = %theme, file = %path.display(), "Theme preference applied");

        Self {
            path,
            current: RwLock::new(theme),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> Theme {
        *self.current.read().await
    }

    /// Change the theme; persists only when the value differs
    pub async fn set(&self, theme: Theme) -> Result<Theme> {
        let mut current = self.current.write().await;

        if *current == theme {
            return Ok(theme);
        }

        persist_theme(&self.path, theme)?;
        *current = theme;

        info!(theme = %theme, "Theme changed");
        Ok(theme)
    }

    pub async fn toggle(&self) -> Result<Theme> {
        let mut current = self.current.write().await;
        let next = current.toggled();

        persist_theme(&self.path, next)?;
        *current = next;

        info!(theme = %next, "Theme toggled");
        Ok(next)
    }
}

fn read_preferences(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;

    match content.parse::<toml::Table>() {
        Ok(table) => Some(table),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Unreadable preferences file, ignoring");
            None
        }
    }
}

fn read_theme(path: &Path) -> Option<Theme> {
    let table = read_preferences(path)?;
    let raw = table.get(THEME_KEY)?.as_str()?;

    match raw.parse() {
        Ok(theme) => Some(theme),
        Err(e) => {
            warn!(error = %e, "Ignoring stored theme");
            None
        }
    }
}

fn persist_theme(path: &Path, theme: Theme) -> Result<()> {
    // Other keys in the file are preserved.
    let mut table = read_preferences(path).unwrap_or_default();
    table.insert(
        THEME_KEY.to_string(),
        toml::Value::String(theme.as_str().to_string()),
    );

    write_toml(&table, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[tokio::test]
    async fn test_missing_file_defaults_to_light_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let store = ThemeStore::load(&path);
        assert_eq!(store.get().await, Theme::Light);
        assert!(!path.exists(), "Reading must not create the file");
    }

    #[tokio::test]
    async fn test_set_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let store = ThemeStore::load(&path);
        store.set(Theme::Dark).await.unwrap();

        let reloaded = ThemeStore::load(&path);
        assert_eq!(reloaded.get().await, Theme::Dark);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme = \"dark\""));
    }

    #[tokio::test]
    async fn test_setting_same_theme_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let store = ThemeStore::load(&path);
        store.set(Theme::Light).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_toggle_twice_returns_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let store = ThemeStore::load(&path);
        assert_eq!(store.toggle().await.unwrap(), Theme::Dark);
        assert_eq!(store.toggle().await.unwrap(), Theme::Light);
        assert_eq!(ThemeStore::load(&path).get().await, Theme::Light);
    }

    #[tokio::test]
    async fn test_other_preference_keys_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "language = \"es\"\n").unwrap();

        let store = ThemeStore::load(&path);
        store.set(Theme::Dark).await.unwrap();

        let table: toml::Table = std::fs::read_to_string(&path).unwrap().parse().unwrap();
        assert_eq!(table["language"].as_str(), Some("es"));
        assert_eq!(table[THEME_KEY].as_str(), Some("dark"));
    }

    #[tokio::test]
    async fn test_invalid_stored_value_falls_back_to_light() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "theme = \"neon\"\n").unwrap();

        assert_eq!(ThemeStore::load(&path).get().await, Theme::Light);
    }
}
