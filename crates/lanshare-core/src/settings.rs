// SPDX-License-Identifier: AGPL-3.0
// Lanshare Core - Settings loading
//
// Settings are read from a local JSON file if one exists.
// Lanshare never writes it: a share leaves nothing behind.

use crate::types::{ServeError, ServeSettings};
use std::fs;
use std::path::{Path, PathBuf};

/// Read-only view of the settings file
pub struct SettingsStore {
    settings: ServeSettings,
    file_path: Option<PathBuf>,
}

impl SettingsStore {
    /// Load settings from the platform config directory, falling back to defaults
    pub fn load() -> Result<Self, ServeError> {
        match Self::get_settings_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::warn!("Could not determine config directory, using defaults");
                Ok(Self {
                    settings: ServeSettings::default(),
                    file_path: None,
                })
            }
        }
    }

    /// Load settings from an explicit file path
    pub fn load_from(path: &Path) -> Result<Self, ServeError> {
        tracing::debug!("Settings file path: {:?}", path);

        let settings = if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| ServeError::FileIo(format!("Failed to read settings: {}", e)))?;

            serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse settings, using defaults: {}", e);
                ServeSettings::default()
            })
        } else {
            tracing::debug!("No settings file found, using defaults");
            ServeSettings::default()
        };

        Ok(Self {
            settings,
            file_path: Some(path.to_path_buf()),
        })
    }

    /// Get the path to the settings file
    fn get_settings_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("net", "lanshare", "lanshare")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Path the settings were looked up at, if any
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Get current settings
    pub fn get(&self) -> ServeSettings {
        self.settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::load_from(&path).unwrap();
        assert_eq!(store.get(), ServeSettings::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_reads_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"port": 9090, "copyToClipboard": false}"#).unwrap();

        let settings = SettingsStore::load_from(&path).unwrap().get();
        assert_eq!(settings.port, 9090);
        assert!(!settings.copy_to_clipboard);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();

        let store = SettingsStore::load_from(&path).unwrap();
        assert_eq!(store.get(), ServeSettings::default());
        assert_eq!(store.file_path(), Some(path.as_path()));
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::create_dir(&path).unwrap();

        let err = SettingsStore::load_from(&path).err().unwrap();
        assert!(matches!(err, ServeError::FileIo(_)));
        assert!(err.to_string().contains("Failed to read settings"));
    }
}
