//! Client settings persistence.
//!
//! Stores the API location and the app key obtained by pairing in a JSON file
//! at an OS-appropriate location.

use crate::core::api::{DEFAULT_API_URL, DEFAULT_APP_NAME};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Base URL of the local API, including the version prefix.
    pub api_url: String,
    /// Name shown in the desktop app when pairing.
    pub app_name: String,
    /// App key from the last successful pairing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_key: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            app_key: None,
        }
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/anytype-client/settings.json`
/// - Windows: `%APPDATA%/AnytypeClient/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("AnytypeClient").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("anytype-client").join("settings.json")
    }
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_from(path: &Path) -> ClientSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings at {}: {e}", path.display());
            ClientSettings::default()
        }),
        Err(_) => ClientSettings::default(),
    }
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_to(path: &Path, settings: &ClientSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_settings() -> ClientSettings {
    load_from(&settings_file_path())
}

pub fn save_settings(settings: &ClientSettings) -> Result<()> {
    save_to(&settings_file_path(), settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_from(&dir.path().join("settings.json"));
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.api_url, "http://localhost:31009/v1");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = ClientSettings {
            app_key: Some("key-123".to_string()),
            ..ClientSettings::default()
        };
        save_to(&path, &settings).unwrap();
        assert_eq!(load_from(&path), settings);
    }

    #[test]
    fn test_corrupt_or_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, "{not json").unwrap();
        assert_eq!(load_from(&path), ClientSettings::default());

        fs::write(&path, r#"{"app_key": "abc"}"#).unwrap();
        let settings = load_from(&path);
        assert_eq!(settings.app_key.as_deref(), Some("abc"));
        assert_eq!(settings.app_name, "RustClient");
    }
}
