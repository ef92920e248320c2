//! Runtime settings: a flat JSON object of strings.
//!
//! ```json
//! { "FOLDER": "/oric" }
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Key of the media folder setting.
pub const FOLDER_KEY: &str = "FOLDER";
/// Media folder when the setting is absent.
pub const DEFAULT_FOLDER: &str = "/oric";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("cannot read settings: {0}")]
    Io(#[from] io::Error),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    #[must_use]
    pub fn find(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// The media folder, or [`DEFAULT_FOLDER`].
    #[must_use]
    pub fn folder(&self) -> &str {
        self.find(FOLDER_KEY).unwrap_or(DEFAULT_FOLDER)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_folder() {
        let settings = Settings::from_json(r#"{"FOLDER": "/media/oric"}"#).unwrap();
        assert_eq!(settings.find(FOLDER_KEY), Some("/media/oric"));
        assert_eq!(settings.folder(), "/media/oric");
        assert_eq!(settings.find("MISSING"), None);
    }

    #[test]
    fn folder_defaults() {
        assert_eq!(Settings::default().folder(), DEFAULT_FOLDER);
    }

    #[test]
    fn rejects_non_string_values() {
        assert!(matches!(
            Settings::from_json(r#"{"FOLDER": 3}"#),
            Err(SettingsError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.set(FOLDER_KEY, "/tmp/oric");
        fs::write(&path, settings.to_json().unwrap()).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
        assert!(matches!(
            Settings::load(&dir.path().join("none.json")),
            Err(SettingsError::Io(_))
        ));
    }
}
