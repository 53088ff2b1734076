// Launcher preferences
// Server URL, API token and page size, persisted as JSON in the user config dir

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::zipline::{ZiplineClient, ZiplineError};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Preference entries as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoredPreferences {
    /// Base URL of the Zipline server (e.g., https://files.example.com)
    #[serde(default)]
    pub zipline_url: Option<String>,
    /// API token from the Zipline dashboard
    #[serde(default)]
    pub api_token: Option<String>,
    /// Files per page in Browse Uploads
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl StoredPreferences {
    /// Overlay per-invocation values; set fields win
    pub fn merged(mut self, overrides: StoredPreferences) -> Self {
        if overrides.zipline_url.is_some() {
            self.zipline_url = overrides.zipline_url;
        }
        if overrides.api_token.is_some() {
            self.api_token = overrides.api_token;
        }
        if overrides.page_size.is_some() {
            self.page_size = overrides.page_size;
        }
        self
    }
}

/// Validated preferences, ready to build a client from
#[derive(Debug, Clone)]
pub struct Preferences {
    pub zipline_url: String,
    pub api_token: SecretString,
    pub page_size: u32,
}

impl Preferences {
    pub fn from_stored(stored: StoredPreferences) -> Result<Self, ZiplineError> {
        let zipline_url = stored
            .zipline_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ZiplineError::InvalidConfig(
                "Zipline URL is not set. Run `zipline-cli configure --url <URL>`".to_string(),
            ))?;
        let api_token = stored
            .api_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ZiplineError::InvalidConfig(
                "API token is not set. Run `zipline-cli configure --token <TOKEN>`".to_string(),
            ))?;

        Ok(Self {
            zipline_url,
            api_token: api_token.into(),
            page_size: effective_page_size(stored.page_size),
        })
    }

    /// Fresh client for one command invocation
    pub fn create_client(&self) -> Result<ZiplineClient, ZiplineError> {
        ZiplineClient::new(&self.zipline_url, self.api_token.clone())
    }
}

/// Page size with 0/unset falling back to the default
pub fn effective_page_size(value: Option<u32>) -> u32 {
    value.filter(|v| *v > 0).unwrap_or(DEFAULT_PAGE_SIZE)
}

/// Get the path to the preferences file
pub fn preferences_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
    config_dir.join("zipline-launcher").join("preferences.json")
}

/// Load preferences from `path`, defaults when missing or unreadable
pub fn load_preferences_from(path: &Path) -> StoredPreferences {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(prefs) => return prefs,
                Err(e) => {
                    tracing::warn!("Failed to parse preferences: {}", e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read preferences: {}", e);
            }
        }
    }

    StoredPreferences::default()
}

pub fn load_preferences() -> StoredPreferences {
    load_preferences_from(&preferences_path())
}

/// Save preferences to `path`
pub fn save_preferences_to(path: &Path, prefs: &StoredPreferences) -> Result<(), ZiplineError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(prefs)
        .map_err(|e| ZiplineError::InvalidConfig(format!("Failed to serialize preferences: {}", e)))?;
    fs::write(path, content)?;

    tracing::info!("Preferences saved to {:?}", path);
    Ok(())
}

pub fn save_preferences(prefs: &StoredPreferences) -> Result<(), ZiplineError> {
    save_preferences_to(&preferences_path(), prefs)
}
