use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Literal substituted when no API key is configured anywhere.
pub const PLACEHOLDER_CREDENTIAL: &str = "YOUR_API_KEY";

/// Environment variable that takes precedence over the config file.
pub const API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Settings handed to [`crate::WeatherClient::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub credential: String,
}

impl ClientConfig {
    pub fn new(credential: impl Into<String>) -> Self {
        Self { credential: credential.into() }
    }

    /// Empty or placeholder credentials count as "not configured".
    /// No format checks beyond that.
    pub fn is_configured(&self) -> bool {
        !self.credential.is_empty() && self.credential != PLACEHOLDER_CREDENTIAL
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(PLACEHOLDER_CREDENTIAL)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_key = "..."
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Resolve the credential: `WEATHER_API_KEY`, then the file, then the placeholder.
    pub fn credential(&self) -> String {
        self.credential_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn credential_with_env(&self, env_value: Option<String>) -> String {
        env_value
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_key.clone().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| PLACEHOLDER_CREDENTIAL.to_string())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.credential())
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
