use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::theme::ThemePreference;

const DEFAULT_API_URL: &str = "http://localhost:4111";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub api_url: Option<String>,
    pub theme: Option<ThemePreference>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            api_url: None,
            theme: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::read_from(&Self::get_config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.write_to(&Self::get_config_path()?)
    }

    pub fn save_theme(theme: ThemePreference) -> Result<()> {
        let mut config = Self::load().unwrap_or_else(|_| Self::new());
        config.theme = Some(theme);
        config.save()
    }

    /// Base URL of the weather agent. Environment wins over the config file.
    pub fn resolved_api_url(&self) -> String {
        std::env::var("WEATHER_AGENT_URL")
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn resolved_theme(&self) -> ThemePreference {
        self.theme.unwrap_or_default()
    }

    fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("weather-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_url.is_none());
        assert_eq!(config.resolved_theme(), ThemePreference::Light);
    }

    #[test]
    fn round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_url: Some("https://agent.example.com".to_string()),
            theme: Some(ThemePreference::Dark),
        };
        config.write_to(&path).unwrap();

        let loaded = Config::read_from(&path).unwrap();
        assert_eq!(loaded.api_url.as_deref(), Some("https://agent.example.com"));
        assert_eq!(loaded.theme, Some(ThemePreference::Dark));
    }

    #[test]
    fn config_file_beats_default_url() {
        let config = Config {
            api_url: Some("https://agent.example.com".to_string()),
            theme: None,
        };
        // Only holds when the env override is unset, which is the case in tests.
        if std::env::var("WEATHER_AGENT_URL").is_err() {
            assert_eq!(config.resolved_api_url(), "https://agent.example.com");
        }
    }
}
