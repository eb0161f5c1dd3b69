use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::core::constants::DEFAULT_RELAY_URL;

/// One generation backend endpoint: an Ollama-compatible base URL plus the
/// model to request from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    pub model: String,
}

/// The two backends the command pipeline draws on: `primary` serves quiz
/// generation and is preferred for summaries; `fallback` is tried when a
/// summary request to the primary fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub primary: BackendConfig,
    pub fallback: BackendConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            primary: BackendConfig {
                base_url: "http://localhost:11434".to_string(),
                model: "smollm2:135m-instruct-q4_K_S".to_string(),
            },
            fallback: BackendConfig {
                base_url: "http://localhost:11434".to_string(),
                model: "tinyllama".to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub relay_url: Option<String>,
    pub username: Option<String>,
    /// Dispatch a best-effort physical alert when a peer message arrives.
    #[serde(default)]
    pub notify_on_receive: bool,
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::get_config_path();
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "causerie")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    /// Relay endpoint, falling back to the local default.
    pub fn relay_url(&self) -> String {
        self.relay_url
            .clone()
            .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string())
    }

    /// Local display identity: `CAUSERIE_USERNAME` wins over the config
    /// file, which wins over "anon".
    pub fn username(&self) -> String {
        std::env::var("CAUSERIE_USERNAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| "anon".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.relay_url(), DEFAULT_RELAY_URL);
        assert!(!config.notify_on_receive);
        assert_eq!(config.generation.fallback.model, "tinyllama");
    }

    #[test]
    fn round_trips_through_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.relay_url = Some("ws://relay.lan:8770".to_string());
        config.username = Some("ana".to_string());
        config.notify_on_receive = true;
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.relay_url(), "ws://relay.lan:8770");
        assert_eq!(loaded.username.as_deref(), Some("ana"));
        assert!(loaded.notify_on_receive);
    }

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "username = \"ana\"\n").unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.username.as_deref(), Some("ana"));
        assert_eq!(config.generation.primary.base_url, "http://localhost:11434");
    }
}
