use crate::client::http::normalize_base_url;
use crate::error::{Result, StockroomError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Keys accepted by `get`/`set`, in display order.
pub const CONFIG_KEYS: &[&str] = &["api-url"];

/// Configuration for stockroom, stored in `config.json` in the config directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockroomConfig {
    /// Root of the product API (e.g., "http://localhost:8080/api")
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for StockroomConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

impl StockroomConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: StockroomConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api-url" => Some(self.api_url.clone()),
            _ => None,
        }
    }

    /// Set a key, validating the value first
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api-url" => {
                let url = normalize_base_url(value)?;
                self.api_url = url.as_str().trim_end_matches('/').to_string();
                Ok(())
            }
            other => Err(StockroomError::Config(format!(
                "Unknown config key: {}",
                other
            ))),
        }
    }
}
