use serde::Deserialize;
use std::env::{self, VarError};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants;
use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub data: DataConfig,
    /// Pins the year used for passport age. Falls back to the local clock at
    /// the CLI boundary when absent.
    pub current_year: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
    /// Name of the environment variable holding the bearer token
    pub token_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: 10,
            token_env: constants::API_TOKEN_ENV.to_string(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Reads the bearer token from the configured variable. An unset or blank
    /// variable means requests go out unauthenticated; a value that is not
    /// valid unicode is an error.
    pub fn token(&self) -> Result<Option<String>> {
        match env::var(&self.token_env) {
            Ok(token) => {
                let token = token.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(VarError::NotPresent) => Ok(None),
            Err(e) => Err(MonitorError::Env(e)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dataset_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: constants::DEFAULT_DATASET_PATH.to_string(),
        }
    }
}

impl Config {
    /// Loads `.env` and then the TOML config at `config_path`. A missing file
    /// yields the defaults; a file that exists but does not parse is an error.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let config_path = config_path.as_ref();
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path).map_err(|e| {
            MonitorError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.api.base_url.trim().is_empty() {
            return Err(MonitorError::Config("api.base_url must not be empty".to_string()));
        }
        Ok(config)
    }
}
