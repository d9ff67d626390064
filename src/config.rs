use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use url::Url;

use crate::client::{ClientConfig, RequestOptions, DEFAULT_API_URL, DEFAULT_API_VERSION};
use crate::error::{MondayError, Result};

pub const TOKEN_ENV: &str = "MONDAY_API_TOKEN";
pub const URL_ENV: &str = "MONDAY_API_URL";

#[derive(Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_token: Option<String>,
    pub api_url: Option<String>,
    pub api_version: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read a config file; a missing file yields the defaults.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(config_path).map_err(|e| MondayError::ConfigRead {
                path: config_path.to_path_buf(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| MondayError::ConfigParse {
            path: config_path.to_path_buf(),
            source: e,
        })
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "monday")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(MondayError::NoConfigDir)
    }

    pub fn request_options(&self) -> RequestOptions {
        let defaults = RequestOptions::default();
        RequestOptions {
            timeout: self
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            retries: self.retries.unwrap_or(defaults.retries),
            retry_delay: self
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        }
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        self.client_config_with(env_var)
    }

    fn api_token_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<String> {
        let present = |token: &String| !token.trim().is_empty();
        env(TOKEN_ENV)
            .filter(present)
            .or_else(|| self.api_token.clone())
            .filter(present)
            .ok_or(MondayError::MissingApiToken)
    }

    fn client_config_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
        let api_token = self.api_token_with(&env)?;

        let raw_url = env(URL_ENV)
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&raw_url).map_err(|_| MondayError::InvalidUrl(raw_url.clone()))?;

        Ok(ClientConfig {
            api_token,
            api_url,
            api_version: self
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            request: self.request_options(),
        })
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
