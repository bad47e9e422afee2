// src/config/models.rs
use crate::check::CheckPeriod;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub token_refresh: TokenRefreshConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Dashboard origin, e.g. `https://dash.example.com`
    pub base_url: Url,
    /// Initial anti-forgery token, the value the page template injects.
    pub csrf_token: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    pub period: CheckPeriod,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRefreshConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_refresh_path")]
    pub path: String,
    #[serde(default = "default_field_name")]
    pub field_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("base_url {0} cannot be used as a base")]
    InvalidBaseUrl(Url),
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(self.server.base_url.clone()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroInterval("server.request_timeout_secs"));
        }
        if self.check.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("check.poll_interval_ms"));
        }
        if self.token_refresh.interval_secs == 0 {
            return Err(ConfigError::ZeroInterval("token_refresh.interval_secs"));
        }
        if self.token_refresh.path.is_empty() {
            return Err(ConfigError::Empty("token_refresh.path"));
        }
        if self.token_refresh.field_name.is_empty() {
            return Err(ConfigError::Empty("token_refresh.field_name"));
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl CheckConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl TokenRefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            period: CheckPeriod::default(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for TokenRefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_refresh_interval(),
            path: default_refresh_path(),
            field_name: default_field_name(),
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    500
}

fn default_refresh_interval() -> u64 {
    20 * 60
}

fn default_refresh_path() -> String {
    "/api/refresh-csrf".to_string()
}

fn default_field_name() -> String {
    "csrf_token".to_string()
}

fn default_true() -> bool {
    true
}
