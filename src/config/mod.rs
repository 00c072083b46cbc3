//! Configuration system for Aurora
//!
//! Supports loading configuration from:
//! 1. CLI --config argument
//! 2. ~/.config/aurora/config.{AURORA_ENV}.json
//! 3. Default values
//!
//! Where AURORA_ENV can be: production (default), development, test
//!
//! # Examples
//!
//! ```no_run
//! use aurora::config::AppConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! println!("Analysis endpoint: {}", config.analyze_url());
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variables
//!
//! Environment variables override config file values:
//! - AURORA_API_URL
//! - AURORA_USER_ID
//! - AURORA_USE_MOCK
//! - AURORA_IDLE_TIMEOUT_SECS

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the analysis service
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Path of the streaming analysis endpoint
    #[serde(default = "default_analyze_path")]
    pub analyze_path: String,

    /// Path of the login endpoint
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// User id sent with every analysis request
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Authenticate against the built-in demo users instead of the service
    #[serde(default)]
    pub use_mock: bool,

    /// Close a stream that stays silent this long. Unset means wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_timeout_secs: Option<u64>,

    /// Connect timeout for streams, total timeout for login requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Buffered updates between the stream task and the consumer
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Preferred UI language ("zh" or "en", defaults to system locale)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_analyze_path() -> String {
    "/api/v1/analyze-intent".to_string()
}

fn default_login_path() -> String {
    "/api/v1/login".to_string()
}

fn default_user_id() -> String {
    "default_user".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            analyze_path: default_analyze_path(),
            login_path: default_login_path(),
            user_id: default_user_id(),
            use_mock: false,
            idle_timeout_secs: None,
            request_timeout_secs: default_request_timeout(),
            channel_capacity: default_channel_capacity(),
            language: None, // Will use system locale by default
            debug: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = serde_json::from_str(&content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration with standard priority:
    /// 1. Explicit path
    /// 2. ~/.config/aurora/config.{AURORA_ENV}.json
    /// 3. Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit_path {
            if path.exists() {
                tracing::info!("Loading config from: {:?}", path);
                return Self::from_file(path);
            } else {
                return Err(ConfigError::ValidationError(format!(
                    "Config file not found: {:?}",
                    path
                )));
            }
        }

        let env = std::env::var("AURORA_ENV").unwrap_or_else(|_| "production".to_string());

        if let Some(config_dir) = Self::config_dir() {
            let config_path = config_dir.join(format!("config.{}.json", env));

            if config_path.exists() {
                tracing::info!("Loading config from: {:?}", config_path);
                return Self::from_file(&config_path);
            }
        }

        tracing::info!("Using default configuration with environment overrides");
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("AURORA_API_URL") {
            self.api_url = url;
        }

        if let Ok(user_id) = std::env::var("AURORA_USER_ID") {
            self.user_id = user_id;
        }

        if let Ok(use_mock) = std::env::var("AURORA_USE_MOCK") {
            self.use_mock = parse_flag(&use_mock);
        }

        if let Ok(secs) = std::env::var("AURORA_IDLE_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(0) => self.idle_timeout_secs = None,
                Ok(secs) => self.idle_timeout_secs = Some(secs),
                Err(_) => tracing::warn!("Ignoring invalid AURORA_IDLE_TIMEOUT_SECS: {}", secs),
            }
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_url cannot be empty".to_string(),
            ));
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "api_url must be an http(s) URL, got {}",
                self.api_url
            )));
        }

        for (name, path) in [("analyze_path", &self.analyze_path), ("login_path", &self.login_path)] {
            if !path.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must start with '/', got {:?}",
                    name, path
                )));
            }
        }

        if self.user_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "user_id cannot be empty".to_string(),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "channel_capacity must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.idle_timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError(
                "idle_timeout_secs must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }

    /// Full URL of the streaming analysis endpoint
    pub fn analyze_url(&self) -> String {
        join_url(&self.api_url, &self.analyze_path)
    }

    /// Full URL of the login endpoint
    pub fn login_url(&self) -> String {
        join_url(&self.api_url, &self.login_path)
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("aurora"))
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1" || value.eq_ignore_ascii_case("yes")
}
