//! Configuration module for FileVault.

use serde::Deserialize;
use std::path::Path;

use crate::{FileVaultError, Result};

/// Environment variable overriding the backend base address.
pub const API_URL_ENV: &str = "FILEVAULT_API_URL";

/// Environment variable overriding the session file location.
pub const SESSION_FILE_ENV: &str = "FILEVAULT_SESSION_FILE";

/// Backend API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base address every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_user_agent() -> String {
    concat!("filevault/", env!("CARGO_PKG_VERSION")).to_string()
}

impl ApiConfig {
    /// Check that the base address is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            FileVaultError::Config(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FileVaultError::Config(format!(
                "unsupported base_url scheme: {scheme}"
            ))),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

/// Session persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path to the JSON file holding persisted token slots.
    #[serde(default = "default_session_file")]
    pub file: String,
}

fn default_session_file() -> String {
    "data/session.json".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Console-only logging when unset.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Backend API configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Session persistence configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FileVaultError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FileVaultError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEVAULT_API_URL`: Override the backend base address
    /// - `FILEVAULT_SESSION_FILE`: Override the session file path
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(file) = lookup(SESSION_FILE_ENV).filter(|v| !v.is_empty()) {
            self.session.file = file;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the base address is not an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        self.api.validate()
    }
}
