//! services/client/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub log_level: Level,
    pub http_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load API Settings ---
        let api_base_url = std::env::var("STANDARDS_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();

        // --- Load Session Storage Location ---
        // SESSION_FILE overrides the default slot under the home directory.
        let session_file = match std::env::var("SESSION_FILE") {
            Ok(path) => PathBuf::from(path),
            Err(_) => {
                let home = std::env::var("HOME")
                    .map_err(|_| ConfigError::MissingVar("SESSION_FILE or HOME".to_string()))?;
                PathBuf::from(home)
                    .join(".standards-desk")
                    .join("session.json")
            }
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let timeout_secs_str =
            std::env::var("HTTP_TIMEOUT_SECS").unwrap_or_else(|_| "10".to_string());
        let timeout_secs = timeout_secs_str.parse::<u64>().map_err(|_| {
            ConfigError::InvalidValue(
                "HTTP_TIMEOUT_SECS".to_string(),
                format!("'{}' is not a number of seconds", timeout_secs_str),
            )
        })?;

        Ok(Self {
            api_base_url,
            session_file,
            log_level,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
