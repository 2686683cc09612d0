//! services/api/src/config.rs
//!
//! Defines the gateway's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development. The booking backend's base URL
//! deliberately has no default; the chat backend falls back to a local one.

use std::net::SocketAddr;
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
    pub bind_address: SocketAddr,
    /// Base URL of the external booking backend (OTP request/verify).
    pub booking_api_base: String,
    /// Base URL of the external chat backend.
    pub chat_api_base: String,
    /// Origin the site UI is served from, for the CORS layer.
    pub cors_origin: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to ensure tests
    /// are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        // No default here: pointing the OTP flow at a guessed backend would
        // fail in a confusing way at the first submission instead.
        let booking_api_base = std::env::var("BOOKING_API_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("BOOKING_API_BASE_URL".to_string()))?;

        let chat_api_base = std::env::var("CHAT_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8001".to_string());

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            booking_api_base,
            chat_api_base,
            cors_origin,
            log_level,
        })
    }
}
