//! # Configuration Module
//!
//! This module handles loading and validating configuration from
//! environment variables. All settings are centralized here.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = AppConfig::from_env()?;
//! println!("Listening on {}:{}", config.server_host, config.server_port);
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SERVER_HOST` | HTTP server host | `127.0.0.1` |
//! | `SERVER_PORT` | HTTP server port | `8080` |
//! | `LOG_LEVEL` | Max tracing level | `debug` |
//! | `GEMINI_API_KEY` | Key for bounty description generation | unset |
//! | `GEMINI_MODEL` | Model used for generation | `gemini-2.5-flash` |
//! | `GEMINI_API_URL` | Base URL of the generation API | Google endpoint |
//! | `DEFAULT_BOUNTY_CAPACITY` | Sign-up capacity for new bounties | `5` |
//! | `MONITOR_INTERVAL` | Seconds between ledger summaries | `60` |
//! | `SEED_MOCK_DATA` | Load the demo catalog at start-up | `true` |

use std::env;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An environment variable has an invalid value
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// Failed to parse a value
    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

/// Application configuration loaded from environment variables.
///
/// Every setting has a default, so an empty environment yields a working
/// development server seeded with the demo catalog.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // ==========================================
    // SERVER SETTINGS
    // ==========================================

    /// HTTP server host address.
    ///
    /// Use `127.0.0.1` for localhost only, `0.0.0.0` to accept
    /// connections from any interface.
    pub server_host: String,

    /// HTTP server port number.
    pub server_port: u16,

    /// Maximum log level passed to the tracing subscriber.
    pub log_level: String,

    // ==========================================
    // DESCRIPTION GENERATOR SETTINGS
    // ==========================================

    /// API key for the text-generation service.
    ///
    /// When absent the generator answers with a fixed placeholder
    /// instead of calling out.
    pub gemini_api_key: Option<String>,

    /// Model name inserted into the request path.
    pub gemini_model: String,

    /// Base URL of the generation API (without the model path).
    pub gemini_api_url: String,

    // ==========================================
    // PLATFORM SETTINGS
    // ==========================================

    /// Capacity given to bounties created without an explicit limit.
    pub default_bounty_capacity: u32,

    /// How often the ledger monitor logs platform totals (in seconds).
    pub monitor_interval: u64,

    /// Whether the store starts with the demo catalog loaded.
    pub seed_mock_data: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Use `dotenvy::dotenv()` before calling this to load from `.env` file.
    ///
    /// ## Returns
    ///
    /// - `Ok(AppConfig)` - Configuration loaded successfully
    /// - `Err(ConfigError)` - A variable is present but malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_bounty_capacity: u32 = get_env_or_default("DEFAULT_BOUNTY_CAPACITY", "5")
            .parse()
            .map_err(|e| ConfigError::ParseError(
                "DEFAULT_BOUNTY_CAPACITY".to_string(),
                format!("{}", e),
            ))?;

        if default_bounty_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "DEFAULT_BOUNTY_CAPACITY".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            // Server
            server_host: get_env_or_default("SERVER_HOST", "127.0.0.1"),
            server_port: get_env_or_default("SERVER_PORT", "8080")
                .parse()
                .map_err(|e| ConfigError::ParseError(
                    "SERVER_PORT".to_string(),
                    format!("{}", e),
                ))?,
            log_level: get_env_or_default("LOG_LEVEL", "debug"),

            // Description generator
            gemini_api_key: get_optional_env("GEMINI_API_KEY"),
            gemini_model: get_env_or_default("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_api_url: get_env_or_default(
                "GEMINI_API_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),

            // Platform
            default_bounty_capacity,
            monitor_interval: get_env_or_default("MONITOR_INTERVAL", "60")
                .parse()
                .unwrap_or(60),
            seed_mock_data: parse_bool(&get_env_or_default("SEED_MOCK_DATA", "true")),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            log_level: "debug".to_string(),
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            gemini_api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            default_bounty_capacity: 5,
            monitor_interval: 60,
            seed_mock_data: true,
        }
    }
}

/// Get an environment variable with a default value.
///
/// Returns the default if the variable is not set.
fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_env_or_default() {
        // Should return default when not set
        let value = get_env_or_default("NONEXISTENT_VAR_12345", "default_value");
        assert_eq!(value, "default_value");
    }

    #[test]
    fn test_optional_env_missing() {
        assert!(get_optional_env("NONEXISTENT_VAR_67890").is_none());
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" YES "));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("nope"));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.default_bounty_capacity, 5);
        assert!(config.gemini_api_key.is_none());
        assert!(config.seed_mock_data);
    }
}
