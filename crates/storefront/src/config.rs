//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_BASE_URL` - Base URL of the storefront JSON API
//!   (e.g., `http://localhost:5000`)
//!
//! ## Optional
//! - `STOREFRONT_STATE_DIR` - Directory for persisted client state
//!   (default: `$HOME/.cartwright`)
//! - `STOREFRONT_REQUEST_TIMEOUT_SECS` - Per-request HTTP timeout in
//!   seconds (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STATE_DIR_NAME: &str = ".cartwright";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the backend JSON API
    pub api_base_url: Url,
    /// Directory holding persisted client state (the user identifier file)
    pub state_dir: PathBuf,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(&get_required_env("STOREFRONT_API_BASE_URL")?)?;
        let state_dir = std::env::var("STOREFRONT_STATE_DIR")
            .map_or_else(|_| default_state_dir(), PathBuf::from);
        let request_timeout = parse_timeout(get_optional_env("STOREFRONT_REQUEST_TIMEOUT_SECS"))?;

        Ok(Self {
            api_base_url,
            state_dir,
            request_timeout,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse and normalize the API base URL.
///
/// A trailing slash is required for relative joins to behave, so one is
/// appended when missing.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let normalized = if raw.ends_with('/') {
        raw.to_owned()
    } else {
        format!("{raw}/")
    };

    Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_API_BASE_URL".to_string(), e.to_string()))
}

/// Parse the request timeout, falling back to the default when unset.
fn parse_timeout(raw: Option<String>) -> Result<Duration, ConfigError> {
    let secs = match raw {
        Some(value) => value.parse::<u64>().map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?,
        None => DEFAULT_REQUEST_TIMEOUT_SECS,
    };

    Ok(Duration::from_secs(secs))
}

/// Default state directory: `$HOME/.cartwright`, or a `.cartwright`
/// directory next to the working directory when no home is available.
fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(DEFAULT_STATE_DIR_NAME),
        |home| PathBuf::from(home).join(DEFAULT_STATE_DIR_NAME),
    )
}
