//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `REDSEAM_API_URL` - Base URL of the remote commerce API
//!
//! ## Optional
//! - `REDSEAM_STATE_DIR` - Directory for client-local state (persisted
//!   credentials and the guest cart). Defaults to `~/.redseam`, or
//!   `.redseam` in the working directory when no home is available.
//! - `REDSEAM_USER_AGENT` - User-Agent header for outgoing requests
//!   (default: `redseam-client/0.1`)

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

const DEFAULT_USER_AGENT: &str = "redseam-client/0.1";

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
    /// Base URL of the remote commerce API.
    pub api_base_url: Url,
    /// Directory holding persisted credentials and the guest cart file.
    pub state_dir: PathBuf,
    /// User-Agent header sent with every request.
    pub user_agent: String,
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

        let api_url = get_required_env("REDSEAM_API_URL")?;
        let state_dir = get_optional_env("REDSEAM_STATE_DIR");
        let user_agent = get_env_or_default("REDSEAM_USER_AGENT", DEFAULT_USER_AGENT);

        Self::build(&api_url, state_dir.as_deref(), user_agent)
    }

    /// Build a configuration from raw values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the API URL does not parse.
    pub fn build(
        api_url: &str,
        state_dir: Option<&str>,
        user_agent: String,
    ) -> Result<Self, ConfigError> {
        let api_base_url = Url::parse(api_url).map_err(|e| {
            ConfigError::InvalidEnvVar("REDSEAM_API_URL".to_string(), e.to_string())
        })?;

        let state_dir = state_dir.map_or_else(default_state_dir, PathBuf::from);

        Ok(Self {
            api_base_url,
            state_dir,
            user_agent,
        })
    }

    /// Path of the persisted credential file.
    #[must_use]
    pub fn credentials_path(&self) -> PathBuf {
        self.state_dir.join("credentials.json")
    }

    /// Path of the guest fallback cart file.
    #[must_use]
    pub fn guest_cart_path(&self) -> PathBuf {
        self.state_dir.join("guest-cart.json")
    }

    /// Create a configuration rooted at an explicit state directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the API URL does not parse.
    pub fn with_state_dir(api_url: &str, state_dir: &Path) -> Result<Self, ConfigError> {
        Self::build(
            api_url,
            state_dir.to_str(),
            DEFAULT_USER_AGENT.to_string(),
        )
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

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Default client-local state directory.
fn default_state_dir() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from(".redseam"),
        |home| PathBuf::from(home).join(".redseam"),
    )
}
