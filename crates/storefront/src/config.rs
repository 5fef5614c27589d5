//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GLASSCART_API_BASE_URL` - Base URL of the shop REST backend
//!   (default: `http://127.0.0.1:8000`)
//! - `GLASSCART_STORAGE_PATH` - File holding persisted client state such as
//!   the bearer token (default: `.glasscart/storage.json`)
//! - `GLASSCART_USER_AGENT` - Overrides the HTTP `User-Agent` header

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Delay before filter changes are reported to the product grid.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(300);

/// Delay before the animator starts observing freshly mounted elements.
pub const ANIMATE_DELAY: Duration = Duration::from_millis(100);

/// Fraction of an element that must be in view before it is revealed.
pub const ANIMATE_THRESHOLD: f64 = 0.15;

/// Delay between a successful signup and the redirect to the login page.
pub const SIGNUP_REDIRECT_DELAY: Duration = Duration::from_millis(800);

/// How long the navigation cart label shows the `+1` indicator.
pub const CART_BADGE_DURATION: Duration = Duration::from_millis(1200);

/// Number of products shown when the featured list falls back to the catalog.
pub const FEATURED_FALLBACK_LIMIT: usize = 6;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_STORAGE_PATH: &str = ".glasscart/storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL every API path is resolved against
    pub api_base_url: Url,
    /// Location of the persistent key-value store
    pub storage_path: PathBuf,
    /// Custom `User-Agent` header, if any
    pub user_agent: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_base_url(
            "GLASSCART_API_BASE_URL",
            &get_env_or_default("GLASSCART_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let storage_path =
            PathBuf::from(get_env_or_default("GLASSCART_STORAGE_PATH", DEFAULT_STORAGE_PATH));
        let user_agent = get_optional_env("GLASSCART_USER_AGENT");

        Ok(Self {
            api_base_url,
            storage_path,
            user_agent,
        })
    }

    /// Configuration pointing at an explicit backend, with default storage.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `base_url` is not an http(s) URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url("api_base_url", base_url)?,
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            user_agent: None,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse and normalise the API base URL.
///
/// The path always ends in `/` so that relative API paths join under it
/// instead of replacing its last segment.
fn parse_base_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
