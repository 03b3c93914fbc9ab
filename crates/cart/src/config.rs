//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CART_API_URL` - Base URL of the inventory API (serves `/products/{id}` and `/stock/{id}`).
//!   Not needed by [`LocalConfig`], which only reads the snapshot.
//!
//! ## Optional
//! - `CART_API_TOKEN` - Bearer token sent with every inventory request
//! - `CART_SNAPSHOT_DIR` - Directory holding the snapshot file (default: .)
//! - `CART_SNAPSHOT_KEY` - Snapshot key, used as the file stem (default: rocketshoes-cart)
//! - `CART_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `CART_CATALOG_CACHE_TTL_SECS` - How long product attributes are cached (default: 300)
//! - `CART_CURRENCY` - ISO 4217 code used to display prices (default: BRL)

use std::path::PathBuf;
use std::time::Duration;

use rocket_cart_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_SNAPSHOT_KEY: &str = "rocketshoes-cart";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Complete cart configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Inventory API configuration
    pub api: ApiConfig,
    /// Snapshot location
    pub snapshot: SnapshotConfig,
    /// Currency used to display prices
    pub currency: CurrencyCode,
}

/// Settings for reading and displaying the saved cart.
///
/// A subset of [`CartConfig`] that does not require the inventory API.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Snapshot location
    pub snapshot: SnapshotConfig,
    /// Currency used to display prices
    pub currency: CurrencyCode,
}

/// Inventory API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; resource paths are appended to it
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Catalog cache time-to-live
    pub catalog_cache_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for `base_url` with default timeout and cache TTL and no token.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
        }
    }

    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("CART_API_URL", &get_required_env("CART_API_URL")?)?,
            token: get_optional_env("CART_API_TOKEN").map(SecretString::from),
            timeout: get_secs_or_default("CART_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            catalog_cache_ttl: get_secs_or_default(
                "CART_CATALOG_CACHE_TTL_SECS",
                DEFAULT_CATALOG_CACHE_TTL_SECS,
            )?,
        })
    }
}

/// Where the cart snapshot lives.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub dir: PathBuf,
    pub key: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            key: DEFAULT_SNAPSHOT_KEY.to_string(),
        }
    }
}

impl SnapshotConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let dir = PathBuf::from(get_env_or_default("CART_SNAPSHOT_DIR", "."));
        let key = get_env_or_default("CART_SNAPSHOT_KEY", DEFAULT_SNAPSHOT_KEY);
        validate_snapshot_key("CART_SNAPSHOT_KEY", &key)?;
        Ok(Self { dir, key })
    }
}

impl LocalConfig {
    /// Load snapshot and display settings from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            snapshot: SnapshotConfig::from_env()?,
            currency: parse_currency("CART_CURRENCY", &get_env_or_default("CART_CURRENCY", "BRL"))?,
        })
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let LocalConfig { snapshot, currency } = LocalConfig::from_env()?;
        let api = ApiConfig::from_env()?;

        Ok(Self {
            api,
            snapshot,
            currency,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a currency code.
fn parse_currency(var_name: &str, raw: &str) -> Result<CurrencyCode, ConfigError> {
    raw.parse::<CurrencyCode>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get a duration in whole seconds with a default value.
fn get_secs_or_default(key: &str, default: u64) -> Result<Duration, ConfigError> {
    get_optional_env(key).map_or(Ok(Duration::from_secs(default)), |raw| {
        parse_secs(key, &raw)
    })
}

/// Parse a positive number of seconds.
fn parse_secs(var_name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse an http(s) base URL.
fn parse_base_url(var_name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Snapshot keys become file names, so they must be a single plain path component.
fn validate_snapshot_key(var_name: &str, key: &str) -> Result<(), ConfigError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '@'));
    if !valid {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("'{key}' is not a valid snapshot key"),
        ));
    }
    Ok(())
}
