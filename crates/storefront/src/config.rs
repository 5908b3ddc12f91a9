//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_API_URL` - Base URL of the commerce API (e.g., <http://localhost:8000>)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!   (default: <http://localhost:3000>; HTTPS turns on secure cookies)
//! - `SHOP_API_TIMEOUT_SECS` - Per-request timeout for API calls (default: 10)
//! - `STOREFRONT_STATIC_DIR` - Directory served at `/static`
//!   (default: the `static/` directory baked in at compile time)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag (e.g., production)
//! - `SENTRY_SAMPLE_RATE` - Error sample rate 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Directory served at `/static`
    pub static_dir: PathBuf,
    /// Commerce API configuration
    pub shop: ShopConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Commerce API configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Base URL the API is mounted at. Endpoint paths are joined onto this.
    pub api_base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
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

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        let static_dir =
            get_optional_env("STOREFRONT_STATIC_DIR").map_or_else(default_static_dir, PathBuf::from);

        let shop = ShopConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = parse_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = parse_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?;

        Ok(Self {
            host,
            port,
            base_url,
            static_dir,
            shop,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = get_required_env("SHOP_API_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOP_API_URL".to_string(), e.to_string()))?;
        let timeout_secs = get_env_or_default("SHOP_API_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOP_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
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

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// The crate's own `static/` directory, resolved at compile time so the
/// binary serves assets no matter where it is launched from.
fn default_static_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}

/// Parse a sample rate variable, falling back to the default when unset.
fn parse_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    get_optional_env(key).map_or(Ok(default), |raw| clamp_sample_rate(key, &raw))
}

/// Parse a raw sample rate, clamping to the 0.0-1.0 range Sentry expects.
fn clamp_sample_rate(key: &str, raw: &str) -> Result<f32, ConfigError> {
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(rate.clamp(0.0, 1.0))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            static_dir: default_static_dir(),
            shop: ShopConfig {
                api_base_url: Url::parse("http://localhost:8000").unwrap(),
                timeout: Duration::from_secs(10),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_api_paths_join_onto_base_url() {
        let config = test_config();
        let endpoint = config.shop.api_base_url.join("/api/products").unwrap();
        assert_eq!(endpoint.as_str(), "http://localhost:8000/api/products");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingEnvVar("SHOP_API_URL".to_string());
        assert_eq!(err.to_string(), "Missing environment variable: SHOP_API_URL");

        let err = ConfigError::InvalidEnvVar(
            "STOREFRONT_PORT".to_string(),
            "invalid digit found in string".to_string(),
        );
        assert_eq!(
            err.to_string(),
            "Invalid environment variable STOREFRONT_PORT: invalid digit found in string"
        );
    }

    #[test]
    fn test_default_static_dir_is_anchored_to_the_crate() {
        let dir = default_static_dir();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("crates/storefront/static"));
    }

    #[test]
    fn test_parse_sample_rate_defaults_when_unset() {
        assert!((parse_sample_rate("TT_TEST_UNSET_RATE", 0.25).unwrap() - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sample_rate_clamps_out_of_range_values() {
        assert!((clamp_sample_rate("SENTRY_SAMPLE_RATE", "1.5").unwrap() - 1.0).abs() < f32::EPSILON);
        assert!((clamp_sample_rate("SENTRY_SAMPLE_RATE", "-0.2").unwrap() - 0.0).abs() < f32::EPSILON);
        assert!((clamp_sample_rate("SENTRY_SAMPLE_RATE", "0.5").unwrap() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sample_rate_rejects_non_numbers() {
        assert!(matches!(
            clamp_sample_rate("SENTRY_SAMPLE_RATE", "always"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }
}
