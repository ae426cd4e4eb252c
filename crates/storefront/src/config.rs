//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: `http://127.0.0.1:3000`);
//!   an `https` base URL turns on the secure session cookie flag
//! - `STOREFRONT_CATALOG_PATH` - Product seed JSON
//!   (default: crates/storefront/data/catalog.json)
//! - `FREE_DELIVERY_THRESHOLD` - Minimum subtotal for free delivery
//!   (default: 50)
//! - `STANDARD_DELIVERY_PERCENTAGE` - Percentage of subtotal charged as
//!   delivery fee below the threshold (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use thread_harbor_core::DeliveryConfig;

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
    /// Path to the catalog seed file
    pub catalog_path: PathBuf,
    /// Delivery-fee tiering
    pub delivery: DeliveryConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (e.g., "production")
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
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
        let base_url = get_env_or_default("STOREFRONT_BASE_URL", "http://127.0.0.1:3000");
        let catalog_path = PathBuf::from(get_env_or_default(
            "STOREFRONT_CATALOG_PATH",
            "crates/storefront/data/catalog.json",
        ));

        let delivery = DeliveryConfig {
            free_delivery_threshold: get_decimal_or_default("FREE_DELIVERY_THRESHOLD", "50")?,
            standard_delivery_percentage: get_decimal_or_default(
                "STANDARD_DELIVERY_PERCENTAGE",
                "10",
            )?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            catalog_path,
            delivery,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public base URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get an environment variable parsed as an exact decimal.
///
/// Currency configuration must never pass through binary floating point.
fn get_decimal_or_default(key: &str, default: &str) -> Result<Decimal, ConfigError> {
    get_env_or_default(key, default)
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://127.0.0.1:3000".to_string(),
            catalog_path: PathBuf::from("data/catalog.json"),
            delivery: DeliveryConfig {
                free_delivery_threshold: dec("50"),
                standard_delivery_percentage: dec("10"),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure_follows_base_url_scheme() {
        let mut config = config();
        assert!(!config.is_secure());

        config.base_url = "https://shop.example.com".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_decimal_parsing_is_exact() {
        // The delivery percentage must survive as an exact decimal, not a
        // float approximation.
        assert_eq!(dec("10") / Decimal::ONE_HUNDRED, dec("0.1"));
    }
}
