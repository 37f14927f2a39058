//! Gateway configuration loaded from environment variables.
//!
//! Every credential is required at startup: a missing variable fails process
//! launch instead of failing the first request that needs it.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_API_KEY` - Admin API key (basic-auth username)
//! - `SHOPIFY_PASSWORD` - Admin API password (basic-auth password)
//! - `SHOPIFY_STOREFRONT_KEY` - Storefront API access token
//! - `RECHARGE_API_KEY` - Recharge private API token
//! - `STRIPE_API_KEY` - Stripe secret key
//!
//! ## Optional
//! - `GATEWAY_HOST` - Bind address (default: 127.0.0.1)
//! - `GATEWAY_PORT` - Listen port (default: 3000, falls back to `PORT`)
//! - `SHOPIFY_API_VERSION` - API version (default: 2023-07)
//! - `SHOPIFY_ADMIN_API_BASE_URL` - Admin REST base override (staging/mocks)
//! - `SHOPIFY_STOREFRONT_API_URL` - Storefront GraphQL endpoint override
//! - `RECHARGE_API_BASE_URL` - Recharge base override (default: https://api.rechargeapps.com)
//! - `STRIPE_API_BASE_URL` - Stripe base override (default: https://api.stripe.com)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_SHOPIFY_API_VERSION: &str = "2023-07";
const DEFAULT_RECHARGE_BASE_URL: &str = "https://api.rechargeapps.com";
const DEFAULT_STRIPE_BASE_URL: &str = "https://api.stripe.com";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Gateway application configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify (commerce platform) configuration
    pub shopify: ShopifyConfig,
    /// Recharge (subscription billing) configuration
    pub recharge: RechargeConfig,
    /// Stripe (payment processor) configuration
    pub stripe: StripeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify API configuration covering both the admin and storefront surfaces.
///
/// Implements `Debug` manually to redact the admin password.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub domain: String,
    /// Shopify API version (e.g., 2023-07)
    pub api_version: String,
    /// Admin API key (basic-auth username)
    pub api_key: String,
    /// Admin API password (basic-auth password)
    pub password: SecretString,
    /// Storefront API access token
    pub storefront_token: String,
    /// Admin REST base URL override; derived from domain + version when unset
    pub admin_base_url: Option<String>,
    /// Storefront GraphQL endpoint override; derived when unset
    pub storefront_api_url: Option<String>,
}

impl ShopifyConfig {
    /// The admin REST base URL, e.g. `https://store.myshopify.com/admin/api/2023-07`.
    #[must_use]
    pub fn admin_endpoint(&self) -> String {
        self.admin_base_url.clone().unwrap_or_else(|| {
            format!("https://{}/admin/api/{}", self.domain, self.api_version)
        })
    }

    /// The storefront GraphQL endpoint, e.g. `https://store.myshopify.com/api/2023-07/graphql.json`.
    #[must_use]
    pub fn storefront_endpoint(&self) -> String {
        self.storefront_api_url.clone().unwrap_or_else(|| {
            format!("https://{}/api/{}/graphql.json", self.domain, self.api_version)
        })
    }
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("domain", &self.domain)
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key)
            .field("password", &"[REDACTED]")
            .field("storefront_token", &self.storefront_token)
            .field("admin_base_url", &self.admin_base_url)
            .field("storefront_api_url", &self.storefront_api_url)
            .finish()
    }
}

/// Recharge API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct RechargeConfig {
    /// Private API access token
    pub api_key: SecretString,
    /// API base URL
    pub base_url: String,
}

impl std::fmt::Debug for RechargeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RechargeConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Stripe API configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret key (sk_...)
    pub secret_key: SecretString,
    /// API base URL
    pub base_url: String,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any required variable is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("GATEWAY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("GATEWAY_HOST".to_string(), e.to_string()))?;
        let port = get_port()?;

        let shopify = ShopifyConfig::from_env()?;
        let recharge = RechargeConfig::from_env()?;
        let stripe = StripeConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_rate("SENTRY_SAMPLE_RATE", 1.0)?;
        let sentry_traces_sample_rate = get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?;

        Ok(Self {
            host,
            port,
            shopify,
            recharge,
            stripe,
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

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            domain: get_required_env("SHOPIFY_DOMAIN")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
            api_key: get_required_env("SHOPIFY_API_KEY")?,
            password: get_required_secret("SHOPIFY_PASSWORD")?,
            storefront_token: get_required_env("SHOPIFY_STOREFRONT_KEY")?,
            admin_base_url: get_optional_env("SHOPIFY_ADMIN_API_BASE_URL"),
            storefront_api_url: get_optional_env("SHOPIFY_STOREFRONT_API_URL"),
        })
    }
}

impl RechargeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_secret("RECHARGE_API_KEY")?,
            base_url: get_env_or_default("RECHARGE_API_BASE_URL", DEFAULT_RECHARGE_BASE_URL),
        })
    }
}

impl StripeConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret_key: get_required_secret("STRIPE_API_KEY")?,
            base_url: get_env_or_default("STRIPE_API_BASE_URL", DEFAULT_STRIPE_BASE_URL),
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

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get the listen port, honoring `GATEWAY_PORT` then the generic `PORT`
/// (set by most PaaS runtimes).
fn get_port() -> Result<u16, ConfigError> {
    let (key, raw) = if let Ok(value) = std::env::var("GATEWAY_PORT") {
        ("GATEWAY_PORT", value)
    } else if let Ok(value) = std::env::var("PORT") {
        ("PORT", value)
    } else {
        ("GATEWAY_PORT", "3000".to_string())
    };

    raw.parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Get a sample-rate variable, validated to the 0.0..=1.0 range.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };

    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }

    Ok(rate)
}
