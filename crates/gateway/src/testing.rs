//! Shared helpers for unit tests.

use secrecy::SecretString;

use crate::config::{GatewayConfig, RechargeConfig, ShopifyConfig, StripeConfig};
use crate::state::AppState;

/// A config whose provider base URLs all point at `base_url` (a mock
/// server), with dummy credentials.
#[must_use]
pub fn config_for(base_url: &str) -> GatewayConfig {
    GatewayConfig {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        port: 0,
        shopify: ShopifyConfig {
            domain: "test.myshopify.com".to_string(),
            api_version: "2023-07".to_string(),
            api_key: "key".to_string(),
            password: SecretString::from("pw"),
            storefront_token: "sf_token".to_string(),
            admin_base_url: Some(base_url.to_string()),
            storefront_api_url: Some(format!("{base_url}/graphql.json")),
        },
        recharge: RechargeConfig {
            api_key: SecretString::from("recharge_key"),
            base_url: base_url.to_string(),
        },
        stripe: StripeConfig {
            secret_key: SecretString::from("sk_test"),
            base_url: base_url.to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// An `AppState` whose clients all talk to `base_url`.
///
/// # Panics
///
/// Panics if a client fails to build from the dummy credentials.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn state_for(base_url: &str) -> AppState {
    AppState::new(config_for(base_url)).unwrap()
}
