//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::recharge::{RechargeClient, RechargeError};
use crate::shopify::{AdminClient, ShopifyError, StorefrontClient};
use crate::stripe::{StripeClient, StripeError};

/// Error constructing a provider client at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateInitError {
    #[error("shopify client: {0}")]
    Shopify(#[from] ShopifyError),
    #[error("recharge client: {0}")]
    Recharge(#[from] RechargeError),
    #[error("stripe client: {0}")]
    Stripe(#[from] StripeError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// four provider clients and the loaded configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    admin: AdminClient,
    storefront: StorefrontClient,
    recharge: RechargeClient,
    stripe: StripeClient,
}

impl AppState {
    /// Create a new application state, constructing one client per provider.
    ///
    /// # Errors
    ///
    /// Returns an error if any provider client fails to build (e.g. a
    /// credential with invalid header characters).
    pub fn new(config: GatewayConfig) -> Result<Self, StateInitError> {
        let admin = AdminClient::new(&config.shopify)?;
        let storefront = StorefrontClient::new(&config.shopify)?;
        let recharge = RechargeClient::new(&config.recharge)?;
        let stripe = StripeClient::new(&config.stripe)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                admin,
                storefront,
                recharge,
                stripe,
            }),
        })
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn admin(&self) -> &AdminClient {
        &self.inner.admin
    }

    /// Get a reference to the Shopify Storefront API client.
    #[must_use]
    pub fn storefront(&self) -> &StorefrontClient {
        &self.inner.storefront
    }

    /// Get a reference to the Recharge API client.
    #[must_use]
    pub fn recharge(&self) -> &RechargeClient {
        &self.inner.recharge
    }

    /// Get a reference to the Stripe API client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{RechargeConfig, ShopifyConfig, StripeConfig};

    fn test_config() -> GatewayConfig {
        GatewayConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            shopify: ShopifyConfig {
                domain: "test.myshopify.com".to_string(),
                api_version: "2023-07".to_string(),
                api_key: "key".to_string(),
                password: SecretString::from("pw"),
                storefront_token: "sf_token".to_string(),
                admin_base_url: None,
                storefront_api_url: None,
            },
            recharge: RechargeConfig {
                api_key: SecretString::from("recharge_key"),
                base_url: "https://api.rechargeapps.com".to_string(),
            },
            stripe: StripeConfig {
                secret_key: SecretString::from("sk_test"),
                base_url: "https://api.stripe.com".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_state_builds_all_clients() {
        let state = AppState::new(test_config()).unwrap();
        assert_eq!(state.config().port, 3000);
    }

    #[test]
    fn test_state_is_clone_send_sync() {
        fn assert_clone_send_sync<T: Clone + Send + Sync>() {}
        assert_clone_send_sync::<AppState>();
    }
}
