//! Integration tests for the Tiny Greens gateway.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tiny-greens-integration-tests
//! ```
//!
//! No external services are required. Each test boots the gateway router
//! on an ephemeral port with every provider base URL pointed at a single
//! wiremock server, then drives it over HTTP the way the storefront
//! frontend does.
//!
//! One mock server can play Shopify, Recharge and Stripe at once because
//! their paths never collide: Shopify admin REST paths end in `.json`,
//! the storefront GraphQL endpoint is `/graphql.json`, Stripe lives under
//! `/v1`, and everything else is Recharge.

use std::net::Ipv4Addr;

use axum::ServiceExt;
use axum::extract::Request;
use reqwest::Client;
use secrecy::SecretString;
use tiny_greens_gateway::config::{GatewayConfig, RechargeConfig, ShopifyConfig, StripeConfig};
use tiny_greens_gateway::state::AppState;
use wiremock::MockServer;

/// A gateway instance listening on an ephemeral port, wired to a mock
/// upstream that stands in for all three providers.
pub struct TestGateway {
    /// Plain reqwest client for driving the gateway
    pub client: Client,
    /// Base URL of the running gateway, e.g. `http://127.0.0.1:49152`
    pub base_url: String,
    /// The mock upstream; mount provider expectations here
    pub upstream: MockServer,
}

impl TestGateway {
    /// Boot a gateway against a fresh mock upstream.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or the provider clients
    /// cannot be constructed; a test has no use for a half-started
    /// gateway.
    pub async fn start() -> Self {
        let upstream = MockServer::start().await;

        let state = AppState::new(test_config(&upstream.uri()))
            .expect("Failed to construct provider clients");
        let app = tiny_greens_gateway::app(state);

        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no local addr");

        tokio::spawn(async move {
            axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
                .await
                .expect("Test server error");
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            upstream,
        }
    }

    /// Absolute URL for a gateway path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Gateway configuration with every provider pointed at the mock upstream.
fn test_config(upstream: &str) -> GatewayConfig {
    GatewayConfig {
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        shopify: ShopifyConfig {
            domain: "tiny-greens.myshopify.com".to_string(),
            api_version: "2023-07".to_string(),
            api_key: "shopify_api_key".to_string(),
            password: SecretString::from("shopify_password"),
            storefront_token: "storefront_token".to_string(),
            admin_base_url: Some(upstream.to_string()),
            storefront_api_url: Some(format!("{upstream}/graphql.json")),
        },
        recharge: RechargeConfig {
            api_key: SecretString::from("recharge_token"),
            base_url: upstream.to_string(),
        },
        stripe: StripeConfig {
            secret_key: SecretString::from("sk_test_token"),
            base_url: upstream.to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}
