//! Stripe API client for payment sources.
//!
//! The gateway only touches the customer and source resources: it creates a
//! card source from a checkout token and attaches it to an existing Stripe
//! customer. Stripe takes `application/x-www-form-urlencoded` request bodies
//! with bracketed nesting (e.g. `owner[email]`), so the write verb is
//! form-encoded rather than JSON.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;

use crate::config::StripeConfig;

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("Stripe API error ({status}): {body}")]
    Api { status: StatusCode, body: Value },

    /// A 2xx response did not have the expected shape.
    #[error("Unexpected Stripe response: {0}")]
    Shape(String),
}

/// Stripe API client.
///
/// Cheap to clone; all clones share one connection pool and the bearer
/// token installed as a default header.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
}

impl StripeClient {
    /// Create a new Stripe client.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key contains invalid header characters
    /// or the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let bearer = format!("Bearer {}", config.secret_key.expose_secret());
        let auth = HeaderValue::from_str(&bearer)
            .map_err(|e| StripeError::Shape(format!("Invalid secret key format: {e}")))?;
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Send a GET request (e.g. `v1/customers/{id}`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Stripe rejects it.
    pub async fn get(&self, path: &str) -> Result<Value, StripeError> {
        let url = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        let response = self.inner.http.get(&url).send().await?;
        Self::handle_response(response).await
    }

    /// Send a form-encoded POST request.
    ///
    /// Nested fields use Stripe's bracket notation, e.g.
    /// `("owner[email]", "a@example.com")`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Stripe rejects it.
    pub async fn post_form(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, StripeError> {
        let url = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));
        let response = self.inner.http.post(&url).form(params).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response(response: reqwest::Response) -> Result<Value, StripeError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text)
                .map_err(|e| StripeError::Shape(format!("invalid JSON in {status} response: {e}")))
        } else {
            let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
            Err(StripeError::Api { status, body })
        }
    }
}
