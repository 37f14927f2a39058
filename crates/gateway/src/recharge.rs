//! Recharge API client for subscription billing.
//!
//! Covers customers, addresses, subscriptions, checkouts, charges, one-time
//! items, discounts, and metafields. The gateway treats Recharge payloads as
//! opaque JSON: every verb returns the parsed response body unmodified, and
//! callers extract the identifiers they need.

use std::sync::Arc;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use thiserror::Error;

use crate::config::RechargeConfig;

/// Errors that can occur when interacting with the Recharge API.
#[derive(Debug, Error)]
pub enum RechargeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("Recharge API error ({status}): {body}")]
    Api { status: StatusCode, body: Value },

    /// A 2xx response did not have the expected shape.
    #[error("Unexpected Recharge response: {0}")]
    Shape(String),
}

/// Recharge API client.
///
/// Cheap to clone; all clones share one connection pool and the access token
/// installed as a default header.
#[derive(Clone)]
pub struct RechargeClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
}

impl RechargeClient {
    /// Create a new Recharge client.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token contains invalid header
    /// characters or the HTTP client fails to build.
    pub fn new(config: &RechargeConfig) -> Result<Self, RechargeError> {
        let mut headers = HeaderMap::new();

        let token = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| RechargeError::Shape(format!("Invalid access token format: {e}")))?;
        headers.insert("X-Recharge-Access-Token", token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Send a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Recharge rejects it.
    pub async fn get(&self, path: &str) -> Result<Value, RechargeError> {
        self.execute(Method::GET, path, None).await
    }

    /// Send a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Recharge rejects it.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, RechargeError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    /// Send a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Recharge rejects it.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, RechargeError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    /// Send a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Recharge rejects it.
    pub async fn delete(&self, path: &str) -> Result<Value, RechargeError> {
        self.execute(Method::DELETE, path, None).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, RechargeError> {
        let url = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));

        let mut request = self.inner.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text)
                .map_err(|e| RechargeError::Shape(format!("invalid JSON in {status} response: {e}")))
        } else {
            let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
            Err(RechargeError::Api { status, body })
        }
    }
}
