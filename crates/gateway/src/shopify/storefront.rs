//! Shopify Storefront GraphQL API client.
//!
//! Read-only catalog access. Queries are fixed documents posted to the
//! store's GraphQL endpoint; the connection wrappers Shopify returns
//! (`edges`/`node`) are flattened into plain arrays so downstream consumers
//! see `{"variants": […]}` instead of `{"variants": {"edges": […]}}`.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;

use super::ShopifyError;
use crate::config::ShopifyConfig;

const PRODUCTS_QUERY: &str = r"
query {
  products(first: 250) {
    edges {
      node {
        id
        title
        handle
        description
        productType
        availableForSale
        images(first: 10) {
          edges {
            node {
              url
              altText
            }
          }
        }
        variants(first: 50) {
          edges {
            node {
              id
              title
              availableForSale
              price {
                amount
                currencyCode
              }
            }
          }
        }
      }
    }
  }
}
";

const COLLECTIONS_WITH_PRODUCTS_QUERY: &str = r"
query {
  collections(first: 50) {
    edges {
      node {
        id
        title
        handle
        description
        products(first: 100) {
          edges {
            node {
              id
              title
              handle
              productType
              availableForSale
            }
          }
        }
      }
    }
  }
}
";

/// Shopify Storefront API client.
#[derive(Clone)]
pub struct StorefrontClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    endpoint: String,
}

impl StorefrontClient {
    /// Create a new Storefront API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token contains invalid header
    /// characters or the HTTP client fails to build.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let mut headers = HeaderMap::new();

        let token = HeaderValue::from_str(&config.storefront_token)
            .map_err(|e| ShopifyError::Shape(format!("Invalid access token format: {e}")))?;
        headers.insert("X-Shopify-Storefront-Access-Token", token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                endpoint: config.storefront_endpoint(),
            }),
        })
    }

    /// Fetch the full product catalog as a flattened array.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the query is rejected, or the
    /// response is missing the product connection.
    pub async fn products(&self) -> Result<Value, ShopifyError> {
        let mut data = self.query(PRODUCTS_QUERY).await?;

        data.get_mut("products").map(Value::take).map_or_else(
            || {
                Err(ShopifyError::Shape(
                    "products missing from storefront response".to_string(),
                ))
            },
            |products| Ok(flatten_connections(products)),
        )
    }

    /// Fetch all collections with their products, flattened.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the query is rejected, or the
    /// response is missing the collection connection.
    pub async fn collections_with_products(&self) -> Result<Value, ShopifyError> {
        let mut data = self.query(COLLECTIONS_WITH_PRODUCTS_QUERY).await?;

        data.get_mut("collections").map(Value::take).map_or_else(
            || {
                Err(ShopifyError::Shape(
                    "collections missing from storefront response".to_string(),
                ))
            },
            |collections| Ok(flatten_connections(collections)),
        )
    }

    /// Post a GraphQL document and return the `data` payload.
    async fn query(&self, document: &str) -> Result<Value, ShopifyError> {
        let body = serde_json::json!({ "query": document });

        let response = self
            .inner
            .http
            .post(&self.inner.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
            return Err(ShopifyError::Api { status, body });
        }

        let mut parsed: Value = serde_json::from_str(&text)
            .map_err(|e| ShopifyError::Shape(format!("invalid JSON in {status} response: {e}")))?;

        if let Some(errors) = parsed.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                return Err(ShopifyError::GraphQL(format_graphql_errors(errors)));
            }
        }

        match parsed.get_mut("data").map(Value::take) {
            Some(data @ Value::Object(_)) => Ok(data),
            _ => Err(ShopifyError::Shape(
                "data missing from GraphQL response".to_string(),
            )),
        }
    }
}

fn format_graphql_errors(errors: &[Value]) -> String {
    let messages: Vec<&str> = errors
        .iter()
        .filter_map(|e| e.get("message").and_then(Value::as_str))
        .collect();

    if messages.is_empty() {
        "(no error details provided)".to_string()
    } else {
        messages.join("; ")
    }
}

/// Replace every GraphQL connection (`{"edges": [{"node": …}]}`) in the tree
/// with a plain array of its nodes.
fn flatten_connections(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            match map.remove("edges") {
                Some(Value::Array(edges)) => {
                    let nodes = edges
                        .into_iter()
                        .filter_map(|mut edge| edge.get_mut("node").map(Value::take))
                        .map(flatten_connections)
                        .collect();
                    return Value::Array(nodes);
                }
                Some(other) => {
                    // Not a connection shape, keep it untouched
                    map.insert("edges".to_string(), other);
                }
                None => {}
            }

            Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, flatten_connections(value)))
                    .collect(),
            )
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(flatten_connections).collect())
        }
        other => other,
    }
}
