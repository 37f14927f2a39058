//! Shopify Admin and Storefront API clients.
//!
//! # APIs
//!
//! ## Admin API (REST)
//! - Customer create/update/lookup and address management
//! - Basic auth with the store's API key and password
//! - Resources are enveloped (`{"customer": {…}}` in and out)
//!
//! ## Storefront API (GraphQL)
//! - Product and collection catalog, read-only
//! - Public storefront access token
//! - Connection wrappers (`edges`/`node`) are flattened into plain arrays
//!   before the payload leaves the client

pub mod admin;
pub mod storefront;

pub use admin::AdminClient;
pub use storefront::StorefrontClient;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when interacting with Shopify APIs.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("Shopify API error ({status}): {body}")]
    Api { status: StatusCode, body: Value },

    /// GraphQL query returned errors in a 2xx response.
    #[error("GraphQL errors: {0}")]
    GraphQL(String),

    /// A 2xx response did not have the expected shape.
    #[error("Unexpected Shopify response: {0}")]
    Shape(String),
}
