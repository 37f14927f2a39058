//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. Provider errors are
//! classified exactly once, in the `From` impls here: a provider 4xx is the
//! caller's problem and is echoed back with the provider's own status and
//! body; everything else (transport failures, provider 5xx, malformed
//! responses) becomes a generic 502 so upstream internals never leak to
//! clients. Partial orchestration results are not errors at all - those
//! handlers respond 200 with the failed steps listed in the payload.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use thiserror::Error;

use crate::recharge::RechargeError;
use crate::shopify::ShopifyError;
use crate::stripe::StripeError;

/// The upstream provider an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Shopify,
    Recharge,
    Stripe,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Shopify => "shopify",
            Self::Recharge => "recharge",
            Self::Stripe => "stripe",
        };
        f.write_str(name)
    }
}

/// Application-level error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    /// The provider refused the request (4xx). Echoed to the client.
    #[error("{provider} rejected the request ({status})")]
    UpstreamRejected {
        provider: Provider,
        status: StatusCode,
        body: Value,
    },

    /// The provider could not be reached or answered unusably.
    #[error("{provider} unavailable: {detail}")]
    UpstreamUnavailable { provider: Provider, detail: String },

    /// The inbound request is malformed. Rejected before any upstream call.
    #[error("Invalid request: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture infrastructure-class errors to Sentry
        if matches!(self, Self::UpstreamUnavailable { .. }) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::UpstreamRejected { status, body, .. } => (status, Json(body)).into_response(),
            // Don't expose upstream internals to clients
            Self::UpstreamUnavailable { .. } => (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "External service error" })),
            )
                .into_response(),
            Self::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

impl From<ShopifyError> for AppError {
    fn from(err: ShopifyError) -> Self {
        match err {
            ShopifyError::Api { status, body } if status.is_client_error() => {
                Self::UpstreamRejected {
                    provider: Provider::Shopify,
                    status,
                    body,
                }
            }
            ShopifyError::Api { status, body } => Self::UpstreamUnavailable {
                provider: Provider::Shopify,
                detail: format!("status {status}: {body}"),
            },
            ShopifyError::Http(e) => Self::UpstreamUnavailable {
                provider: Provider::Shopify,
                detail: e.to_string(),
            },
            ShopifyError::GraphQL(detail) | ShopifyError::Shape(detail) => {
                Self::UpstreamUnavailable {
                    provider: Provider::Shopify,
                    detail,
                }
            }
        }
    }
}

impl From<RechargeError> for AppError {
    fn from(err: RechargeError) -> Self {
        match err {
            RechargeError::Api { status, body } if status.is_client_error() => {
                Self::UpstreamRejected {
                    provider: Provider::Recharge,
                    status,
                    body,
                }
            }
            RechargeError::Api { status, body } => Self::UpstreamUnavailable {
                provider: Provider::Recharge,
                detail: format!("status {status}: {body}"),
            },
            RechargeError::Http(e) => Self::UpstreamUnavailable {
                provider: Provider::Recharge,
                detail: e.to_string(),
            },
            RechargeError::Shape(detail) => Self::UpstreamUnavailable {
                provider: Provider::Recharge,
                detail,
            },
        }
    }
}

impl From<StripeError> for AppError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Api { status, body } if status.is_client_error() => {
                Self::UpstreamRejected {
                    provider: Provider::Stripe,
                    status,
                    body,
                }
            }
            StripeError::Api { status, body } => Self::UpstreamUnavailable {
                provider: Provider::Stripe,
                detail: format!("status {status}: {body}"),
            },
            StripeError::Http(e) => Self::UpstreamUnavailable {
                provider: Provider::Stripe,
                detail: e.to_string(),
            },
            StripeError::Shape(detail) => Self::UpstreamUnavailable {
                provider: Provider::Stripe,
                detail,
            },
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
