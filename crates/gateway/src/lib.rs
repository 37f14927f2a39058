//! Tiny Greens Gateway library.
//!
//! The gateway sits between the storefront frontend and the commerce
//! providers (Shopify, Recharge, Stripe), keeping the provider credentials
//! server-side and stitching multi-provider flows into single endpoints.
//! This crate provides the gateway as a library so the router can be
//! exercised in tests without a running binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

pub mod config;
pub mod error;
pub mod middleware;
pub mod recharge;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;
pub mod stripe;

#[cfg(test)]
mod testing;

use state::AppState;

/// Build the full gateway service: routes, middleware and state.
///
/// The trailing-slash normalizer has to wrap the router from outside so
/// the path is rewritten before routing happens, which is why the return
/// type is not a plain [`Router`]. Serve it with
/// `ServiceExt::into_make_service`.
pub fn app(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .merge(routes::routes())
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
