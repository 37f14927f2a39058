//! Product and catalog route handlers.
//!
//! The storefront menu is driven by two catalogs: Shopify holds the
//! presentation data, Recharge holds the subscription data. The raw lists
//! are exposed for the pages that only need one side; `/menu-products`
//! serves the joined view.

use axum::Json;
use axum::extract::State;
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::services;
use crate::services::catalog::{MENU_PRODUCT_TYPE, SUBSCRIPTION_COLLECTION_ID};
use crate::state::AppState;

/// `GET /products` - full storefront catalog.
#[instrument(skip(state))]
pub async fn storefront_products(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let products = state.storefront().products().await?;
    Ok(Json(products))
}

/// `GET /collections/with-products` - collections including their products.
#[instrument(skip(state))]
pub async fn collections_with_products(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let collections = state.storefront().collections_with_products().await?;
    Ok(Json(collections))
}

/// `GET /recharge-products` - subscribable products from the billing side.
#[instrument(skip(state))]
pub async fn recharge_products(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let products = state
        .recharge()
        .get(&format!(
            "products?collection_id={SUBSCRIPTION_COLLECTION_ID}"
        ))
        .await?;
    Ok(Json(products))
}

/// `GET /shopify-menu-products` - recipe products from the admin catalog.
#[instrument(skip(state))]
pub async fn shopify_menu_products(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let products = state
        .admin()
        .get(&format!("products.json?product_type={MENU_PRODUCT_TYPE}"))
        .await?;
    Ok(Json(products))
}

/// `GET /menu-products` - the joined menu catalog.
#[instrument(skip(state))]
pub async fn menu_products(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let catalog = services::menu_products(&state).await?;
    Ok(Json(catalog))
}
