//! Subscription and one-time product route handlers.
//!
//! Subscriptions recur on their own; onetimes ride along on the next
//! queued charge and disappear after it bills. Family Time is a fixed
//! onetime the storefront sells as a single toggle, so its routes hide
//! the product and variant ids behind the service.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::services;
use crate::services::family_time::AddFamilyTimeInput;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FamilyTimeRemoveQuery {
    customer_id: u64,
}

/// `GET /subscriptions/{id}` - fetch one subscription.
#[instrument(skip(state))]
pub async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let subscription = state.recharge().get(&format!("subscriptions/{id}")).await?;
    Ok(Json(subscription))
}

/// `POST /subscriptions` - create a subscription.
#[instrument(skip(state, body))]
pub async fn create_subscription(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let subscription = state.recharge().post("subscriptions", &body).await?;
    Ok(Json(subscription))
}

/// `PUT /subscriptions/{id}` - update a subscription.
#[instrument(skip(state, body))]
pub async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let subscription = state
        .recharge()
        .put(&format!("subscriptions/{id}"), &body)
        .await?;
    Ok(Json(subscription))
}

/// `DELETE /subscriptions/{id}` - cancel a subscription.
#[instrument(skip(state))]
pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let response = state
        .recharge()
        .delete(&format!("subscriptions/{id}"))
        .await?;
    Ok(Json(response))
}

/// `POST /onetimes/address/{address_id}` - add a one-time product to the
/// next charge for an address.
#[instrument(skip(state, body))]
pub async fn create_onetime(
    State(state): State<AppState>,
    Path(address_id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let onetime = state
        .recharge()
        .post(&format!("onetimes/address/{address_id}"), &body)
        .await?;
    Ok(Json(onetime))
}

/// `DELETE /onetimes/{id}` - remove a one-time product.
#[instrument(skip(state))]
pub async fn delete_onetime(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    state.recharge().delete(&format!("onetimes/{id}")).await?;
    Ok(Json(json!({ "deleted": true })))
}

/// `POST /family-time/{address_id}` - add the Family Time onetime and
/// return the refreshed queued charges.
#[instrument(skip(state, body))]
pub async fn add_family_time(
    State(state): State<AppState>,
    Path(address_id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let input = AddFamilyTimeInput::from_value(&body)?;
    let outcome = services::add_family_time(&state, address_id, &input).await?;
    Ok(Json(outcome))
}

/// `DELETE /family-time/{onetime_id}?customer_id=` - remove the Family
/// Time onetime and return the refreshed queued charges.
#[instrument(skip(state))]
pub async fn remove_family_time(
    State(state): State<AppState>,
    Path(onetime_id): Path<u64>,
    Query(query): Query<FamilyTimeRemoveQuery>,
) -> Result<Json<Value>, AppError> {
    let outcome = services::remove_family_time(&state, onetime_id, query.customer_id).await?;
    Ok(Json(outcome))
}
