//! Charge route handlers.
//!
//! Charges are Recharge's billing attempts. The storefront shows queued
//! charges as upcoming orders and successful ones as order history, and
//! lets customers push individual charges around their calendar.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChargeListQuery {
    customer_id: u64,
}

/// `GET /recharge-queued-charges?customer_id=` - upcoming charges.
#[instrument(skip(state))]
pub async fn queued_charges(
    State(state): State<AppState>,
    Query(query): Query<ChargeListQuery>,
) -> Result<Json<Value>, AppError> {
    let charges = state
        .recharge()
        .get(&format!(
            "charges?status=QUEUED&customer_id={}",
            query.customer_id
        ))
        .await?;
    Ok(Json(charges))
}

/// `GET /recharge-processed-charges?customer_id=` - charges that billed.
#[instrument(skip(state))]
pub async fn processed_charges(
    State(state): State<AppState>,
    Query(query): Query<ChargeListQuery>,
) -> Result<Json<Value>, AppError> {
    let charges = state
        .recharge()
        .get(&format!(
            "charges?status=SUCCESS&customer_id={}",
            query.customer_id
        ))
        .await?;
    Ok(Json(charges))
}

/// `POST /skip-charge/{id}` - skip one charge for one subscription.
///
/// Recharge wants the `subscription_id` in the body, so the body passes
/// through as-is.
#[instrument(skip(state, body))]
pub async fn skip_charge(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let charge = state
        .recharge()
        .post(&format!("charges/{id}/skip"), &body)
        .await?;
    Ok(Json(charge))
}

/// `POST /unskip-charge/{id}` - undo a skip.
#[instrument(skip(state, body))]
pub async fn unskip_charge(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let charge = state
        .recharge()
        .post(&format!("charges/{id}/unskip"), &body)
        .await?;
    Ok(Json(charge))
}

/// `POST /change-order-date/{id}` - move a charge to a new date.
#[instrument(skip(state, body))]
pub async fn change_order_date(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let charge = state
        .recharge()
        .post(&format!("charges/{id}/change_next_charge_date"), &body)
        .await?;
    Ok(Json(charge))
}
