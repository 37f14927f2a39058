//! Checkout route handlers.
//!
//! `/checkout` runs the whole create, rate, charge sequence in one call;
//! the `/recharge-checkouts` family exposes the individual steps for the
//! storefront flows that drive them one at a time.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::services;
use crate::services::checkout::CheckoutInput;
use crate::state::AppState;

/// `POST /checkout` - create, rate and charge a checkout in one pass.
#[instrument(skip(state, body))]
pub async fn complete_checkout(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let input = CheckoutInput::from_value(&body)?;
    let outcome = services::complete_checkout(&state, &input).await?;
    Ok(Json(outcome))
}

/// `POST /recharge-checkouts` - create a checkout.
#[instrument(skip(state, body))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let checkout = state.recharge().post("checkouts", &body).await?;
    Ok(Json(checkout))
}

/// `PUT /recharge-checkouts/{token}` - update a pending checkout.
#[instrument(skip(state, body))]
pub async fn update_checkout(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let checkout = state
        .recharge()
        .put(&format!("checkouts/{}", urlencoding::encode(&token)), &body)
        .await?;
    Ok(Json(checkout))
}

/// `GET /recharge-checkouts/{token}/shipping-rates` - rates for a checkout.
#[instrument(skip(state))]
pub async fn shipping_rates(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, AppError> {
    let rates = state
        .recharge()
        .get(&format!(
            "checkouts/{}/shipping_rates",
            urlencoding::encode(&token)
        ))
        .await?;
    Ok(Json(rates))
}

/// `POST /recharge-charges/{token}` and `PUT /recharge-charges/{token}` -
/// charge a checkout.
///
/// Both verbs do the same thing. Older storefront builds send `PUT`, newer
/// ones send `POST`, and the upstream call is a `POST` either way.
#[instrument(skip(state, body))]
pub async fn charge_checkout(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let charge = state
        .recharge()
        .post(
            &format!("checkouts/{}/charge", urlencoding::encode(&token)),
            &body,
        )
        .await?;
    Ok(Json(charge))
}
