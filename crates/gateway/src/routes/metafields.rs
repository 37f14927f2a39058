//! Metafield route handlers.

use axum::Json;
use axum::extract::State;
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// `POST /recharge-metafields` - attach a metafield to a billing customer.
///
/// Recharge scopes metafields by owner resource, and customer is the only
/// owner the storefront ever writes to.
#[instrument(skip(state, body))]
pub async fn create_metafield(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let metafield = state
        .recharge()
        .post("metafields?owner_resource=customer", &body)
        .await?;
    Ok(Json(metafield))
}
