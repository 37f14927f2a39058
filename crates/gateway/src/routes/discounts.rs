//! Discount route handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;

/// `GET /discounts/{code}` - look up a discount by code.
///
/// Recharge only offers discount lookup as a filtered list, so the
/// response is a `discounts` array that is empty for unknown codes.
#[instrument(skip(state))]
pub async fn discount(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Value>, AppError> {
    let discounts = state
        .recharge()
        .get(&format!(
            "discounts?discount_code={}",
            urlencoding::encode(&code)
        ))
        .await?;
    Ok(Json(discounts))
}
