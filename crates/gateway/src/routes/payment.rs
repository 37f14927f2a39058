//! Payment route handlers.
//!
//! Both routes talk to Stripe. Card updates are a three step sequence
//! rather than a single call: Stripe wants the card tokenised into a
//! source, attached to the customer, and then promoted to the default
//! source, in that order.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::Value;
use tracing::instrument;

use crate::error::AppError;
use crate::state::AppState;
use crate::stripe::StripeError;

/// `GET /recharge-customers/{stripe_id}/payment_sources` - the Stripe
/// customer record, sources included.
#[instrument(skip(state))]
pub async fn payment_sources(
    State(state): State<AppState>,
    Path(stripe_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let customer = state
        .stripe()
        .get(&format!("v1/customers/{}", urlencoding::encode(&stripe_id)))
        .await?;
    Ok(Json(customer))
}

/// `PUT /customers/{stripe_id}/payment-info` - replace the default card.
///
/// Creates a source from the card token, attaches it to the customer and
/// makes it the default. Responds `204 No Content` once all three calls
/// have gone through.
#[instrument(skip(state, body))]
pub async fn update_payment_info(
    State(state): State<AppState>,
    Path(stripe_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<StatusCode, AppError> {
    let token = require_string(&body, "token")?;
    let email = require_string(&body, "email")?;

    let source = state
        .stripe()
        .post_form(
            "v1/sources",
            &[("type", "card"), ("token", token), ("owner[email]", email)],
        )
        .await?;
    let source_id = source
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StripeError::Shape("source response missing id".to_owned()))?
        .to_owned();

    let customer_path = format!("v1/customers/{}", urlencoding::encode(&stripe_id));
    state
        .stripe()
        .post_form(&format!("{customer_path}/sources"), &[("source", &source_id)])
        .await?;
    state
        .stripe()
        .post_form(&customer_path, &[("default_source", &source_id)])
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

fn require_string<'a>(body: &'a Value, field: &str) -> Result<&'a str, AppError> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("missing required field: {field}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_require_string_rejects_missing_and_empty() {
        let body = json!({ "token": "tok_visa", "email": "" });

        assert_eq!(require_string(&body, "token").unwrap(), "tok_visa");
        assert!(require_string(&body, "email").is_err());
        assert!(require_string(&body, "name").is_err());
    }
}
