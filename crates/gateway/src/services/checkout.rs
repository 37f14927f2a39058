//! Checkout completion against Recharge.
//!
//! Four sequential calls: create the checkout session from the cart, fetch
//! the shipping rates for it, apply the first rate, then charge the session
//! through Stripe as the payment processor. The steps form a one-way state
//! machine; a failure surfaces the provider's error together with the stage
//! it died in, and the next attempt starts over with a fresh session.

use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::recharge::RechargeError;
use crate::state::AppState;

/// Shipping handle applied when Recharge reports no rates for the address.
/// The storefront only ships where free shipping is configured, so an empty
/// rate list means this handle.
pub const FREE_SHIPPING_HANDLE: &str = "shopify-Free%20Shipping-0.00";

/// Stage of a checkout run, recorded when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    Created,
    RateFetched,
    RateApplied,
    Charged,
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::RateFetched => "rate_fetched",
            Self::RateApplied => "rate_applied",
            Self::Charged => "charged",
        };
        f.write_str(name)
    }
}

/// Validated checkout request.
#[derive(Debug)]
pub struct CheckoutInput {
    checkout_data: Value,
    stripe_token: String,
}

impl CheckoutInput {
    /// Extract and validate the checkout fields from a request body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if a required field is missing or has
    /// the wrong shape. Nothing has been sent upstream at that point.
    pub fn from_value(body: &Value) -> Result<Self, AppError> {
        let checkout_data = body
            .get("rechargeCheckoutData")
            .filter(|v| v.is_object())
            .cloned()
            .ok_or_else(|| {
                AppError::Validation("rechargeCheckoutData must be an object".to_string())
            })?;

        let stripe_token = body
            .get("stripeToken")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Validation("stripeToken is required".to_string()))?
            .to_string();

        Ok(Self {
            checkout_data,
            stripe_token,
        })
    }
}

/// Run the checkout saga. Success means the charge went through; the
/// response body is the fixed `{"message": "Success!"}` the frontend keys
/// on.
///
/// # Errors
///
/// Returns the originating provider error of whichever step failed. The
/// Recharge-side session may remain partially configured; it is abandoned,
/// not reused.
#[instrument(skip_all)]
pub async fn complete_checkout(state: &AppState, input: &CheckoutInput) -> Result<Value, AppError> {
    let checkout = state
        .recharge()
        .post("checkouts", &input.checkout_data)
        .await
        .map_err(|e| fail(CheckoutStage::Created, e))?;
    let token = checkout_token(&checkout).map_err(|e| fail(CheckoutStage::Created, e))?;

    let rates = state
        .recharge()
        .get(&format!("checkouts/{token}/shipping_rates"))
        .await
        .map_err(|e| fail(CheckoutStage::RateFetched, e))?;
    let handle = first_rate_handle(&rates);

    let shipping_line = json!({ "checkout": { "shipping_line": { "handle": handle } } });
    state
        .recharge()
        .put(&format!("checkouts/{token}"), &shipping_line)
        .await
        .map_err(|e| fail(CheckoutStage::RateApplied, e))?;

    let charge = json!({
        "checkout_charge": {
            "payment_processor": "stripe",
            "payment_token": input.stripe_token,
        }
    });
    state
        .recharge()
        .post(&format!("checkouts/{token}/charge"), &charge)
        .await
        .map_err(|e| fail(CheckoutStage::Charged, e))?;

    tracing::info!(stage = %CheckoutStage::Charged, "checkout completed");
    Ok(json!({ "message": "Success!" }))
}

fn fail(stage: CheckoutStage, err: RechargeError) -> AppError {
    tracing::warn!(stage = %stage, error = %err, "checkout step failed");
    err.into()
}

/// Pull the session token out of a checkout create response.
fn checkout_token(checkout: &Value) -> Result<String, RechargeError> {
    checkout
        .get("checkout")
        .and_then(|c| c.get("token"))
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| {
            RechargeError::Shape("checkout token missing from create response".to_string())
        })
}

/// The handle of the first offered shipping rate, or the free-shipping
/// fallback when the list is empty or absent.
fn first_rate_handle(rates: &Value) -> String {
    rates
        .get("shipping_rates")
        .and_then(Value::as_array)
        .and_then(|rates| rates.first())
        .and_then(|rate| rate.get("handle"))
        .and_then(Value::as_str)
        .map_or_else(|| FREE_SHIPPING_HANDLE.to_string(), String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::testing::state_for;

    fn test_input() -> CheckoutInput {
        CheckoutInput::from_value(&json!({
            "rechargeCheckoutData": {"line_items": [{"quantity": 6}]},
            "stripeToken": "tok_visa",
        }))
        .unwrap()
    }

    #[test]
    fn test_from_value_requires_token() {
        let err = CheckoutInput::from_value(&json!({
            "rechargeCheckoutData": {},
        }))
        .unwrap_err();

        assert_eq!(err.to_string(), "Invalid request: stripeToken is required");
    }

    #[test]
    fn test_from_value_rejects_empty_token() {
        let err = CheckoutInput::from_value(&json!({
            "rechargeCheckoutData": {},
            "stripeToken": "",
        }))
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_first_rate_handle_picks_first() {
        let rates = json!({
            "shipping_rates": [
                {"handle": "shopify-Standard-5.00"},
                {"handle": "shopify-Express-15.00"},
            ]
        });
        assert_eq!(first_rate_handle(&rates), "shopify-Standard-5.00");
    }

    #[test]
    fn test_first_rate_handle_falls_back_when_empty() {
        assert_eq!(
            first_rate_handle(&json!({"shipping_rates": []})),
            FREE_SHIPPING_HANDLE
        );
        assert_eq!(first_rate_handle(&json!({})), FREE_SHIPPING_HANDLE);
    }

    #[test]
    fn test_checkout_token_missing_is_shape_error() {
        let err = checkout_token(&json!({"checkout": {}})).unwrap_err();
        assert!(matches!(err, RechargeError::Shape(_)));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(CheckoutStage::Created.to_string(), "created");
        assert_eq!(CheckoutStage::RateApplied.to_string(), "rate_applied");
    }

    #[tokio::test]
    async fn test_completes_with_offered_rate() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/checkouts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "checkout": {"token": "chk_123"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/checkouts/chk_123/shipping_rates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "shipping_rates": [{"handle": "shopify-Standard-5.00"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/checkouts/chk_123"))
            .and(body_json(json!({
                "checkout": {"shipping_line": {"handle": "shopify-Standard-5.00"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "checkout": {"token": "chk_123"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/checkouts/chk_123/charge"))
            .and(body_json(json!({
                "checkout_charge": {
                    "payment_processor": "stripe",
                    "payment_token": "tok_visa",
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "charge": {"id": 31}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = state_for(&server.uri());
        let response = complete_checkout(&state, &test_input()).await.unwrap();

        assert_eq!(response, json!({"message": "Success!"}));
    }

    #[tokio::test]
    async fn test_no_rates_applies_free_shipping_handle() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/checkouts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "checkout": {"token": "chk_456"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/checkouts/chk_456/shipping_rates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "shipping_rates": []
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/checkouts/chk_456"))
            .and(body_json(json!({
                "checkout": {"shipping_line": {"handle": FREE_SHIPPING_HANDLE}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/checkouts/chk_456/charge"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let state = state_for(&server.uri());
        let response = complete_checkout(&state, &test_input()).await.unwrap();

        assert_eq!(response, json!({"message": "Success!"}));
    }

    #[tokio::test]
    async fn test_declined_charge_propagates_rejection() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/checkouts"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "checkout": {"token": "chk_789"}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/checkouts/chk_789/shipping_rates"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "shipping_rates": [{"handle": "shopify-Standard-5.00"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/checkouts/chk_789"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/checkouts/chk_789/charge"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "error": "card was declined"
            })))
            .mount(&server)
            .await;

        let state = state_for(&server.uri());
        let err = complete_checkout(&state, &test_input()).await.unwrap_err();

        match err {
            AppError::UpstreamRejected { status, body, .. } => {
                assert_eq!(status.as_u16(), 422);
                assert_eq!(body, json!({"error": "card was declined"}));
            }
            other => panic!("expected UpstreamRejected, got {other:?}"),
        }
    }
}
