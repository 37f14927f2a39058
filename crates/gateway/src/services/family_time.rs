//! Family Time add-on management.
//!
//! "Family Time" is a fixed one-time product a subscriber can attach to
//! their next scheduled charge (an extra meal for the grown-ups). The
//! product is not part of the menu catalog; its identifiers and price are
//! fixed here. After either write the queued charge list is re-fetched so
//! the caller renders the post-write state instead of optimistically
//! patching its own.

use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::recharge::RechargeError;
use crate::state::AppState;

/// Shopify product id of the Family Time add-on.
pub const FAMILY_TIME_PRODUCT_ID: u64 = 3_563_244_126_307;

/// Shopify variant id of the Family Time add-on.
pub const FAMILY_TIME_VARIANT_ID: u64 = 28_345_544_900_707;

/// Price of one Family Time add-on.
pub const FAMILY_TIME_PRICE: &str = "14.99";

/// Display title of the add-on, as it appears on the charge.
pub const FAMILY_TIME_TITLE: &str = "Family Time";

/// Validated add request.
#[derive(Debug)]
pub struct AddFamilyTimeInput {
    customer_id: u64,
    next_charge_scheduled_at: String,
}

impl AddFamilyTimeInput {
    /// Extract and validate the add fields from a request body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if a required field is missing or has
    /// the wrong shape. Nothing has been sent upstream at that point.
    pub fn from_value(body: &Value) -> Result<Self, AppError> {
        let customer_id = body
            .get("customer_id")
            .and_then(Value::as_u64)
            .ok_or_else(|| AppError::Validation("customer_id must be a number".to_string()))?;

        let next_charge_scheduled_at = body
            .get("next_charge_scheduled_at")
            .and_then(Value::as_str)
            .filter(|date| !date.is_empty())
            .ok_or_else(|| {
                AppError::Validation("next_charge_scheduled_at is required".to_string())
            })?
            .to_string();

        Ok(Self {
            customer_id,
            next_charge_scheduled_at,
        })
    }
}

/// Attach the Family Time one-time item to the address's next charge and
/// return it together with the refreshed queued charge list.
///
/// # Errors
///
/// Returns an error if either the create or the refetch fails.
#[instrument(skip(state, input), fields(address_id = %address_id))]
pub async fn add_family_time(
    state: &AppState,
    address_id: u64,
    input: &AddFamilyTimeInput,
) -> Result<Value, AppError> {
    let body = json!({
        "next_charge_scheduled_at": input.next_charge_scheduled_at,
        "price": FAMILY_TIME_PRICE,
        "product_title": FAMILY_TIME_TITLE,
        "quantity": 1,
        "shopify_product_id": FAMILY_TIME_PRODUCT_ID,
        "shopify_variant_id": FAMILY_TIME_VARIANT_ID,
    });

    let mut response = state
        .recharge()
        .post(&format!("onetimes/address/{address_id}"), &body)
        .await?;
    let onetime = match response.get_mut("onetime").map(Value::take) {
        Some(onetime @ Value::Object(_)) => onetime,
        _ => {
            return Err(RechargeError::Shape(
                "onetime missing from create response".to_string(),
            )
            .into());
        }
    };

    let charges = queued_charges(state, input.customer_id).await?;

    tracing::info!(address_id, "family time added");
    Ok(json!({ "onetime": onetime, "charges": charges }))
}

/// Remove a Family Time one-time item and return the refreshed queued
/// charge list.
///
/// # Errors
///
/// Returns an error if either the delete or the refetch fails.
#[instrument(skip(state), fields(onetime_id = %onetime_id, customer_id = %customer_id))]
pub async fn remove_family_time(
    state: &AppState,
    onetime_id: u64,
    customer_id: u64,
) -> Result<Value, AppError> {
    state
        .recharge()
        .delete(&format!("onetimes/{onetime_id}"))
        .await?;

    let charges = queued_charges(state, customer_id).await?;

    tracing::info!(onetime_id, "family time removed");
    Ok(json!({ "onetime": Value::Null, "charges": charges }))
}

async fn queued_charges(state: &AppState, customer_id: u64) -> Result<Value, AppError> {
    let mut response = state
        .recharge()
        .get(&format!("charges?status=QUEUED&customer_id={customer_id}"))
        .await?;

    match response.get_mut("charges").map(Value::take) {
        Some(charges @ Value::Array(_)) => Ok(charges),
        _ => Err(RechargeError::Shape(
            "charges array missing from list response".to_string(),
        )
        .into()),
    }
}
