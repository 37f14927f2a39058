//! Customer provisioning across Shopify and Recharge.
//!
//! One inbound request creates the customer on the commerce platform, the
//! matching billing customer carrying the platform id, and an optional
//! customer metafield. The platform step must succeed; the billing and
//! metafield steps degrade to a partial result: the response is still 200
//! and lists what failed in `failedSteps`, so the frontend can resume
//! instead of re-registering the customer from scratch.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::recharge::RechargeError;
use crate::shopify::ShopifyError;
use crate::state::AppState;

/// Validated provisioning request.
#[derive(Debug)]
pub struct ProvisioningInput {
    shopify_customer_info: Value,
    email: String,
    recharge_customer_info: Value,
    metafield_data: Option<Value>,
}

impl ProvisioningInput {
    /// Extract and validate the provisioning fields from a request body.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if a required field is missing or has
    /// the wrong shape. Nothing has been sent upstream at that point.
    pub fn from_value(body: &Value) -> Result<Self, AppError> {
        let shopify_customer_info = body
            .get("shopifyCustomerInfo")
            .filter(|v| v.is_object())
            .cloned()
            .ok_or_else(|| {
                AppError::Validation("shopifyCustomerInfo must be an object".to_string())
            })?;

        let email = shopify_customer_info
            .get("email")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::Validation("shopifyCustomerInfo.email is required".to_string())
            })?
            .to_string();

        let recharge_customer_info = body
            .get("rechargeCustomerInfo")
            .filter(|v| v.is_object())
            .cloned()
            .ok_or_else(|| {
                AppError::Validation("rechargeCustomerInfo must be an object".to_string())
            })?;

        let metafield_data = match body.get("metafieldData") {
            None | Some(Value::Null) => None,
            Some(data) if data.is_object() => Some(data.clone()),
            Some(_) => {
                return Err(AppError::Validation(
                    "metafieldData must be an object".to_string(),
                ));
            }
        };

        Ok(Self {
            shopify_customer_info,
            email,
            recharge_customer_info,
            metafield_data,
        })
    }
}

/// A saga step that failed while the request as a whole went through.
#[derive(Debug, Serialize)]
pub struct FailedStep {
    pub step: String,
    pub detail: String,
}

impl FailedStep {
    fn new(step: &str, detail: impl Into<String>) -> Self {
        Self {
            step: step.to_string(),
            detail: detail.into(),
        }
    }
}

/// Result of a provisioning run.
///
/// `failed_steps` is empty on a fully successful run. A partial run keeps
/// the resolved platform customer and records what is still missing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningOutcome {
    /// Platform (Shopify) customer id
    pub id: u64,
    /// True when the customer already existed and was updated instead
    pub is_existing_customer: bool,
    /// Billing (Recharge) customer id, when that step succeeded
    pub recharge_customer_id: Option<u64>,
    /// The billing customer record, when resolved
    pub recharge_customer: Option<Value>,
    /// The attached metafield, when requested and created
    pub metafield: Option<Value>,
    /// Steps that failed after the platform customer was resolved
    pub failed_steps: Vec<FailedStep>,
}

/// Run the provisioning saga.
///
/// # Errors
///
/// Fails only when the platform customer cannot be resolved at all; billing
/// and metafield failures are reported in the outcome instead.
#[instrument(skip_all)]
pub async fn provision_customer(
    state: &AppState,
    input: &ProvisioningInput,
) -> Result<ProvisioningOutcome, AppError> {
    let mut failed_steps = Vec::new();

    let (shopify_customer, is_existing_customer) = resolve_shopify_customer(state, input).await?;
    let id = object_id(&shopify_customer).ok_or_else(|| {
        AppError::from(ShopifyError::Shape(
            "customer id missing from admin response".to_string(),
        ))
    })?;

    let recharge_customer = resolve_recharge_customer(state, input, id, &mut failed_steps).await;
    let recharge_customer_id = recharge_customer.as_ref().and_then(object_id);

    let metafield = attach_metafield(state, input, recharge_customer_id, &mut failed_steps).await;

    tracing::info!(
        shopify_customer_id = id,
        recharge_customer_id,
        is_existing_customer,
        failed_steps = failed_steps.len(),
        "customer provisioned"
    );

    Ok(ProvisioningOutcome {
        id,
        is_existing_customer,
        recharge_customer_id,
        recharge_customer,
        metafield,
        failed_steps,
    })
}

/// Create the platform customer, falling back to lookup-and-update when the
/// email is already registered.
async fn resolve_shopify_customer(
    state: &AppState,
    input: &ProvisioningInput,
) -> Result<(Value, bool), AppError> {
    match state
        .admin()
        .create_customer(&input.shopify_customer_info)
        .await
    {
        Ok(customer) => Ok((customer, false)),
        Err(ShopifyError::Api { status, body }) if is_duplicate_status(status) => {
            tracing::info!(%status, "platform create rejected, trying email lookup");

            let existing = state.admin().list_customers_by_email(&input.email).await?;
            match existing.into_iter().next() {
                Some(customer) => {
                    let id = object_id(&customer).ok_or_else(|| {
                        AppError::from(ShopifyError::Shape(
                            "customer id missing from lookup response".to_string(),
                        ))
                    })?;
                    let updated = state
                        .admin()
                        .update_customer(id, &input.shopify_customer_info)
                        .await?;
                    Ok((updated, true))
                }
                // No customer behind the rejection, so it was a genuine one
                None => Err(ShopifyError::Api { status, body }.into()),
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Create the billing customer carrying the resolved platform id, falling
/// back to lookup by that id when it already exists. Failures are recorded,
/// not raised.
async fn resolve_recharge_customer(
    state: &AppState,
    input: &ProvisioningInput,
    shopify_customer_id: u64,
    failed_steps: &mut Vec<FailedStep>,
) -> Option<Value> {
    let mut payload = input.recharge_customer_info.clone();
    if let Some(fields) = payload.as_object_mut() {
        fields.insert("shopify_customer_id".to_string(), json!(shopify_customer_id));
    }

    match state.recharge().post("customers", &payload).await {
        Ok(mut response) => match response.get_mut("customer").map(Value::take) {
            Some(customer @ Value::Object(_)) => Some(customer),
            _ => {
                failed_steps.push(FailedStep::new(
                    "recharge_customer",
                    "customer missing from create response",
                ));
                None
            }
        },
        Err(RechargeError::Api { status, body }) if is_duplicate_status(status) => {
            tracing::info!(%status, "billing create rejected, trying lookup");

            match lookup_recharge_customer(state, shopify_customer_id).await {
                Ok(Some(customer)) => Some(customer),
                Ok(None) => {
                    failed_steps.push(FailedStep::new(
                        "recharge_customer",
                        format!("create rejected ({status}): {body}"),
                    ));
                    None
                }
                Err(e) => {
                    failed_steps.push(FailedStep::new(
                        "recharge_customer",
                        format!("lookup after rejected create failed: {e}"),
                    ));
                    None
                }
            }
        }
        Err(e) => {
            failed_steps.push(FailedStep::new("recharge_customer", e.to_string()));
            None
        }
    }
}

async fn lookup_recharge_customer(
    state: &AppState,
    shopify_customer_id: u64,
) -> Result<Option<Value>, RechargeError> {
    let mut response = state
        .recharge()
        .get(&format!(
            "customers?shopify_customer_id={shopify_customer_id}"
        ))
        .await?;

    Ok(match response.get_mut("customers").map(Value::take) {
        Some(Value::Array(customers)) => customers.into_iter().next(),
        _ => None,
    })
}

/// Attach the customer metafield to the resolved billing customer.
/// Failures are recorded, not raised.
async fn attach_metafield(
    state: &AppState,
    input: &ProvisioningInput,
    owner_id: Option<u64>,
    failed_steps: &mut Vec<FailedStep>,
) -> Option<Value> {
    let metafield_data = input.metafield_data.as_ref()?;

    let Some(owner_id) = owner_id else {
        failed_steps.push(FailedStep::new(
            "metafield",
            "skipped, no billing customer to attach to",
        ));
        return None;
    };

    let mut metafield = metafield_data.clone();
    if let Some(fields) = metafield.as_object_mut() {
        fields.insert("owner_id".to_string(), json!(owner_id));
        fields.insert("owner_resource".to_string(), json!("customer"));
    }
    let payload = json!({ "metafield": metafield });

    match state
        .recharge()
        .post("metafields?owner_resource=customer", &payload)
        .await
    {
        Ok(mut response) => match response.get_mut("metafield").map(Value::take) {
            Some(metafield @ Value::Object(_)) => Some(metafield),
            _ => {
                failed_steps.push(FailedStep::new(
                    "metafield",
                    "metafield missing from create response",
                ));
                None
            }
        },
        Err(e) => {
            failed_steps.push(FailedStep::new("metafield", e.to_string()));
            None
        }
    }
}

fn object_id(value: &Value) -> Option<u64> {
    value.get("id").and_then(Value::as_u64)
}

/// The only rejection statuses treated as "may already exist". Anything
/// else propagates as the provider's own rejection.
const fn is_duplicate_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
    )
}
