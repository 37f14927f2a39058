//! Customer and address route handlers.
//!
//! Customers live in three places at once: Shopify admin owns the account,
//! Recharge owns the subscription profile, and Stripe owns the payment
//! profile. Most routes here are thin pass-throughs to one of the first
//! two; `/recharge-customer-info` runs the full provisioning flow across
//! both.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::services::provisioning::{self, ProvisioningInput, ProvisioningOutcome};
use crate::state::AppState;

/// `GET /recharge-customers/{id}` - billing customers for a Shopify customer.
///
/// The path id is the Shopify customer id, not the Recharge one. Recharge
/// answers with a `customers` list, usually of length zero or one.
#[instrument(skip(state))]
pub async fn recharge_customer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let customers = state
        .recharge()
        .get(&format!("customers?shopify_customer_id={id}"))
        .await?;
    Ok(Json(customers))
}

/// `GET /recharge-customers/{id}/addresses` - billing addresses, keyed by
/// the Recharge customer id.
#[instrument(skip(state))]
pub async fn recharge_customer_addresses(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let addresses = state
        .recharge()
        .get(&format!("customers/{id}/addresses"))
        .await?;
    Ok(Json(addresses))
}

/// `POST /recharge-customers` - create a billing customer.
#[instrument(skip(state, body))]
pub async fn create_recharge_customer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let customer = state.recharge().post("customers", &body).await?;
    Ok(Json(customer))
}

/// `PUT /customers/{id}` - update a billing customer.
#[instrument(skip(state, body))]
pub async fn update_recharge_customer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let customer = state
        .recharge()
        .put(&format!("customers/{id}"), &body)
        .await?;
    Ok(Json(customer))
}

/// `POST /shopify-customers` - create an account customer.
#[instrument(skip(state, body))]
pub async fn create_shopify_customer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let customer = state.admin().create_customer(&body).await?;
    Ok(Json(json!({ "customer": customer })))
}

/// `POST /customers/{id}/addresses` - create a billing address.
///
/// The path id names the owning Recharge customer and wins over whatever
/// `customer_id` the body carries.
#[instrument(skip(state, body))]
pub async fn create_recharge_address(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    if let Some(map) = body.as_object_mut() {
        map.insert("customer_id".to_owned(), json!(id));
    }
    let address = state
        .recharge()
        .post(&format!("customers/{id}/addresses"), &body)
        .await?;
    Ok(Json(address))
}

/// `GET /customers/{id}/addresses` - account addresses from Shopify admin.
#[instrument(skip(state))]
pub async fn shopify_customer_addresses(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, AppError> {
    let addresses = state
        .admin()
        .get(&format!("customers/{id}/addresses.json"))
        .await?;
    Ok(Json(addresses))
}

/// `PUT /customers/{customer_id}/addresses/{address_id}` - update an
/// account address in Shopify admin.
#[instrument(skip(state, body))]
pub async fn update_shopify_address(
    State(state): State<AppState>,
    Path((customer_id, address_id)): Path<(u64, u64)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let address = state
        .admin()
        .put(
            &format!("customers/{customer_id}/addresses/{address_id}.json"),
            &body,
        )
        .await?;
    Ok(Json(address))
}

/// `POST /recharge-customer-info` - provision a customer across providers.
///
/// See [`provisioning::provision_customer`] for the flow. The response is
/// always the Shopify-side outcome; billing failures surface in
/// `failedSteps` rather than as an error status.
#[instrument(skip(state, body))]
pub async fn provision_customer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<ProvisioningOutcome>, AppError> {
    let input = ProvisioningInput::from_value(&body)?;
    let outcome = provisioning::provision_customer(&state, &input).await?;
    Ok(Json(outcome))
}
