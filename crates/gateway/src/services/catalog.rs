//! Joined product catalog for the menu page.
//!
//! Recharge owns which products are subscribable (and their billing fields),
//! Shopify owns the presentation fields (title, images, variants). The menu
//! needs both, so the two lists are fetched concurrently and joined on
//! Recharge's `shopify_product_id` pointing at the Shopify product `id`.
//!
//! The join is billing-driven: every Recharge product yields exactly one
//! merged record, with the Shopify fields overlaid when a match exists and
//! absent otherwise. Shopify products nobody can subscribe to are dropped.

use std::collections::HashMap;

use serde_json::{Value, json};
use tracing::instrument;

use crate::error::AppError;
use crate::recharge::RechargeError;
use crate::shopify::ShopifyError;
use crate::state::AppState;

/// Recharge collection holding the subscribable recipe products.
pub const SUBSCRIPTION_COLLECTION_ID: u64 = 212_146;

/// Shopify admin product type marking menu recipes.
pub const MENU_PRODUCT_TYPE: &str = "recipe";

/// Fetch and join the billing and platform product lists.
///
/// # Errors
///
/// Returns an error when either upstream list cannot be fetched; the join
/// itself cannot fail.
#[instrument(skip_all)]
pub async fn menu_products(state: &AppState) -> Result<Value, AppError> {
    let billing_path = format!("products?collection_id={SUBSCRIPTION_COLLECTION_ID}");
    let platform_path = format!("products.json?product_type={MENU_PRODUCT_TYPE}");
    let (billing, platform) = tokio::join!(
        state.recharge().get(&billing_path),
        state.admin().get(&platform_path),
    );

    let mut billing = billing?;
    let billing_products = match billing.get_mut("products").map(Value::take) {
        Some(Value::Array(products)) => products,
        _ => {
            return Err(RechargeError::Shape(
                "products array missing from list response".to_string(),
            )
            .into());
        }
    };

    let mut platform = platform?;
    let platform_products = match platform.get_mut("products").map(Value::take) {
        Some(Value::Array(products)) => products,
        _ => {
            return Err(ShopifyError::Shape(
                "products array missing from list response".to_string(),
            )
            .into());
        }
    };

    let merged = join_products(billing_products, &platform_products);
    tracing::debug!(products = merged.len(), "menu catalog joined");

    Ok(json!({ "products": merged }))
}

/// Merge platform fields onto each billing product.
///
/// The billing product's own id survives as `recharge_product_id`; on a
/// match the platform fields win key conflicts, so `id` becomes the Shopify
/// product id.
fn join_products(billing: Vec<Value>, platform: &[Value]) -> Vec<Value> {
    let platform_by_id: HashMap<u64, &serde_json::Map<String, Value>> = platform
        .iter()
        .filter_map(|product| Some((product.get("id")?.as_u64()?, product.as_object()?)))
        .collect();

    billing
        .into_iter()
        .filter_map(|product| {
            let Value::Object(mut merged) = product else {
                return None;
            };

            if let Some(billing_id) = merged.get("id").cloned() {
                merged.insert("recharge_product_id".to_string(), billing_id);
            }

            let platform_match = merged
                .get("shopify_product_id")
                .and_then(Value::as_u64)
                .and_then(|id| platform_by_id.get(&id));
            if let Some(platform_fields) = platform_match {
                for (key, value) in *platform_fields {
                    merged.insert(key.clone(), value.clone());
                }
            }

            Some(Value::Object(merged))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::testing::state_for;

    #[test]
    fn test_join_overlays_platform_fields() {
        let billing = vec![json!({
            "id": 100,
            "shopify_product_id": 1,
            "title": "billing title",
            "discount_amount": 15,
        })];
        let platform = vec![json!({
            "id": 1,
            "title": "Sweet Potato Mash",
            "images": [{"src": "mash.jpg"}],
        })];

        let merged = join_products(billing, &platform);

        assert_eq!(merged.len(), 1);
        let product = &merged[0];
        // Platform fields win conflicts
        assert_eq!(product["title"], "Sweet Potato Mash");
        assert_eq!(product["id"], 1);
        // Billing-only fields and the billing id survive
        assert_eq!(product["discount_amount"], 15);
        assert_eq!(product["recharge_product_id"], 100);
        assert_eq!(product["images"][0]["src"], "mash.jpg");
    }

    #[test]
    fn test_join_keeps_unmatched_billing_products() {
        let billing = vec![
            json!({"id": 100, "shopify_product_id": 1}),
            json!({"id": 200, "shopify_product_id": 2}),
        ];
        let platform = vec![json!({"id": 1, "name": "A"})];

        let merged = join_products(billing, &platform);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0]["name"], "A");

        // The unmatched billing product is present, without platform fields
        assert_eq!(merged[1]["recharge_product_id"], 200);
        assert_eq!(merged[1]["shopify_product_id"], 2);
        assert!(merged[1].get("name").is_none());
    }

    #[test]
    fn test_join_drops_platform_only_products() {
        let billing = vec![json!({"id": 100, "shopify_product_id": 1})];
        let platform = vec![
            json!({"id": 1, "name": "A"}),
            json!({"id": 99, "name": "not subscribable"}),
        ];

        let merged = join_products(billing, &platform);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["name"], "A");
    }

    #[test]
    fn test_join_with_empty_platform_list() {
        let billing = vec![json!({"id": 100, "shopify_product_id": 1, "title": "t"})];

        let merged = join_products(billing, &[]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0]["title"], "t");
        assert_eq!(merged[0]["recharge_product_id"], 100);
    }

    #[tokio::test]
    async fn test_menu_products_fetches_both_lists() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products"))
            .and(query_param("collection_id", "212146"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{"id": 100, "shopify_product_id": 1, "discount_amount": 15}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("product_type", "recipe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{"id": 1, "title": "Sweet Potato Mash"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let state = state_for(&server.uri());
        let catalog = menu_products(&state).await.unwrap();

        assert_eq!(catalog["products"][0]["title"], "Sweet Potato Mash");
        assert_eq!(catalog["products"][0]["recharge_product_id"], 100);
        assert_eq!(catalog["products"][0]["discount_amount"], 15);
    }
}
