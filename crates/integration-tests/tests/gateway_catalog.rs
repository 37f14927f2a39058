//! Catalog endpoints: raw provider lists, GraphQL flattening and the
//! joined menu view.

use reqwest::StatusCode;
use serde_json::{Value, json};
use tiny_greens_integration_tests::TestGateway;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_storefront_products_are_flattened() {
    let gateway = TestGateway::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .and(header("X-Shopify-Storefront-Access-Token", "storefront_token"))
        .and(body_string_contains("products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "products": {
                    "edges": [
                        {
                            "node": {
                                "id": "gid://shopify/Product/1001",
                                "title": "Garden Pesto",
                                "variants": {
                                    "edges": [
                                        { "node": { "id": "gid://shopify/ProductVariant/9001" } }
                                    ]
                                }
                            }
                        }
                    ]
                }
            }
        })))
        .expect(1)
        .mount(&gateway.upstream)
        .await;

    let resp = gateway
        .client
        .get(gateway.url("/products/"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("bad json");

    // The edges/node nesting is flattened into plain arrays at every level
    assert_eq!(
        body,
        json!([
            {
                "id": "gid://shopify/Product/1001",
                "title": "Garden Pesto",
                "variants": [
                    { "id": "gid://shopify/ProductVariant/9001" }
                ]
            }
        ])
    );
}

#[tokio::test]
async fn test_collections_with_products() {
    let gateway = TestGateway::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .and(body_string_contains("collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "collections": {
                    "edges": [
                        {
                            "node": {
                                "id": "gid://shopify/Collection/55",
                                "title": "Weekly Menu",
                                "products": { "edges": [] }
                            }
                        }
                    ]
                }
            }
        })))
        .mount(&gateway.upstream)
        .await;

    let resp = gateway
        .client
        .get(gateway.url("/collections/with-products/"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("bad json");
    assert_eq!(
        body,
        json!([
            {
                "id": "gid://shopify/Collection/55",
                "title": "Weekly Menu",
                "products": []
            }
        ])
    );
}

#[tokio::test]
async fn test_graphql_errors_map_to_502() {
    let gateway = TestGateway::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{ "message": "Throttled" }]
        })))
        .mount(&gateway.upstream)
        .await;

    let resp = gateway
        .client
        .get(gateway.url("/products/"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = resp.json().await.expect("bad json");
    assert_eq!(body, json!({ "error": "External service error" }));
}

#[tokio::test]
async fn test_recharge_products_carry_the_subscription_collection() {
    let gateway = TestGateway::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("collection_id", "212146"))
        .and(header("X-Recharge-Access-Token", "recharge_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{ "id": 11, "title": "Garden Pesto" }]
        })))
        .expect(1)
        .mount(&gateway.upstream)
        .await;

    let resp = gateway
        .client
        .get(gateway.url("/recharge-products/"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("bad json");
    assert_eq!(body, json!({ "products": [{ "id": 11, "title": "Garden Pesto" }] }));
}

#[tokio::test]
async fn test_shopify_menu_products_filter_by_recipe_type() {
    let gateway = TestGateway::start().await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("product_type", "recipe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{ "id": 1001, "title": "Garden Pesto" }]
        })))
        .expect(1)
        .mount(&gateway.upstream)
        .await;

    let resp = gateway
        .client
        .get(gateway.url("/shopify-menu-products/"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("bad json");
    assert_eq!(
        body.get("products").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn test_menu_products_joins_billing_and_platform() {
    let gateway = TestGateway::start().await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("collection_id", "212146"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {
                    "id": 11,
                    "title": "Billing Pesto",
                    "shopify_product_id": 1001,
                    "charge_interval_frequency": 7
                },
                {
                    "id": 12,
                    "title": "Billing Only",
                    "shopify_product_id": 2002
                }
            ]
        })))
        .expect(1)
        .mount(&gateway.upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(query_param("product_type", "recipe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {
                    "id": 1001,
                    "title": "Garden Pesto",
                    "image": { "src": "https://cdn.example.com/pesto.png" }
                },
                {
                    "id": 9999,
                    "title": "Platform Only"
                }
            ]
        })))
        .expect(1)
        .mount(&gateway.upstream)
        .await;

    let resp = gateway
        .client
        .get(gateway.url("/menu-products/"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("bad json");
    let products = body
        .get("products")
        .and_then(Value::as_array)
        .expect("no products array");

    // Billing-driven: both billing products survive, the platform-only one is dropped
    assert_eq!(products.len(), 2);

    let matched = products
        .first()
        .and_then(Value::as_object)
        .expect("first product");
    // Platform fields win the merge, billing id survives as recharge_product_id
    assert_eq!(matched.get("title"), Some(&json!("Garden Pesto")));
    assert_eq!(matched.get("recharge_product_id"), Some(&json!(11)));
    assert_eq!(matched.get("charge_interval_frequency"), Some(&json!(7)));
    assert_eq!(
        matched.get("image"),
        Some(&json!({ "src": "https://cdn.example.com/pesto.png" }))
    );

    let unmatched = products
        .get(1)
        .and_then(Value::as_object)
        .expect("second product");
    assert_eq!(unmatched.get("title"), Some(&json!("Billing Only")));
    assert_eq!(unmatched.get("recharge_product_id"), Some(&json!(12)));
}
