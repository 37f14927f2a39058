//! Shopify Admin REST API client.
//!
//! Authenticates with basic auth (API key + password) installed as a default
//! header. Admin resources are enveloped: requests wrap the payload under a
//! singular key and responses come back the same way, so the customer helpers
//! here do the wrapping and unwrapping in one place.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;

use super::ShopifyError;
use crate::config::ShopifyConfig;

/// Shopify Admin API client.
///
/// Cheap to clone; all clones share one connection pool and the basic-auth
/// credentials installed as a default header.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials contain invalid header characters
    /// or the HTTP client fails to build.
    pub fn new(config: &ShopifyConfig) -> Result<Self, ShopifyError> {
        let credentials = format!("{}:{}", config.api_key, config.password.expose_secret());
        let basic = format!("Basic {}", BASE64.encode(credentials));

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&basic)
            .map_err(|e| ShopifyError::Shape(format!("Invalid credential format: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.admin_endpoint().trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Create a customer. The payload is enveloped as `{"customer": …}` and
    /// the created resource is unwrapped from the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify rejects it (a
    /// duplicate email is a 422 `Api` error).
    pub async fn create_customer(&self, customer: &Value) -> Result<Value, ShopifyError> {
        let body = serde_json::json!({ "customer": customer });
        let response = self.post("customers.json", &body).await?;
        unwrap_customer(response)
    }

    /// Update a customer by id, enveloped like [`Self::create_customer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify rejects it.
    pub async fn update_customer(&self, id: u64, customer: &Value) -> Result<Value, ShopifyError> {
        let body = serde_json::json!({ "customer": customer });
        let response = self.put(&format!("customers/{id}.json"), &body).await?;
        unwrap_customer(response)
    }

    /// Look up customers by exact email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is missing the
    /// `customers` array.
    pub async fn list_customers_by_email(&self, email: &str) -> Result<Vec<Value>, ShopifyError> {
        let path = format!("customers.json?email={}", urlencoding::encode(email));
        let mut response = self.get(&path).await?;

        match response.get_mut("customers").map(Value::take) {
            Some(Value::Array(customers)) => Ok(customers),
            _ => Err(ShopifyError::Shape(
                "customers array missing from lookup response".to_string(),
            )),
        }
    }

    /// Send a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify rejects it.
    pub async fn get(&self, path: &str) -> Result<Value, ShopifyError> {
        self.execute(Method::GET, path, None).await
    }

    /// Send a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify rejects it.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ShopifyError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    /// Send a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Shopify rejects it.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Value, ShopifyError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ShopifyError> {
        let url = format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'));

        let mut request = self.inner.http.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            if text.is_empty() {
                return Ok(Value::Null);
            }
            serde_json::from_str(&text)
                .map_err(|e| ShopifyError::Shape(format!("invalid JSON in {status} response: {e}")))
        } else {
            let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
            Err(ShopifyError::Api { status, body })
        }
    }
}

fn unwrap_customer(mut response: Value) -> Result<Value, ShopifyError> {
    match response.get_mut("customer").map(Value::take) {
        Some(customer @ Value::Object(_)) => Ok(customer),
        _ => Err(ShopifyError::Shape(
            "customer missing from admin response".to_string(),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(base_url: String) -> ShopifyConfig {
        ShopifyConfig {
            domain: "test.myshopify.com".to_string(),
            api_version: "2023-07".to_string(),
            api_key: "key".to_string(),
            password: SecretString::from("pw"),
            storefront_token: "sf_token".to_string(),
            admin_base_url: Some(base_url),
            storefront_api_url: None,
        }
    }

    #[tokio::test]
    async fn test_sends_basic_auth_header() {
        let server = MockServer::start().await;
        let expected = format!("Basic {}", BASE64.encode("key:pw"));

        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(header("Authorization", expected.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(&test_config(server.uri())).unwrap();
        let body = client.get("products.json").await.unwrap();

        assert_eq!(body, json!({"products": []}));
    }

    #[tokio::test]
    async fn test_create_customer_envelopes_and_unwraps() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers.json"))
            .and(body_json(json!({"customer": {"email": "kid@example.com"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "customer": {"id": 1001, "email": "kid@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(&test_config(server.uri())).unwrap();
        let customer = client
            .create_customer(&json!({"email": "kid@example.com"}))
            .await
            .unwrap();

        assert_eq!(customer["id"], 1001);
    }

    #[tokio::test]
    async fn test_update_customer_puts_to_customer_path() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/customers/1001.json"))
            .and(body_json(json!({"customer": {"first_name": "Ada"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "customer": {"id": 1001, "first_name": "Ada"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(&test_config(server.uri())).unwrap();
        let customer = client
            .update_customer(1001, &json!({"first_name": "Ada"}))
            .await
            .unwrap();

        assert_eq!(customer["first_name"], "Ada");
    }

    #[tokio::test]
    async fn test_list_customers_by_email_unwraps_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers.json"))
            .and(query_param("email", "kid@example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "customers": [{"id": 1001, "email": "kid@example.com"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AdminClient::new(&test_config(server.uri())).unwrap();
        let customers = client
            .list_customers_by_email("kid@example.com")
            .await
            .unwrap();

        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0]["id"], 1001);
    }

    #[tokio::test]
    async fn test_missing_customer_envelope_is_shape_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = AdminClient::new(&test_config(server.uri())).unwrap();
        let err = client.create_customer(&json!({})).await.unwrap_err();

        assert!(matches!(err, ShopifyError::Shape(_)));
    }
}
