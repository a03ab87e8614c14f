//! Holded API client for the invoicing product catalog and sales documents.
//!
//! # Supported Features
//!
//! - **Products**: paginated catalog listing and single product lookup
//! - **Documents**: invoice (and other sales document) creation and payment
//!
//! # API Reference
//!
//! - Base URL: `https://api.holded.com/api/invoicing/v1`
//! - Authentication: API key via the `key` header
//! - Some failures come back as `200 OK` with `{"status": 0, "info": "..."}`

mod documents;
mod products;
mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::HoldedConfig;

/// Path of the invoicing API below the configured base URL.
const INVOICING_PATH: &str = "/invoicing/v1";

/// Errors that can occur when interacting with the Holded API.
#[derive(Debug, Error)]
pub enum HoldedError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by Holded.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unauthorized (invalid API key).
    #[error("Unauthorized: invalid API key")]
    Unauthorized,
}

/// Holded API client.
#[derive(Clone)]
pub struct HoldedClient {
    inner: Arc<HoldedClientInner>,
}

struct HoldedClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl HoldedClient {
    /// Create a new Holded API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &HoldedConfig) -> Result<Self, HoldedError> {
        let mut headers = HeaderMap::new();

        let mut key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| HoldedError::Parse(format!("Invalid API key format: {e}")))?;
        key.set_sensitive(true);
        headers.insert("key", key);
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(HoldedClientInner {
                client,
                base_url: format!("{}{INVOICING_PATH}", config.api_url),
            }),
        })
    }

    /// Execute a GET request to the Holded API.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, HoldedError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).query(query).send().await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request to the Holded API.
    pub(crate) async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HoldedError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.post(&url).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, HoldedError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|e| {
                // Errors reported in a 200 body do not match the success shape
                match serde_json::from_str::<ApiStatus>(&body) {
                    Ok(s) if s.is_failure() => HoldedError::Api {
                        status: status.as_u16(),
                        message: s.info.unwrap_or_else(|| "request rejected".to_string()),
                    },
                    _ => HoldedError::Parse(format!("Failed to parse response: {e}")),
                }
            });
        }

        Err(Self::parse_error(response).await)
    }

    /// Parse error response from the Holded API.
    async fn parse_error(response: reqwest::Response) -> HoldedError {
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return HoldedError::RateLimited(retry_after);
        }

        if status == 401 || status == 403 {
            return HoldedError::Unauthorized;
        }

        let body = response.text().await.unwrap_or_default();

        if status == 404 {
            return HoldedError::NotFound(
                serde_json::from_str::<ApiStatus>(&body)
                    .ok()
                    .and_then(|s| s.info)
                    .unwrap_or_else(|| "Resource not found".to_string()),
            );
        }

        let message = serde_json::from_str::<ApiStatus>(&body)
            .ok()
            .and_then(|s| s.info)
            .unwrap_or(if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body
            });

        HoldedError::Api { status, message }
    }
}

impl std::fmt::Debug for HoldedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoldedClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HoldedClient {
        HoldedClient::new(&HoldedConfig {
            api_url: server.uri(),
            api_key: SecretString::from("8d2f6a1c9e4b7d3a5f0c2e8b6d1a9f4c"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_sends_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoicing/v1/products/p1"))
            .and(header("key", "8d2f6a1c9e4b7d3a5f0c2e8b6d1a9f4c"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "p1", "kind": "simple", "name": "Mug", "sku": "MUG"
            })))
            .mount(&server)
            .await;

        let product = client(&server)
            .get_product(&woo_holded_core::HoldedProductId::new("p1"))
            .await
            .unwrap();
        assert_eq!(product.sku.as_deref(), Some("MUG"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(path("/invoicing/v1/products/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "status": 0, "info": "Product not found"
            })))
            .mount(&server)
            .await;
        Mock::given(path("/invoicing/v1/products/busy"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;
        Mock::given(path("/invoicing/v1/products/denied"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/invoicing/v1/products/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client(&server);
        let get = |id: &'static str| {
            let client = client.clone();
            async move {
                client
                    .get_product(&woo_holded_core::HoldedProductId::new(id))
                    .await
                    .unwrap_err()
            }
        };

        assert!(matches!(get("missing").await, HoldedError::NotFound(m) if m == "Product not found"));
        assert!(matches!(get("busy").await, HoldedError::RateLimited(7)));
        assert!(matches!(get("denied").await, HoldedError::Unauthorized));
        assert!(
            matches!(get("broken").await, HoldedError::Api { status: 500, message } if message == "boom")
        );
    }
}
