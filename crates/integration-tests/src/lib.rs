//! Integration tests for the WooCommerce ⇄ Holded sync.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p woo-holded-integration-tests
//! ```
//!
//! Every test gets its own in-memory `SQLite` database and two `wiremock`
//! servers standing in for the WooCommerce and Holded APIs, so no network
//! or external database is needed.
//!
//! # Test Categories
//!
//! - `product_sync` - Batch runner epochs against mocked catalogs
//! - `order_export` - Order to document export and deduplication
//! - `webhooks` - Signed webhook deliveries through the router

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;

use secrecy::SecretString;
use sqlx::SqlitePool;
use wiremock::MockServer;

use woo_holded_sync::{AppState, SyncConfig, db};

/// Bearer token accepted by the test service.
pub const API_TOKEN: &str = "q7Zp2LxV9mKc4RtW8bNf3HsJ6dGy1Ae5";

/// Webhook secret configured in the test service.
pub const WEBHOOK_SECRET: &str = "Wh7kP2xQ9vL4mZ8cR3tY6nB1gF5jD0sA";

/// REST prefix of the mocked WooCommerce API.
pub const WC_API: &str = "/wp-json/wc/v3";

/// Path prefix of the mocked Holded API.
pub const HOLDED_API: &str = "/invoicing/v1";

/// Mocked upstreams plus a service wired to them.
pub struct TestContext {
    pub woocommerce: MockServer,
    pub holded: MockServer,
    pub pool: SqlitePool,
    pub state: AppState,
}

impl TestContext {
    /// Default configuration.
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Default configuration with `overrides` applied on top.
    pub async fn with_env(overrides: &[(&str, &str)]) -> Self {
        let woocommerce = MockServer::start().await;
        let holded = MockServer::start().await;

        let mut vars: HashMap<String, String> = [
            ("SYNC_API_TOKEN", API_TOKEN),
            ("WOOCOMMERCE_CONSUMER_KEY", "ck_4f1d9a7c2e8b"),
            ("WOOCOMMERCE_CONSUMER_SECRET", "cs_9b3e7f1a5c2d8e4b6a0f3c7d1e9b5a2f"),
            ("WOOCOMMERCE_WEBHOOK_SECRET", WEBHOOK_SECRET),
            ("HOLDED_API_KEY", "8d2f6a1c9e4b7d3a5f0c2e8b6d1a9f4c"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.insert("WOOCOMMERCE_URL".to_string(), woocommerce.uri());
        vars.insert("HOLDED_API_URL".to_string(), holded.uri());
        for (key, value) in overrides {
            vars.insert((*key).to_string(), (*value).to_string());
        }

        let config = SyncConfig::from_map(&vars).unwrap();
        let pool = db::create_pool(&SecretString::from("sqlite::memory:"))
            .await
            .unwrap();
        db::run_migrations(&pool).await.unwrap();
        let state = AppState::new(config, pool.clone()).unwrap();

        Self {
            woocommerce,
            holded,
            pool,
            state,
        }
    }
}

/// A Holded simple product as the API returns it.
#[must_use]
pub fn holded_product(id: &str, name: &str, sku: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "kind": "simple",
        "name": name,
        "desc": "",
        "price": 10.0,
        "tax": 21,
        "total": 12.1,
        "stock": 4,
        "sku": sku,
        "tags": [],
        "forSale": 1
    })
}

/// A completed, paid WooCommerce order with one line.
#[must_use]
pub fn wc_order(id: i64, total: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "number": id.to_string(),
        "status": "completed",
        "currency": "EUR",
        "date_created_gmt": "2024-03-01T10:00:00",
        "date_paid_gmt": "2024-03-01T10:05:00",
        "total": total,
        "total_tax": "5.04",
        "billing": {
            "first_name": "Ada",
            "last_name": "Lovelace",
            "address_1": "Calle Mayor 1",
            "city": "Madrid",
            "postcode": "28013",
            "country": "ES",
            "email": "ada@example.org"
        },
        "payment_method_title": "Card",
        "line_items": [{
            "id": 1,
            "name": "Mug",
            "product_id": 50,
            "quantity": 3,
            "subtotal": "30.00",
            "subtotal_tax": "6.30",
            "total": "24.00",
            "total_tax": "5.04",
            "sku": "MUG",
            "taxes": [{"id": 7, "total": "5.04", "subtotal": "6.30"}]
        }],
        "tax_lines": [{"id": 90, "rate_id": 7, "label": "IVA", "rate_percent": 21}]
    })
}
