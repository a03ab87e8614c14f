//! Integration tests for product sync epochs.
//!
//! The Holded catalog and the WooCommerce product endpoints are mocked; the
//! tracker, option storage and error collector run on a real `SQLite`
//! database.

use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use woo_holded_integration_tests::{HOLDED_API, TestContext, WC_API, holded_product};
use woo_holded_sync::sync::ErrorCollector;

async fn mount_catalog(ctx: &TestContext, products: &[serde_json::Value]) {
    Mock::given(method("GET"))
        .and(path(format!("{HOLDED_API}/products")))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(products))
        .mount(&ctx.holded)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{HOLDED_API}/products")))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&ctx.holded)
        .await;

    for product in products {
        let id = product["id"].as_str().unwrap_or_default();
        Mock::given(method("GET"))
            .and(path(format!("{HOLDED_API}/products/{id}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(product))
            .mount(&ctx.holded)
            .await;
    }
}

async fn mount_empty_shop(ctx: &TestContext, expected_creates: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{WC_API}/products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&ctx.woocommerce)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{WC_API}/products")))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({"id": 500, "name": "Created", "sku": "X"})),
        )
        .expect(expected_creates)
        .mount(&ctx.woocommerce)
        .await;
}

// =============================================================================
// Epoch lifecycle
// =============================================================================

#[tokio::test]
async fn test_epoch_drains_and_collects_failures() {
    let ctx = TestContext::with_env(&[("SYNC_BATCH_SIZE", "2")]).await;
    mount_catalog(
        &ctx,
        &[
            holded_product("p1", "Mug", Some("MUG")),
            holded_product("p2", "Cap", Some("CAP")),
            holded_product("p3", "Loose item", None),
        ],
    )
    .await;
    mount_empty_shop(&ctx, 2).await;

    let runner = ctx.state.runner();

    let first = runner.step().await.unwrap();
    assert!(first.epoch_id.is_some());
    assert_eq!(first.total, 3);
    assert_eq!(first.processed, 2);
    assert_eq!(first.synced, 2);
    assert_eq!(first.remaining, 1);
    assert_eq!(first.failed, 0);
    assert!(!first.done);

    let second = runner.step().await.unwrap();
    assert_eq!(second.epoch_id, first.epoch_id);
    assert_eq!(second.processed, 1);
    assert_eq!(second.remaining, 0);
    assert_eq!(second.failed, 1);
    assert!(second.done);
    assert_eq!(second.percent(), 100);

    // Without SMTP the report is logged and the failures released
    let collector = ErrorCollector::new(&ctx.pool);
    assert_eq!(collector.count().await.unwrap(), 0);

    // A drained epoch is not reprocessed
    let third = runner.step().await.unwrap();
    assert_eq!(third.processed, 0);
    assert_eq!(third.epoch_id, first.epoch_id);
    assert_eq!(third.failed, 1);
    assert!(third.done);
}

#[tokio::test]
async fn test_concurrent_steps_process_each_product_once() {
    let ctx = TestContext::with_env(&[("SYNC_BATCH_SIZE", "2")]).await;
    mount_catalog(
        &ctx,
        &[
            holded_product("p1", "Mug", Some("MUG")),
            holded_product("p2", "Cap", Some("CAP")),
            holded_product("p3", "Tote", Some("TOTE")),
        ],
    )
    .await;

    Mock::given(method("GET"))
        .and(path(format!("{WC_API}/products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&ctx.woocommerce)
        .await;
    for (id, sku) in [(501, "MUG"), (502, "CAP"), (503, "TOTE")] {
        Mock::given(method("POST"))
            .and(path(format!("{WC_API}/products")))
            .and(body_partial_json(serde_json::json!({"sku": sku})))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"id": id, "name": sku, "sku": sku})),
            )
            .expect(1)
            .mount(&ctx.woocommerce)
            .await;
    }

    let runner = ctx.state.runner();
    let (a, b) = tokio::join!(runner.step(), runner.step());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.processed + b.processed, 3);
    assert_eq!(a.epoch_id, b.epoch_id);

    let status = runner.progress().await.unwrap();
    assert_eq!(status.synced, 3);
    assert_eq!(status.remaining, 0);
    assert!(status.done);
}

#[tokio::test]
async fn test_start_begins_a_fresh_epoch() {
    let ctx = TestContext::new().await;
    mount_catalog(&ctx, &[holded_product("p1", "Mug", Some("MUG"))]).await;
    mount_empty_shop(&ctx, 1).await;

    let runner = ctx.state.runner();
    let done = runner.step().await.unwrap();
    assert!(done.done);

    let restarted = runner.start().await.unwrap();
    assert_ne!(restarted.epoch_id, done.epoch_id);
    assert_eq!(restarted.total, 1);
    assert_eq!(restarted.synced, 0);
    assert_eq!(restarted.remaining, 1);
    assert!(!restarted.done);

    let status = runner.progress().await.unwrap();
    assert_eq!(status, restarted);
}

#[tokio::test]
async fn test_tag_filter_limits_the_epoch() {
    let ctx = TestContext::with_env(&[("SYNC_TAG_FILTER", "web")]).await;
    let mut tagged = holded_product("p1", "Mug", Some("MUG"));
    tagged["tags"] = serde_json::json!(["Web", "kitchen"]);
    mount_catalog(&ctx, &[tagged, holded_product("p2", "Cap", Some("CAP"))]).await;
    mount_empty_shop(&ctx, 1).await;

    let progress = ctx.state.runner().step().await.unwrap();
    assert_eq!(progress.total, 1);
    assert!(progress.done);
}

#[tokio::test]
async fn test_empty_catalog_finishes_immediately() {
    let ctx = TestContext::new().await;
    mount_catalog(&ctx, &[]).await;

    let progress = ctx.state.runner().step().await.unwrap();
    assert_eq!(progress.total, 0);
    assert_eq!(progress.processed, 0);
    assert!(progress.done);
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_rate_limit_leaves_row_for_next_step() {
    let ctx = TestContext::new().await;
    let product = holded_product("p1", "Mug", Some("MUG"));

    Mock::given(method("GET"))
        .and(path(format!("{HOLDED_API}/products/p1")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "5"))
        .up_to_n_times(1)
        .mount(&ctx.holded)
        .await;
    mount_catalog(&ctx, &[product]).await;
    mount_empty_shop(&ctx, 1).await;

    let runner = ctx.state.runner();

    let limited = runner.step().await.unwrap();
    assert_eq!(limited.processed, 0);
    assert_eq!(limited.remaining, 1);
    assert_eq!(limited.failed, 0);
    assert!(!limited.done);

    let resumed = runner.step().await.unwrap();
    assert_eq!(resumed.processed, 1);
    assert_eq!(resumed.failed, 0);
    assert!(resumed.done);
}

#[tokio::test]
async fn test_rejected_product_is_recorded_and_epoch_still_drains() {
    let ctx = TestContext::new().await;
    mount_catalog(&ctx, &[holded_product("p1", "Mug", Some("MUG"))]).await;

    Mock::given(method("GET"))
        .and(path(format!("{WC_API}/products")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&ctx.woocommerce)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{WC_API}/products")))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "product_invalid_sku",
            "message": "Invalid or duplicated SKU.",
            "data": {"status": 400}
        })))
        .mount(&ctx.woocommerce)
        .await;

    let progress = ctx.state.runner().step().await.unwrap();
    assert_eq!(progress.processed, 1);
    assert_eq!(progress.failed, 1);
    assert!(progress.done);
}

#[tokio::test]
async fn test_undelivered_report_keeps_failures() {
    // Nothing listens on port 1, so the summary email cannot be sent
    let ctx = TestContext::with_env(&[
        ("SMTP_HOST", "127.0.0.1"),
        ("SMTP_PORT", "1"),
        ("SMTP_USERNAME", "sync@example.org"),
        ("SMTP_PASSWORD", "q7Vt2mXe9LpR4sKw"),
        ("SMTP_FROM", "sync@example.org"),
        ("SYNC_REPORT_TO", "shop@example.org"),
    ])
    .await;
    mount_catalog(
        &ctx,
        &[
            holded_product("p1", "Mug", Some("MUG")),
            holded_product("p2", "Loose item", None),
        ],
    )
    .await;
    mount_empty_shop(&ctx, 1).await;

    let runner = ctx.state.runner();
    let progress = runner.step().await.unwrap();
    assert_eq!(progress.processed, 2);
    assert_eq!(progress.failed, 1);
    assert!(progress.done);

    let collector = ErrorCollector::new(&ctx.pool);
    assert_eq!(collector.count().await.unwrap(), 1);

    // The finished epoch is not reported again
    let again = runner.step().await.unwrap();
    assert_eq!(again.processed, 0);
    assert_eq!(again.epoch_id, progress.epoch_id);
    assert!(again.done);
    assert_eq!(collector.count().await.unwrap(), 1);
}
