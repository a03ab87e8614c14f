//! Integration tests for signed WooCommerce webhook deliveries.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use woo_holded_integration_tests::{HOLDED_API, TestContext, WC_API, WEBHOOK_SECRET, wc_order};
use woo_holded_sync::db::ExportedOrderRepository;
use woo_holded_sync::middleware::signature::sign_webhook;
use woo_holded_sync::routes;

fn app(ctx: &TestContext) -> Router {
    routes::routes().with_state(ctx.state.clone())
}

fn delivery(body: &str, secret: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhooks/woocommerce/orders")
        .header("content-type", "application/json")
        .header("x-wc-webhook-topic", "order.updated")
        .header("x-wc-webhook-signature", sign_webhook(body.as_bytes(), secret))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_completed_order_is_exported_once() {
    let ctx = TestContext::new().await;

    Mock::given(method("POST"))
        .and(path(format!("{HOLDED_API}/documents/invoice")))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({"status": 1, "id": "doc-7"})),
        )
        .expect(1)
        .mount(&ctx.holded)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{WC_API}/orders/1001/notes")))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 3, "note": "ok"})),
        )
        .expect(1)
        .mount(&ctx.woocommerce)
        .await;

    let body = wc_order(1001, "29.04").to_string();

    let response = app(&ctx)
        .oneshot(delivery(&body, WEBHOOK_SECRET))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let outcome: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(outcome["result"], "exported");
    assert_eq!(outcome["detail"]["document_id"], "doc-7");

    // WooCommerce redelivers on every order update
    let again = app(&ctx)
        .oneshot(delivery(&body, WEBHOOK_SECRET))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::OK);
    let bytes = to_bytes(again.into_body(), 64 * 1024).await.unwrap();
    let outcome: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(outcome["result"], "already_exported");

    let repo = ExportedOrderRepository::new(&ctx.pool);
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_forged_delivery_is_rejected() {
    let ctx = TestContext::new().await;
    let body = wc_order(1001, "29.04").to_string();

    let response = app(&ctx)
        .oneshot(delivery(&body, "not-the-secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let repo = ExportedOrderRepository::new(&ctx.pool);
    assert_eq!(repo.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_api_order_export_requires_token_and_maps_missing_order() {
    let ctx = TestContext::new().await;

    Mock::given(method("GET"))
        .and(path(format!("{WC_API}/orders/404")))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "code": "woocommerce_rest_shop_order_invalid_id",
            "message": "Invalid ID.",
            "data": {"status": 404}
        })))
        .mount(&ctx.woocommerce)
        .await;

    let anonymous = Request::builder()
        .method("POST")
        .uri("/api/sync/orders/404")
        .body(Body::empty())
        .unwrap();
    let response = app(&ctx).oneshot(anonymous).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let authorized = Request::builder()
        .method("POST")
        .uri("/api/sync/orders/404")
        .header(
            "authorization",
            format!("Bearer {}", woo_holded_integration_tests::API_TOKEN),
        )
        .body(Body::empty())
        .unwrap();
    let response = app(&ctx).oneshot(authorized).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
