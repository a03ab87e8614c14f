//! WooCommerce webhook receiver.
//!
//! Configure an "Order updated" webhook pointing at
//! `/webhooks/woocommerce/orders` with the same secret as
//! `WOOCOMMERCE_WEBHOOK_SECRET`. Orders are exported once they reach the
//! configured export status.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::signature::SIGNATURE_HEADER;
use crate::middleware::verify_webhook_signature;
use crate::state::AppState;
use crate::woocommerce::WcOrder;

/// Header naming the webhook topic (`order.updated`, ...).
const TOPIC_HEADER: &str = "x-wc-webhook-topic";

/// Build the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/woocommerce/orders", post(order_webhook))
}

/// POST /webhooks/woocommerce/orders - Signed order delivery.
///
/// # Errors
///
/// Returns 401 when the signature is missing or wrong (or no secret is
/// configured), 400 for a body that is not an order, and the export error
/// otherwise.
#[instrument(skip_all, fields(topic = tracing::field::Empty))]
pub async fn order_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let Some(secret) = state.config().woocommerce.webhook_secret.as_ref() else {
        return Err(AppError::Unauthorized(
            "webhook secret not configured".to_string(),
        ));
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_webhook_signature(&body, signature, secret.expose_secret()) {
        tracing::warn!("Rejected webhook with invalid signature");
        return Err(AppError::Unauthorized("invalid signature".to_string()));
    }

    let topic = headers
        .get(TOPIC_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    tracing::Span::current().record("topic", topic);

    // WooCommerce pings a new webhook with a form body
    if body.starts_with(b"webhook_id=") {
        tracing::info!("Webhook ping received");
        return Ok(StatusCode::OK.into_response());
    }

    let order: WcOrder = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid order payload: {e}")))?;

    let outcome = state.exporter().export_on_status(&order).await?;
    Ok(Json(outcome).into_response())
}
