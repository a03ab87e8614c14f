//! HTTP route handlers for the sync service.
//!
//! # Route Structure
//!
//! ```text
//! # Product sync (bearer token)
//! GET  /api/sync/products        - Progress of the current epoch
//! POST /api/sync/products        - Start a new epoch
//! POST /api/sync/products/step   - Process the next batch
//!
//! # Order export (bearer token)
//! POST /api/sync/orders/{id}     - Export one order (`?force=true` re-exports)
//!
//! # Webhooks (signed)
//! POST /webhooks/woocommerce/orders - Order created/updated delivery
//! ```
//!
//! Health endpoints are mounted by the binary.

pub mod sync;
pub mod webhooks;

use axum::Router;

use crate::state::AppState;

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(sync::router())
        .merge(webhooks::router())
}
