//! Product sync and order export triggers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use woo_holded_core::{BatchProgress, WcOrderId};

use crate::error::AppError;
use crate::middleware::RequireApiToken;
use crate::state::AppState;
use crate::sync::ExportOutcome;

/// Build the sync router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sync/products", get(progress).post(start))
        .route("/api/sync/products/step", post(step))
        .route("/api/sync/orders/{id}", post(export_order))
}

/// Query parameters for order export.
#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub force: bool,
}

/// GET /api/sync/products - Progress without processing anything.
///
/// # Errors
///
/// Returns an error if the tracker cannot be read.
pub async fn progress(
    _auth: RequireApiToken,
    State(state): State<AppState>,
) -> Result<Json<BatchProgress>, AppError> {
    Ok(Json(state.runner().progress().await?))
}

/// POST /api/sync/products - Start a new epoch.
///
/// # Errors
///
/// Returns an error if the Holded catalog cannot be listed.
#[instrument(skip_all)]
pub async fn start(
    _auth: RequireApiToken,
    State(state): State<AppState>,
) -> Result<Json<BatchProgress>, AppError> {
    Ok(Json(state.runner().start().await?))
}

/// POST /api/sync/products/step - Process the next batch.
///
/// # Errors
///
/// Returns an error on storage failures or when a new epoch cannot list the
/// catalog. Product failures are reported in the progress, not as errors.
#[instrument(skip_all)]
pub async fn step(
    _auth: RequireApiToken,
    State(state): State<AppState>,
) -> Result<Json<BatchProgress>, AppError> {
    let progress = state.runner().step().await?;
    tracing::info!(
        synced = progress.synced,
        total = progress.total,
        done = progress.done,
        "Batch processed"
    );
    Ok(Json(progress))
}

/// POST /api/sync/orders/{id} - Export one order to Holded.
///
/// # Errors
///
/// Returns 404 for an unknown order, 422 when the order cannot be mapped and
/// 502 when either API fails.
#[instrument(skip(state, _auth))]
pub async fn export_order(
    _auth: RequireApiToken,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ExportParams>,
) -> Result<Json<ExportOutcome>, AppError> {
    let outcome = state
        .exporter()
        .export_order(WcOrderId::new(id), params.force)
        .await?;
    Ok(Json(outcome))
}
