//! Order export commands.
//!
//! # Usage
//!
//! ```bash
//! # Export one order (again, with --force)
//! whs orders export 1234 --force
//!
//! # Export every completed order not yet in Holded
//! whs orders backfill --status completed
//! ```

use woo_holded_core::{OrderStatus, WcOrderId};

use super::{CliError, Context, print_json};

/// Export one order.
///
/// # Errors
///
/// Returns `CliError` if the order cannot be fetched, mapped or created.
pub async fn export(ctx: &Context, id: i64, force: bool) -> Result<(), CliError> {
    let outcome = ctx
        .state
        .exporter()
        .export_order(WcOrderId::new(id), force)
        .await?;
    print_json(&outcome)
}

/// Export every order in `status` (default: the configured export status).
///
/// # Errors
///
/// Returns `CliError` if a page of orders cannot be listed. Single order
/// failures are counted in the summary.
pub async fn backfill(ctx: &Context, status: Option<OrderStatus>) -> Result<(), CliError> {
    let exporter = ctx.state.exporter();
    let status = status.unwrap_or_else(|| exporter.export_status());

    tracing::info!(%status, "Backfilling orders");
    let summary = exporter.backfill(status).await?;
    print_json(&summary)
}
