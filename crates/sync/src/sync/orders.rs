//! Export of WooCommerce orders as Holded documents.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

use woo_holded_core::{DocumentType, ExportedOrder, OrderStatus, WcOrderId};

use crate::config::OrderExportConfig;
use crate::db::{ExportedOrderRepository, RepositoryError};
use crate::holded::{HoldedClient, HoldedError, PaymentInput};
use crate::mapping::{MappingError, map_order};
use crate::woocommerce::{WcOrder, WooCommerceClient, WooCommerceError};

/// Orders requested per page when backfilling.
const BACKFILL_PAGE_SIZE: u32 = 50;

/// Errors that can occur while exporting an order.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("WooCommerce: {0}")]
    WooCommerce(#[from] WooCommerceError),

    #[error("Holded: {0}")]
    Holded(#[from] HoldedError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Why an order was not exported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Document type is `nosync`.
    ExportDisabled,
    /// Zero total and free orders are not exported.
    FreeOrder,
    /// Not in the status that triggers an export.
    StatusMismatch,
}

/// Result of an export request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum ExportOutcome {
    Exported(ExportedOrder),
    AlreadyExported(ExportedOrder),
    Skipped(SkipReason),
}

/// Totals of a backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    pub exported: u64,
    pub already_exported: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Creates Holded documents for WooCommerce orders.
#[derive(Debug, Clone)]
pub struct OrderExporter {
    pool: SqlitePool,
    woocommerce: WooCommerceClient,
    holded: HoldedClient,
    config: OrderExportConfig,
    /// Held from the duplicate check until the export is recorded.
    lock: Arc<Mutex<()>>,
}

impl OrderExporter {
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        woocommerce: WooCommerceClient,
        holded: HoldedClient,
        config: OrderExportConfig,
    ) -> Self {
        Self {
            pool,
            woocommerce,
            holded,
            config,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Status that triggers an export.
    #[must_use]
    pub const fn export_status(&self) -> OrderStatus {
        self.config.export_status
    }

    /// Fetch an order and export it.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if the order cannot be fetched, mapped or created
    /// in Holded, or the export cannot be recorded.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn export_order(
        &self,
        order_id: WcOrderId,
        force: bool,
    ) -> Result<ExportOutcome, ExportError> {
        let order = self.woocommerce.get_order(order_id).await?;
        self.export(&order, force).await
    }

    /// Export an order delivered by a webhook, if it is in the export status.
    ///
    /// # Errors
    ///
    /// Same as [`OrderExporter::export`].
    pub async fn export_on_status(&self, order: &WcOrder) -> Result<ExportOutcome, ExportError> {
        if order.status != self.config.export_status {
            tracing::debug!(
                order_id = %order.id,
                status = %order.status,
                "Order not in export status"
            );
            return Ok(ExportOutcome::Skipped(SkipReason::StatusMismatch));
        }
        self.export(order, false).await
    }

    /// Export an already fetched order.
    ///
    /// Unless `force` is set, an order is exported at most once, also when
    /// the same order is exported concurrently.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if mapping or document creation fails, or the
    /// export cannot be recorded.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn export(&self, order: &WcOrder, force: bool) -> Result<ExportOutcome, ExportError> {
        let doc_type = self.config.doc_type;
        if doc_type == DocumentType::NoSync {
            return Ok(ExportOutcome::Skipped(SkipReason::ExportDisabled));
        }

        let guard = self.lock.lock().await;
        let exports = ExportedOrderRepository::new(&self.pool);
        if !force && let Some(existing) = exports.get(order.id).await? {
            tracing::debug!(document_id = %existing.document_id, "Order already exported");
            return Ok(ExportOutcome::AlreadyExported(existing));
        }

        if order.total.is_zero() && !self.config.sync_free {
            return Ok(ExportOutcome::Skipped(SkipReason::FreeOrder));
        }

        let document = map_order(order, &self.config)?;
        let created = self.holded.create_document(doc_type, &document).await?;

        if self.config.mark_paid && order.status.is_paid() {
            let payment = PaymentInput {
                date: document.date,
                amount: order.total,
            };
            if let Err(e) = self
                .holded
                .pay_document(doc_type, &created.id, &payment)
                .await
            {
                tracing::warn!(error = %e, document_id = %created.id, "Failed to register payment");
            }
        }

        let export = ExportedOrder {
            order_id: order.id,
            document_id: created.id.clone(),
            doc_type,
            exported_at: Utc::now(),
        };
        exports.record(&export).await?;
        drop(guard);

        let label = created.invoice_num.as_deref().unwrap_or(created.id.as_str());
        let note = format!("Exported to Holded as {doc_type} {label}.");
        if let Err(e) = self.woocommerce.add_order_note(order.id, &note).await {
            tracing::warn!(error = %e, "Failed to add order note");
        }

        tracing::info!(document_id = %export.document_id, doc_type = %doc_type, "Exported order");
        Ok(ExportOutcome::Exported(export))
    }

    /// Export every order in `status`, oldest first.
    ///
    /// Failures of single orders are logged and counted, not returned.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::WooCommerce` if a page of orders cannot be listed.
    #[instrument(skip(self))]
    pub async fn backfill(&self, status: OrderStatus) -> Result<BackfillSummary, ExportError> {
        let mut summary = BackfillSummary::default();

        for page in 1.. {
            let orders = self
                .woocommerce
                .list_orders(status, page, BACKFILL_PAGE_SIZE)
                .await?;

            for order in &orders {
                match self.export(order, false).await {
                    Ok(ExportOutcome::Exported(_)) => summary.exported += 1,
                    Ok(ExportOutcome::AlreadyExported(_)) => summary.already_exported += 1,
                    Ok(ExportOutcome::Skipped(_)) => summary.skipped += 1,
                    Err(e) => {
                        tracing::error!(order_id = %order.id, error = %e, "Order export failed");
                        summary.failed += 1;
                    }
                }
            }

            if orders.len() < BACKFILL_PAGE_SIZE as usize {
                break;
            }
        }

        tracing::info!(?summary, "Backfill finished");
        Ok(summary)
    }
}
