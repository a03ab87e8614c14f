//! Record of WooCommerce orders exported to Holded.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use woo_holded_core::{DocumentType, ExportedOrder, HoldedDocumentId, WcOrderId};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ExportedOrderRow {
    order_id: WcOrderId,
    document_id: HoldedDocumentId,
    doc_type: String,
    exported_at: DateTime<Utc>,
}

impl TryFrom<ExportedOrderRow> for ExportedOrder {
    type Error = RepositoryError;

    fn try_from(row: ExportedOrderRow) -> Result<Self, Self::Error> {
        let doc_type = row.doc_type.parse::<DocumentType>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid doc type in database: {e}"))
        })?;

        Ok(Self {
            order_id: row.order_id,
            document_id: row.document_id,
            doc_type,
            exported_at: row.exported_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for the `exported_orders` table.
pub struct ExportedOrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ExportedOrderRepository<'a> {
    /// Create a new exported order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up the export of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, order_id: WcOrderId) -> Result<Option<ExportedOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, ExportedOrderRow>(
            r"
            SELECT order_id, document_id, doc_type, exported_at
            FROM exported_orders
            WHERE order_id = ?
            ",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Record an export, replacing an earlier one for the same order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn record(&self, export: &ExportedOrder) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO exported_orders (order_id, document_id, doc_type, exported_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (order_id) DO UPDATE
            SET document_id = excluded.document_id,
                doc_type = excluded.doc_type,
                exported_at = excluded.exported_at
            ",
        )
        .bind(export.order_id)
        .bind(&export.document_id)
        .bind(export.doc_type.to_string())
        .bind(export.exported_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Number of exported orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM exported_orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
