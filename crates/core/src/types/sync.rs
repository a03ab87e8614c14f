//! Records describing the state of a product sync epoch.
//!
//! A sync epoch is one full pass over the Holded catalog: the tracker is
//! truncated and refilled with one [`SyncRow`] per product, then drained in
//! batches until every row is synced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::id::{HoldedDocumentId, HoldedProductId, WcOrderId};
use super::status::DocumentType;

/// One product's place in the current epoch.
///
/// `synced` only ever goes from `false` to `true` within an epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::FromRow))]
pub struct SyncRow {
    pub product_id: HoldedProductId,
    pub synced: bool,
}

/// A product that could not be synced during an epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFailure {
    /// Holded product the failure belongs to.
    pub product_id: HoldedProductId,
    /// SKU as reported by Holded (empty when missing).
    pub sku: String,
    /// Product name as reported by Holded.
    pub name: String,
    /// Human-readable reason.
    pub message: String,
}

impl std::fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.product_id, self.sku, self.name, self.message
        )
    }
}

/// Metadata about the epoch currently held in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochInfo {
    pub epoch_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Number of rows the tracker was filled with.
    pub total: u64,
    /// Set once the drained epoch has been reported.
    pub finished_at: Option<DateTime<Utc>>,
    /// Failures reported when the epoch finished.
    #[serde(default)]
    pub failed: u64,
}

impl EpochInfo {
    /// Open a new epoch over `total` products.
    #[must_use]
    pub fn begin(total: u64) -> Self {
        Self {
            epoch_id: Uuid::new_v4(),
            started_at: Utc::now(),
            total,
            finished_at: None,
            failed: 0,
        }
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

/// Progress report returned after every batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    pub epoch_id: Option<Uuid>,
    pub total: u64,
    pub synced: u64,
    /// Rows handled by the batch that produced this report.
    pub processed: u64,
    /// Failures recorded so far in this epoch.
    pub failed: u64,
    pub remaining: u64,
    pub done: bool,
}

impl BatchProgress {
    /// Completion as a whole percentage (100 for an empty epoch).
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let pct = self.synced.saturating_mul(100) / self.total;
        u8::try_from(pct.min(100)).unwrap_or(100)
    }
}

/// A WooCommerce order that has been turned into a Holded document.
///
/// At most one per order; a forced re-export replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedOrder {
    pub order_id: WcOrderId,
    pub document_id: HoldedDocumentId,
    pub doc_type: DocumentType,
    pub exported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(total: u64, synced: u64) -> BatchProgress {
        BatchProgress {
            epoch_id: None,
            total,
            synced,
            processed: 0,
            failed: 0,
            remaining: total - synced,
            done: total == synced,
        }
    }

    #[test]
    fn test_percent_rounds_down() {
        assert_eq!(progress(3, 1).percent(), 33);
        assert_eq!(progress(3, 3).percent(), 100);
    }

    #[test]
    fn test_percent_of_empty_epoch_is_complete() {
        assert_eq!(progress(0, 0).percent(), 100);
    }

    #[test]
    fn test_failure_display_names_the_product() {
        let failure = SyncFailure {
            product_id: HoldedProductId::new("abc123"),
            sku: "TSHIRT-RED".to_string(),
            name: "Red T-Shirt".to_string(),
            message: "missing price".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "abc123 [TSHIRT-RED] Red T-Shirt: missing price"
        );
    }

    #[test]
    fn test_new_epoch_is_open() {
        let epoch = EpochInfo::begin(12);
        assert_eq!(epoch.total, 12);
        assert!(!epoch.is_finished());
    }
}
