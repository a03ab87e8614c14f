//! Product sync tracker.
//!
//! Holds one row per Holded product for the running epoch. Rows are only
//! removed by the truncation at the start of the next epoch, and `synced`
//! only ever flips from false to true.

use chrono::Utc;
use sqlx::SqlitePool;

use woo_holded_core::{HoldedProductId, SyncRow};

use super::RepositoryError;

/// Row totals of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerCounts {
    pub total: u64,
    pub synced: u64,
}

impl TrackerCounts {
    /// Rows still waiting to be processed.
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.synced)
    }

    /// Whether an epoch is loaded and fully processed.
    #[must_use]
    pub const fn is_drained(&self) -> bool {
        self.total > 0 && self.synced >= self.total
    }
}

/// Repository for the `sync_products` tracker table.
pub struct SyncProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SyncProductRepository<'a> {
    /// Create a new tracker repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Truncate the tracker and load one unsynced row per distinct product id.
    ///
    /// Runs in a single transaction so a concurrent reader never sees a
    /// half-loaded epoch. Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn start_epoch(&self, ids: &[HoldedProductId]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM sync_products")
            .execute(&mut *tx)
            .await?;
        // Keep AUTOINCREMENT positions from growing across epochs
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'sync_products'")
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0;
        for id in ids {
            let result =
                sqlx::query("INSERT OR IGNORE INTO sync_products (product_id, synced) VALUES (?, 0)")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// The next `limit` unsynced rows in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn next_batch(&self, limit: u32) -> Result<Vec<SyncRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, SyncRow>(
            r"
            SELECT product_id, synced
            FROM sync_products
            WHERE synced = 0
            ORDER BY position
            LIMIT ?
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Mark a product synced.
    ///
    /// Returns `false` when the row is unknown or was already synced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn mark_synced(&self, product_id: &HoldedProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE sync_products
            SET synced = 1, synced_at = ?
            WHERE product_id = ? AND synced = 0
            ",
        )
        .bind(Utc::now())
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Total and synced row counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a count is negative.
    pub async fn counts(&self) -> Result<TrackerCounts, RepositoryError> {
        let (total, synced): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(synced), 0) FROM sync_products",
        )
        .fetch_one(self.pool)
        .await?;

        let to_u64 = |n: i64| {
            u64::try_from(n)
                .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {n}")))
        };

        Ok(TrackerCounts {
            total: to_u64(total)?,
            synced: to_u64(synced)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    fn ids(raw: &[&str]) -> Vec<HoldedProductId> {
        raw.iter().copied().map(HoldedProductId::new).collect()
    }

    #[tokio::test]
    async fn test_start_epoch_collapses_duplicates() {
        let pool = memory_pool().await;
        let repo = SyncProductRepository::new(&pool);

        let inserted = repo.start_epoch(&ids(&["a", "b", "a", "c"])).await.unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(
            repo.counts().await.unwrap(),
            TrackerCounts { total: 3, synced: 0 }
        );
    }

    #[tokio::test]
    async fn test_next_batch_keeps_insertion_order() {
        let pool = memory_pool().await;
        let repo = SyncProductRepository::new(&pool);
        repo.start_epoch(&ids(&["z", "m", "a", "q"])).await.unwrap();

        let batch = repo.next_batch(3).await.unwrap();
        let got: Vec<_> = batch.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(got, vec!["z", "m", "a"]);
        assert!(batch.iter().all(|r| !r.synced));
    }

    #[tokio::test]
    async fn test_mark_synced_is_monotonic() {
        let pool = memory_pool().await;
        let repo = SyncProductRepository::new(&pool);
        repo.start_epoch(&ids(&["a", "b"])).await.unwrap();

        let a = HoldedProductId::new("a");
        assert!(repo.mark_synced(&a).await.unwrap());
        assert!(!repo.mark_synced(&a).await.unwrap());
        assert!(!repo.mark_synced(&HoldedProductId::new("unknown")).await.unwrap());

        let batch = repo.next_batch(10).await.unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].product_id.as_str(), "b");
        assert_eq!(repo.counts().await.unwrap().synced, 1);
    }

    #[tokio::test]
    async fn test_new_epoch_replaces_previous_rows() {
        let pool = memory_pool().await;
        let repo = SyncProductRepository::new(&pool);
        repo.start_epoch(&ids(&["a", "b"])).await.unwrap();
        repo.mark_synced(&HoldedProductId::new("a")).await.unwrap();

        repo.start_epoch(&ids(&["a", "c"])).await.unwrap();
        let counts = repo.counts().await.unwrap();
        assert_eq!(counts, TrackerCounts { total: 2, synced: 0 });
        assert!(!counts.is_drained());
    }

    #[tokio::test]
    async fn test_empty_tracker_is_not_drained() {
        let pool = memory_pool().await;
        let repo = SyncProductRepository::new(&pool);
        let counts = repo.counts().await.unwrap();
        assert_eq!(counts.total, 0);
        assert!(!counts.is_drained());
    }
}
