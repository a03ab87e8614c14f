//! Batch Runner: resumable product sync loop.
//!
//! Each [`BatchRunner::step`] processes the next batch of tracker rows. The
//! first step on an empty tracker starts an epoch; the first step that finds
//! the tracker drained finalizes it (summary email, failures cleared).
//! Steps are serialized by an async mutex, so concurrent triggers never pick
//! up the same rows.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

use woo_holded_core::{BatchProgress, EpochInfo, HoldedProductId, SyncFailure, SyncRow};

use super::errors::ErrorCollector;
use super::products::{ImportError, ImportOutcome, ProductImporter};
use crate::db::{RepositoryError, SettingsRepository, SyncProductRepository, TrackerCounts};
use crate::holded::{HoldedClient, HoldedError};
use crate::services::{EmailService, SyncReport};

/// Option key of the running epoch's metadata.
pub const EPOCH_KEY: &str = "product_sync_epoch";

/// Errors that stop a batch.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The catalog could not be listed when starting an epoch.
    #[error("Holded: {0}")]
    Holded(#[from] HoldedError),
}

/// Drives product sync epochs.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    pool: SqlitePool,
    holded: HoldedClient,
    importer: ProductImporter,
    email: Option<EmailService>,
    batch_size: u32,
    tag_filter: Option<String>,
    lock: Arc<Mutex<()>>,
}

impl BatchRunner {
    #[must_use]
    pub fn new(
        pool: SqlitePool,
        holded: HoldedClient,
        importer: ProductImporter,
        email: Option<EmailService>,
        batch_size: u32,
        tag_filter: Option<String>,
    ) -> Self {
        Self {
            pool,
            holded,
            importer,
            email,
            batch_size,
            tag_filter,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Start a new epoch over the current Holded catalog.
    ///
    /// Discards the tracker rows and failures of any previous epoch.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` if the catalog cannot be listed or the tracker
    /// cannot be written.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<BatchProgress, BatchError> {
        let _guard = self.lock.lock().await;
        self.start_epoch().await?;
        self.progress_report(0).await
    }

    /// Process one batch, starting an epoch first if none is loaded.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` on storage failures or when a new epoch cannot
    /// list the catalog. Per-product failures are collected, not returned.
    #[instrument(skip(self))]
    pub async fn step(&self) -> Result<BatchProgress, BatchError> {
        let _guard = self.lock.lock().await;
        let tracker = SyncProductRepository::new(&self.pool);

        if tracker.counts().await?.total == 0 {
            self.start_epoch().await?;
        }

        let batch = tracker.next_batch(self.batch_size).await?;
        let mut processed = 0;
        for row in &batch {
            if !self.process(row).await? {
                break;
            }
            processed += 1;
        }

        let counts = tracker.counts().await?;
        if counts.remaining() == 0 {
            self.finalize(counts).await?;
        }

        self.progress_report(processed).await
    }

    /// Progress of the current epoch without processing anything.
    ///
    /// # Errors
    ///
    /// Returns `BatchError` if the tracker cannot be read.
    pub async fn progress(&self) -> Result<BatchProgress, BatchError> {
        self.progress_report(0).await
    }

    /// List the catalog and load the tracker.
    async fn start_epoch(&self) -> Result<EpochInfo, BatchError> {
        let products = self.holded.list_products().await?;
        let ids: Vec<HoldedProductId> = products
            .into_iter()
            .filter(|p| {
                self.tag_filter
                    .as_deref()
                    .is_none_or(|tag| p.has_tag(tag))
            })
            .map(|p| p.id)
            .collect();

        let total = SyncProductRepository::new(&self.pool)
            .start_epoch(&ids)
            .await?;
        ErrorCollector::new(&self.pool).clear().await?;

        let mut epoch = EpochInfo::begin(total);
        if total == 0 {
            epoch.finished_at = Some(epoch.started_at);
        }
        SettingsRepository::new(&self.pool)
            .set(EPOCH_KEY, &epoch)
            .await?;

        tracing::info!(
            epoch_id = %epoch.epoch_id,
            total,
            tag_filter = ?self.tag_filter,
            "Started product sync epoch"
        );
        Ok(epoch)
    }

    /// Import one row. Returns `false` when the batch should stop early.
    ///
    /// Rate limits leave the row unsynced for the next step; every other
    /// outcome (including a recorded failure) marks it synced.
    async fn process(&self, row: &SyncRow) -> Result<bool, BatchError> {
        let result = match self.importer.fetch(&row.product_id).await {
            Ok(product) => self
                .importer
                .import(&product)
                .await
                .map_err(|e| (Some(product), e)),
            Err(e) => Err((None, e)),
        };

        match result {
            Ok(outcome) => {
                if outcome == ImportOutcome::Skipped {
                    tracing::debug!(product_id = %row.product_id, "Skipped product");
                }
            }
            Err((_, e)) if e.retry_after().is_some() => {
                tracing::warn!(
                    product_id = %row.product_id,
                    retry_after = e.retry_after(),
                    "Rate limited, ending batch early"
                );
                return Ok(false);
            }
            Err((product, e)) => self.record_failure(row, product.as_ref(), &e).await?,
        }

        SyncProductRepository::new(&self.pool)
            .mark_synced(&row.product_id)
            .await?;
        Ok(true)
    }

    async fn record_failure(
        &self,
        row: &SyncRow,
        product: Option<&crate::holded::HoldedProduct>,
        error: &ImportError,
    ) -> Result<(), BatchError> {
        let failure = SyncFailure {
            product_id: row.product_id.clone(),
            sku: product
                .and_then(|p| p.sku.clone())
                .unwrap_or_default(),
            name: product.map(|p| p.name.clone()).unwrap_or_default(),
            message: error.to_string(),
        };
        tracing::warn!(failure = %failure, "Product sync failed");
        ErrorCollector::new(&self.pool).record(failure).await?;
        Ok(())
    }

    /// Report and close a drained epoch, once.
    async fn finalize(&self, counts: TrackerCounts) -> Result<(), BatchError> {
        let settings = SettingsRepository::new(&self.pool);
        let mut epoch = settings
            .get::<EpochInfo>(EPOCH_KEY)
            .await?
            .unwrap_or_else(|| EpochInfo::begin(counts.total));
        if epoch.is_finished() {
            return Ok(());
        }

        let finished_at = Utc::now();
        let collector = ErrorCollector::new(&self.pool);
        let report = SyncReport {
            epoch_id: epoch.epoch_id,
            started_at: epoch.started_at,
            finished_at,
            total: counts.total,
            failures: collector.all().await?,
        };

        let delivered = match &self.email {
            Some(email) => match email.send_sync_report(&report).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to send sync report");
                    false
                }
            },
            None => {
                for failure in &report.failures {
                    tracing::warn!(failure = %failure, "Unreported sync failure");
                }
                true
            }
        };
        // Undelivered failures stay in option storage until the next epoch
        if delivered {
            collector.clear().await?;
        }

        epoch.finished_at = Some(finished_at);
        epoch.failed = report.failures.len() as u64;
        settings.set(EPOCH_KEY, &epoch).await?;

        tracing::info!(
            epoch_id = %epoch.epoch_id,
            total = counts.total,
            failed = report.failures.len(),
            "Finished product sync epoch"
        );
        Ok(())
    }

    async fn progress_report(&self, processed: u64) -> Result<BatchProgress, BatchError> {
        let counts = SyncProductRepository::new(&self.pool).counts().await?;
        let epoch = SettingsRepository::new(&self.pool)
            .get::<EpochInfo>(EPOCH_KEY)
            .await?;
        let failed = match &epoch {
            Some(e) if e.is_finished() => e.failed,
            _ => ErrorCollector::new(&self.pool).count().await? as u64,
        };

        Ok(BatchProgress {
            epoch_id: epoch.as_ref().map(|e| e.epoch_id),
            total: counts.total,
            synced: counts.synced,
            processed,
            failed,
            remaining: counts.remaining(),
            done: counts.remaining() == 0 && epoch.is_some_and(|e| e.is_finished()),
        })
    }
}
