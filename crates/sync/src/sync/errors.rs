//! Error Collector: product failures of the running epoch.
//!
//! Kept in option storage so they survive between batch requests, flushed
//! into the summary email when the epoch finishes, then cleared.

use sqlx::SqlitePool;

use woo_holded_core::SyncFailure;

use crate::db::{RepositoryError, SettingsRepository};

/// Option key of the collected failures.
pub const ERRORS_KEY: &str = "product_sync_errors";

/// Appends and drains the failures of an epoch.
pub struct ErrorCollector<'a> {
    settings: SettingsRepository<'a>,
}

impl<'a> ErrorCollector<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            settings: SettingsRepository::new(pool),
        }
    }

    /// Append a failure. Returns the number collected so far.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if option storage cannot be read or written.
    pub async fn record(&self, failure: SyncFailure) -> Result<usize, RepositoryError> {
        let mut failures = self.all().await?;
        failures.push(failure);
        self.settings.set(ERRORS_KEY, &failures).await?;
        Ok(failures.len())
    }

    /// Every failure collected in this epoch, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if option storage cannot be read.
    pub async fn all(&self) -> Result<Vec<SyncFailure>, RepositoryError> {
        Ok(self
            .settings
            .get::<Vec<SyncFailure>>(ERRORS_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Number of collected failures.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if option storage cannot be read.
    pub async fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.all().await?.len())
    }

    /// Drop every collected failure.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if option storage cannot be written.
    pub async fn clear(&self) -> Result<(), RepositoryError> {
        self.settings.delete(ERRORS_KEY).await?;
        Ok(())
    }
}
