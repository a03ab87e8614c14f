//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;

use crate::config::SyncConfig;
use crate::holded::{HoldedClient, HoldedError};
use crate::services::EmailService;
use crate::sync::{BatchRunner, OrderExporter, ProductImporter};
use crate::woocommerce::{WooCommerceClient, WooCommerceError};

/// Errors that can occur while building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Holded client: {0}")]
    Holded(#[from] HoldedError),

    #[error("WooCommerce client: {0}")]
    WooCommerce(#[from] WooCommerceError),

    #[error("SMTP relay: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SyncConfig,
    pool: SqlitePool,
    runner: BatchRunner,
    exporter: OrderExporter,
}

impl AppState {
    /// Build the API clients and sync engine on top of a connected pool.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if an HTTP client or the SMTP relay cannot be built.
    pub fn new(config: SyncConfig, pool: SqlitePool) -> Result<Self, StateError> {
        let holded = HoldedClient::new(&config.holded)?;
        let woocommerce = WooCommerceClient::new(&config.woocommerce)?;

        let email = match config.email() {
            Some(email_config) => Some(EmailService::new(email_config)?),
            None => {
                tracing::warn!("SMTP not configured, sync reports will only be logged");
                None
            }
        };

        let importer = ProductImporter::new(
            holded.clone(),
            woocommerce.clone(),
            config.products.clone(),
        );
        let runner = BatchRunner::new(
            pool.clone(),
            holded.clone(),
            importer,
            email,
            config.products.batch_size,
            config.products.tag_filter.clone(),
        );
        let exporter = OrderExporter::new(pool.clone(), woocommerce, holded, config.orders.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                runner,
                exporter,
            }),
        })
    }

    /// Get the service configuration.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Get the database pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get the product batch runner.
    #[must_use]
    pub fn runner(&self) -> &BatchRunner {
        &self.inner.runner
    }

    /// Get the order exporter.
    #[must_use]
    pub fn exporter(&self) -> &OrderExporter {
        &self.inner.exporter
    }
}
