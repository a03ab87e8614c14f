//! Database operations for the sync service `SQLite` database.
//!
//! ## Tables
//!
//! - `sync_products` - Product sync tracker (one row per Holded product per epoch)
//! - `exported_orders` - WooCommerce orders already exported to Holded
//! - `settings` - Option storage (JSON values: epoch metadata, sync errors)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/sync/migrations/` and run on server
//! start-up or via:
//! ```bash
//! whs migrate
//! ```

pub mod exported_orders;
pub mod settings;
pub mod sync_products;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use exported_orders::ExportedOrderRepository;
pub use settings::SettingsRepository;
pub use sync_products::{SyncProductRepository, TrackerCounts};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool.
///
/// File databases are created when missing and opened in WAL mode. An
/// in-memory database (`sqlite::memory:`) gets a single connection, since
/// every connection would otherwise see its own empty database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the database cannot be opened.
pub async fn create_pool(database_url: &SecretString) -> Result<SqlitePool, sqlx::Error> {
    let url = database_url.expose_secret();
    let in_memory = url.contains(":memory:") || url.contains("mode=memory");

    let mut options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(10));
    pool = if in_memory {
        pool.max_connections(1).idle_timeout(None).max_lifetime(None)
    } else {
        pool.max_connections(5).min_connections(1)
    };

    pool.connect_with(options).await
}

/// Run the embedded migrations from `crates/sync/migrations/`.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history diverges.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
