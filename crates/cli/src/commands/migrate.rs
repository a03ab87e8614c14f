//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! whs migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SYNC_DATABASE_URL` (or `DATABASE_URL`) - `SQLite` URL, created when missing
//!
//! Migrations live in `crates/sync/migrations/` and are embedded in the
//! binary. The server also applies them on start-up.

use super::CliError;
use woo_holded_sync::{SyncConfig, db};

/// Run the sync database migrations.
///
/// # Errors
///
/// Returns `CliError` if the configuration is invalid, the database cannot be
/// opened or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let config = SyncConfig::from_env()?;

    tracing::info!("Connecting to sync database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running sync migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Sync migrations complete!");
    Ok(())
}
