//! Subcommand implementations.

pub mod migrate;
pub mod orders;
pub mod products;

use thiserror::Error;

use woo_holded_sync::config::ConfigError;
use woo_holded_sync::state::StateError;
use woo_holded_sync::sync::{BatchError, ExportError};
use woo_holded_sync::{AppState, SyncConfig, db};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Startup error: {0}")]
    State(#[from] StateError),

    #[error("Product sync error: {0}")]
    Batch(#[from] BatchError),

    #[error("Order export error: {0}")]
    Export(#[from] ExportError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Migrated database plus the sync engine, built like the server builds it.
pub struct Context {
    pub state: AppState,
}

impl Context {
    /// Load configuration, connect and migrate the database.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if any step fails.
    pub async fn load() -> Result<Self, CliError> {
        let config = SyncConfig::from_env()?;
        let pool = db::create_pool(&config.database_url).await?;
        db::run_migrations(&pool).await?;

        Ok(Self {
            state: AppState::new(config, pool)?,
        })
    }
}

/// Print a result as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value)?;
    #[allow(clippy::print_stdout)]
    {
        println!("{json}");
    }
    Ok(())
}
