//! Product sync commands.
//!
//! # Usage
//!
//! ```bash
//! whs products start
//! whs products step
//! whs products run
//! whs products status
//! ```

use std::time::Duration;

use woo_holded_core::BatchProgress;

use super::{CliError, Context, print_json};

/// Pause after a batch that made no progress (rate limited).
const STALLED_PAUSE: Duration = Duration::from_secs(30);

/// Start a new epoch.
///
/// # Errors
///
/// Returns `CliError` if the Holded catalog cannot be listed.
pub async fn start(ctx: &Context) -> Result<(), CliError> {
    let progress = ctx.state.runner().start().await?;
    print_json(&progress)
}

/// Process one batch.
///
/// # Errors
///
/// Returns `CliError` on storage failures or when a new epoch cannot start.
pub async fn step(ctx: &Context) -> Result<(), CliError> {
    let progress = ctx.state.runner().step().await?;
    print_json(&progress)
}

/// Show progress of the current epoch.
///
/// # Errors
///
/// Returns `CliError` if the tracker cannot be read.
pub async fn status(ctx: &Context) -> Result<(), CliError> {
    let progress = ctx.state.runner().progress().await?;
    print_json(&progress)
}

/// Step until the epoch is done, starting a fresh one if the last finished.
///
/// # Errors
///
/// Returns `CliError` on storage failures or when an epoch cannot start.
pub async fn run(ctx: &Context) -> Result<(), CliError> {
    let runner = ctx.state.runner();

    if runner.progress().await?.done {
        runner.start().await?;
    }

    loop {
        let progress = runner.step().await?;
        log_progress(&progress);

        if progress.done {
            return print_json(&progress);
        }
        if progress.processed == 0 {
            tracing::warn!(
                pause_secs = STALLED_PAUSE.as_secs(),
                "No progress in this batch, pausing"
            );
            tokio::time::sleep(STALLED_PAUSE).await;
        }
    }
}

fn log_progress(progress: &BatchProgress) {
    tracing::info!(
        synced = progress.synced,
        total = progress.total,
        failed = progress.failed,
        "Batch done ({}%)",
        progress.percent()
    );
}
