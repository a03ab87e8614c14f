//! WooCommerce ⇄ Holded CLI - migrations and manual sync runs.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! whs migrate
//!
//! # Product sync epochs
//! whs products start      # start a new epoch
//! whs products step       # process one batch
//! whs products run        # step until the epoch is done
//! whs products status     # progress of the current epoch
//!
//! # Order export
//! whs orders export 1234 --force
//! whs orders backfill --status completed
//! ```
//!
//! Reads the same environment as the `woo-holded-sync` server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use woo_holded_core::OrderStatus;

mod commands;

#[derive(Parser)]
#[command(name = "whs")]
#[command(author, version, about = "WooCommerce ⇄ Holded sync tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Import the Holded catalog into WooCommerce
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Export WooCommerce orders to Holded
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// Start a new epoch over the current Holded catalog
    Start,
    /// Process the next batch
    Step,
    /// Step until the epoch is done
    Run,
    /// Show progress without processing anything
    Status,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Export a single order
    Export {
        /// WooCommerce order id
        id: i64,

        /// Export again even if already exported
        #[arg(short, long)]
        force: bool,
    },
    /// Export every order in a status that has not been exported yet
    Backfill {
        /// Order status to page through (defaults to `ORDER_EXPORT_STATUS`)
        #[arg(short, long, value_parser = parse_status)]
        status: Option<OrderStatus>,
    },
}

fn parse_status(raw: &str) -> Result<OrderStatus, String> {
    raw.parse()
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), commands::CliError> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Products { action } => {
            let ctx = commands::Context::load().await?;
            match action {
                ProductsAction::Start => commands::products::start(&ctx).await?,
                ProductsAction::Step => commands::products::step(&ctx).await?,
                ProductsAction::Run => commands::products::run(&ctx).await?,
                ProductsAction::Status => commands::products::status(&ctx).await?,
            }
        }
        Commands::Orders { action } => {
            let ctx = commands::Context::load().await?;
            match action {
                OrdersAction::Export { id, force } => {
                    commands::orders::export(&ctx, id, force).await?;
                }
                OrdersAction::Backfill { status } => {
                    commands::orders::backfill(&ctx, status).await?;
                }
            }
        }
    }
    Ok(())
}
