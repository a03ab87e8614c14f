//! WooCommerce ⇄ Holded sync service.
//!
//! Imports the Holded product catalog into WooCommerce in resumable batches
//! and exports WooCommerce orders as Holded sales documents.
//!
//! # Architecture
//!
//! - Axum HTTP triggers for product epochs, order export and webhooks
//! - `SQLite` for the sync tracker, exported orders and option storage
//! - WooCommerce REST v3 and Holded invoicing API clients
//! - SMTP summary email at the end of every product epoch
//!
//! The `woo-holded-sync` binary serves the HTTP triggers; the `whs` CLI
//! drives the same engine from the command line.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod holded;
pub mod mapping;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod sync;
pub mod woocommerce;

pub use config::SyncConfig;
pub use error::AppError;
pub use state::AppState;
