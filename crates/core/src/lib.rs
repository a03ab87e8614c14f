//! WooCommerce ⇄ Holded Core - Shared types library.
//!
//! This crate provides common types used across all sync components:
//! - `sync` - Sync service (HTTP triggers, API clients, batch runner)
//! - `cli` - Command-line tools for migrations and manual sync runs
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, statuses, decimal arithmetic and sync records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
