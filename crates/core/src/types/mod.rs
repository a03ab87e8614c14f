//! Core types for the sync service.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod id;
pub mod status;
pub mod sync;

pub use amount::{AmountError, discount_percent, parse_amount, percent, tax_rate, unit_price};
pub use id::*;
pub use status::*;
pub use sync::{BatchProgress, EpochInfo, ExportedOrder, SyncFailure, SyncRow};
