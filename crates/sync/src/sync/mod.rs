//! Sync engine: product import epochs and order export.
//!
//! - [`BatchRunner`] drains the product tracker in batches
//! - [`ProductImporter`] creates or updates one WooCommerce product
//! - [`ErrorCollector`] keeps the failures of the running epoch
//! - [`OrderExporter`] turns WooCommerce orders into Holded documents

pub mod errors;
pub mod orders;
pub mod products;
pub mod runner;

pub use errors::ErrorCollector;
pub use orders::{BackfillSummary, ExportError, ExportOutcome, OrderExporter, SkipReason};
pub use products::{ImportError, ImportOutcome, ProductImporter};
pub use runner::{BatchError, BatchRunner};
