//! Outbound services.

pub mod email;

pub use email::{EmailError, EmailService, SyncReport};
