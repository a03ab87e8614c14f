//! Field mapping between WooCommerce and Holded.
//!
//! Pure data transformation: every function here takes fully fetched API
//! objects and returns request bodies. Lookups (component ids, category
//! ids) are resolved by the caller beforehand.

pub mod order;
pub mod product;

pub use order::map_order;
pub use product::{ProductPlan, ResolvedRefs, map_product};

use thiserror::Error;

/// Reasons an object cannot be mapped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MappingError {
    /// The product has no SKU.
    #[error("product has no SKU")]
    MissingSku,

    /// A variant of the product has no SKU.
    #[error("variant {0} has no SKU")]
    MissingVariantSku(String),

    /// A product of kind `variants` without variants.
    #[error("variable product has no variants")]
    NoVariants,

    /// A pack without components.
    #[error("pack has no components")]
    EmptyPack,

    /// A pack component that has no WooCommerce counterpart yet.
    #[error("pack component {0} is not in WooCommerce")]
    UnknownComponent(String),

    /// An order without product, shipping or fee lines.
    #[error("order has no lines")]
    EmptyOrder,

    /// An order with neither a payment nor a creation date.
    #[error("order has no date")]
    MissingDate,
}
