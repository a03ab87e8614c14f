//! Status and kind enums shared by both sides of the sync.

use serde::{Deserialize, Serialize};

/// WooCommerce order status.
///
/// Maps to the `status` field of the WooCommerce REST API. Statuses added by
/// third-party plugins deserialize as [`OrderStatus::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    Trash,
    CheckoutDraft,
    #[serde(other)]
    Other,
}

impl OrderStatus {
    /// The REST API slug for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::Trash => "trash",
            Self::CheckoutDraft => "checkout-draft",
            Self::Other => "other",
        }
    }

    /// Whether the shop has received the money for an order in this status.
    #[must_use]
    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Processing | Self::Completed)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches("wc-") {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "on-hold" => Ok(Self::OnHold),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            "failed" => Ok(Self::Failed),
            "trash" => Ok(Self::Trash),
            "checkout-draft" => Ok(Self::CheckoutDraft),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Holded document type an order is exported as.
///
/// `NoSync` disables order export entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Invoice,
    SalesReceipt,
    SalesOrder,
    Proform,
    Waybill,
    NoSync,
}

impl DocumentType {
    /// Path segment used by the documents API, `None` when export is disabled.
    #[must_use]
    pub const fn api_path(&self) -> Option<&'static str> {
        match self {
            Self::Invoice => Some("invoice"),
            Self::SalesReceipt => Some("salesreceipt"),
            Self::SalesOrder => Some("salesorder"),
            Self::Proform => Some("proform"),
            Self::Waybill => Some("waybill"),
            Self::NoSync => None,
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.api_path().unwrap_or("nosync"))
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invoice" => Ok(Self::Invoice),
            "salesreceipt" => Ok(Self::SalesReceipt),
            "salesorder" => Ok(Self::SalesOrder),
            "proform" => Ok(Self::Proform),
            "waybill" => Ok(Self::Waybill),
            "nosync" => Ok(Self::NoSync),
            _ => Err(format!("invalid document type: {s}")),
        }
    }
}

/// Kind of a Holded product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    Simple,
    /// A product with variants (one per attribute combination).
    Variants,
    /// A bundle of other Holded products.
    Pack,
}

/// WooCommerce product type a Holded product is imported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WcProductType {
    #[default]
    Simple,
    Variable,
    /// WPC Product Bundles ("smart bundle") product type.
    Woosb,
    #[serde(other)]
    Other,
}

impl From<ProductKind> for WcProductType {
    fn from(kind: ProductKind) -> Self {
        match kind {
            ProductKind::Simple => Self::Simple,
            ProductKind::Variants => Self::Variable,
            ProductKind::Pack => Self::Woosb,
        }
    }
}

/// Publication status given to imported WooCommerce products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Pending,
    Private,
    Publish,
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "private" => Ok(Self::Private),
            "publish" => Ok(Self::Publish),
            _ => Err(format!("invalid product status: {s}")),
        }
    }
}

/// Backorder policy applied to stock-managed imported products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackorderPolicy {
    #[default]
    No,
    Notify,
    Yes,
}

impl std::str::FromStr for BackorderPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no" => Ok(Self::No),
            "notify" => Ok(Self::Notify),
            "yes" => Ok(Self::Yes),
            _ => Err(format!("invalid backorder policy: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_accepts_prefixed_slugs() {
        assert_eq!("wc-completed".parse::<OrderStatus>(), Ok(OrderStatus::Completed));
        assert_eq!("on-hold".parse::<OrderStatus>(), Ok(OrderStatus::OnHold));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_unknown_deserializes_as_other() {
        let status: OrderStatus =
            serde_json::from_str("\"awaiting-shipment\"").unwrap_or(OrderStatus::Pending);
        assert_eq!(status, OrderStatus::Other);
    }

    #[test]
    fn test_document_type_round_trips_through_config_string() {
        for doc in [
            DocumentType::Invoice,
            DocumentType::SalesReceipt,
            DocumentType::SalesOrder,
            DocumentType::Proform,
            DocumentType::Waybill,
            DocumentType::NoSync,
        ] {
            assert_eq!(doc.to_string().parse::<DocumentType>(), Ok(doc));
        }
        assert_eq!(DocumentType::NoSync.api_path(), None);
    }

    #[test]
    fn test_product_kind_maps_to_woocommerce_type() {
        assert_eq!(WcProductType::from(ProductKind::Pack), WcProductType::Woosb);
        assert_eq!(
            WcProductType::from(ProductKind::Variants),
            WcProductType::Variable
        );
    }
}
