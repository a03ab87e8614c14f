//! WooCommerce REST API types.
//!
//! Money fields are decimal strings in the REST API and are read with the
//! lenient decimal deserializer. Write payloads send prices back as strings.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use woo_holded_core::types::amount::lenient;
use woo_holded_core::{
    BackorderPolicy, OrderStatus, ProductStatus, WcCategoryId, WcOrderId, WcProductId,
    WcProductType, WcVariationId,
};

/// A `meta_data` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl MetaData {
    /// Build an entry for a write payload.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            id: None,
            key: key.into(),
            value: value.into(),
        }
    }

    /// The value rendered as text, `None` for empty strings, arrays and objects.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match &self.value {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// First non-empty text value among `keys`, searched in key order.
#[must_use]
pub fn meta_text(meta: &[MetaData], keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| meta.iter().filter(|m| m.key == *key).find_map(MetaData::text))
}

// =============================================================================
// Orders
// =============================================================================

/// A WooCommerce order.
#[derive(Debug, Clone, Deserialize)]
pub struct WcOrder {
    pub id: WcOrderId,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub date_created_gmt: Option<NaiveDateTime>,
    #[serde(default)]
    pub date_paid_gmt: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total_tax: Decimal,
    #[serde(default)]
    pub customer_note: String,
    #[serde(default)]
    pub billing: Address,
    #[serde(default)]
    pub shipping: Address,
    #[serde(default)]
    pub payment_method_title: String,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub tax_lines: Vec<TaxLine>,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default)]
    pub fee_lines: Vec<FeeLine>,
    #[serde(default)]
    pub coupon_lines: Vec<CouponLine>,
}

impl WcOrder {
    /// Order number shown to the customer (the id when the shop has no custom numbering).
    #[must_use]
    pub fn display_number(&self) -> String {
        if self.number.trim().is_empty() {
            self.id.to_string()
        } else {
            self.number.clone()
        }
    }
}

/// Billing or shipping address.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// A product line of an order.
#[derive(Debug, Clone, Deserialize)]
pub struct LineItem {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub product_id: Option<WcProductId>,
    #[serde(default)]
    pub variation_id: Option<WcVariationId>,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: Decimal,
    /// Line total before discounts, tax excluded.
    #[serde(default, deserialize_with = "lenient")]
    pub subtotal: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub subtotal_tax: Decimal,
    /// Line total after discounts, tax excluded.
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total_tax: Decimal,
    #[serde(default)]
    pub taxes: Vec<LineTax>,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
    #[serde(default)]
    pub sku: Option<String>,
}

/// Tax charged on a line by one tax rate.
#[derive(Debug, Clone, Deserialize)]
pub struct LineTax {
    /// Tax rate id (matches [`TaxLine::rate_id`]).
    pub id: i64,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub subtotal: Decimal,
}

/// Tax rate applied to an order.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxLine {
    pub id: i64,
    pub rate_id: i64,
    #[serde(default)]
    pub label: String,
    /// Zero when the shop's WooCommerce predates rate percentages.
    #[serde(default, deserialize_with = "lenient")]
    pub rate_percent: Decimal,
}

/// A shipping line of an order.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingLine {
    pub id: i64,
    #[serde(default)]
    pub method_title: String,
    #[serde(default)]
    pub method_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total_tax: Decimal,
}

/// A fee line of an order (may be negative).
#[derive(Debug, Clone, Deserialize)]
pub struct FeeLine {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total_tax: Decimal,
}

/// A coupon applied to an order.
#[derive(Debug, Clone, Deserialize)]
pub struct CouponLine {
    pub id: i64,
    pub code: String,
    #[serde(default, deserialize_with = "lenient")]
    pub discount: Decimal,
}

/// Body of an order note.
#[derive(Debug, Clone, Serialize)]
pub struct OrderNoteInput {
    pub note: String,
    /// Whether the customer is notified.
    pub customer_note: bool,
}

/// A created order note.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderNote {
    pub id: i64,
    #[serde(default)]
    pub note: String,
}

// =============================================================================
// Products
// =============================================================================

/// A product (or variation, when found by SKU).
#[derive(Debug, Clone, Deserialize)]
pub struct WcProduct {
    pub id: WcProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sku: String,
    #[serde(rename = "type", default)]
    pub product_type: WcProductType,
    #[serde(default)]
    pub parent_id: i64,
}

/// Body of a product create or update.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ProductInput {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: WcProductType,
    /// Only sent on create, so manual publishing survives later syncs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backorders: Option<BackorderPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ProductAttribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaData>,
}

/// Reference to a product category.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CategoryRef {
    pub id: WcCategoryId,
}

/// A custom attribute of a variable product.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProductAttribute {
    pub name: String,
    pub visible: bool,
    pub variation: bool,
    pub options: Vec<String>,
}

/// A variation of a variable product.
#[derive(Debug, Clone, Deserialize)]
pub struct WcVariation {
    pub id: WcVariationId,
    #[serde(default)]
    pub sku: String,
}

/// Body of a variation create or update.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct VariationInput {
    pub sku: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manage_stock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backorders: Option<BackorderPolicy>,
    pub attributes: Vec<VariationAttribute>,
}

/// The option a variation takes for one attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariationAttribute {
    pub name: String,
    pub option: String,
}

/// A product category.
#[derive(Debug, Clone, Deserialize)]
pub struct WcCategory {
    pub id: WcCategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Body of a category create.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInput {
    pub name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_order_parses_rest_payload() {
        let order: WcOrder = serde_json::from_value(serde_json::json!({
            "id": 42,
            "number": "",
            "status": "wc-completed",
            "currency": "EUR",
            "date_created_gmt": "2024-03-01T10:15:00",
            "date_paid_gmt": null,
            "total": "24.20",
            "billing": {"first_name": "Ada", "email": "ada@example.org"},
            "line_items": [{
                "id": 1, "name": "Mug", "product_id": 9, "variation_id": 0,
                "quantity": 2, "subtotal": "20.00", "subtotal_tax": "4.20",
                "total": "20.00", "total_tax": "4.20",
                "taxes": [{"id": 1, "total": "4.2", "subtotal": "4.2"}]
            }]
        }))
        .unwrap();

        // "wc-" prefixed statuses are not REST slugs
        assert_eq!(order.status, OrderStatus::Other);
        assert_eq!(order.display_number(), "42");
        assert_eq!(order.total, dec!(24.20));
        assert!(order.date_paid_gmt.is_none());
        assert_eq!(order.line_items[0].quantity, dec!(2));
        assert_eq!(order.billing.email.as_deref(), Some("ada@example.org"));
    }

    #[test]
    fn test_meta_text_searches_keys_in_order() {
        let meta = vec![
            MetaData::new("NIF", "B123"),
            MetaData::new("_billing_vat", ""),
            MetaData::new("_billing_nif", "A999"),
        ];
        assert_eq!(
            meta_text(&meta, &["_billing_vat", "_billing_nif", "NIF"]),
            Some("A999".to_string())
        );
        assert_eq!(meta_text(&meta, &["missing"]), None);
    }

    #[test]
    fn test_product_input_omits_unset_fields() {
        let input = ProductInput {
            name: "Mug".to_string(),
            sku: "MUG".to_string(),
            ..ProductInput::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["type"], "simple");
        assert!(json.get("status").is_none());
        assert!(json.get("categories").is_none());
    }
}
