//! Holded API types.
//!
//! Holded is loose with JSON types: amounts arrive as numbers or numeric
//! strings and flags as booleans or `0`/`1`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use woo_holded_core::types::amount::lenient;
use woo_holded_core::{HoldedDocumentId, HoldedProductId, ProductKind};

/// `{"status": 0|1, "info": "..."}` envelope of writes and errors.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    #[serde(default = "status_ok")]
    pub status: i64,
    #[serde(default)]
    pub info: Option<String>,
}

impl ApiStatus {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.status == 0
    }
}

const fn status_ok() -> i64 {
    1
}

const fn default_true() -> bool {
    true
}

/// Accept `true`/`false`, `1`/`0` and `"1"`/`"0"`.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => Ok(b),
        serde_json::Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
        serde_json::Value::String(s) => Ok(!matches!(s.trim(), "" | "0" | "false")),
        serde_json::Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!("expected a flag, got {other}"))),
    }
}

// =============================================================================
// Products
// =============================================================================

/// A product of the Holded catalog.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoldedProduct {
    pub id: HoldedProductId,
    #[serde(default)]
    pub kind: ProductKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub desc: Option<String>,
    /// Base price, tax excluded.
    #[serde(default, deserialize_with = "lenient")]
    pub price: Decimal,
    /// Tax percentage.
    #[serde(default, deserialize_with = "lenient")]
    pub tax: Decimal,
    /// Base price, tax included.
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
    /// Prices of the product in each rate (price list).
    #[serde(default)]
    pub rates: Vec<ProductRate>,
    #[serde(default, deserialize_with = "lenient")]
    pub stock: Decimal,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub weight: Decimal,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true", deserialize_with = "flag")]
    pub for_sale: bool,
    #[serde(default)]
    pub variants: Vec<HoldedVariant>,
    /// Components of a `pack` product.
    #[serde(default)]
    pub pack_items: Vec<PackItem>,
}

impl HoldedProduct {
    /// SKU, if present and not blank.
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether the product carries `tag` (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag.trim()))
    }
}

/// Price of a product in one Holded rate.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProductRate {
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub subtotal: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total: Decimal,
}

/// One variant of a `variants` product.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HoldedVariant {
    pub id: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Decimal,
    #[serde(default, deserialize_with = "lenient")]
    pub stock: Decimal,
    /// Attribute values identifying the variant, e.g. `Color = Red`.
    #[serde(default)]
    pub category_fields: Vec<CategoryField>,
}

impl HoldedVariant {
    #[must_use]
    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Attribute name/value pair of a variant.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CategoryField {
    pub name: String,
    pub field: String,
}

/// Component of a pack.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PackItem {
    #[serde(rename = "pid")]
    pub product_id: HoldedProductId,
    #[serde(rename = "u", default, deserialize_with = "lenient")]
    pub units: Decimal,
}

// =============================================================================
// Documents
// =============================================================================

/// Body of a document creation request.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub contact_name: String,
    /// VAT number of the customer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_cp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_country_code: Option<String>,
    /// Unix timestamp.
    pub date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_serie_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_channel_id: Option<String>,
    pub approve_doc: bool,
    pub items: Vec<DocumentItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_fields: Vec<CustomField>,
}

/// One line of a document.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub units: Decimal,
    /// Unit price, tax excluded.
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    /// Discount percentage.
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    /// Tax percentage.
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

/// Free-form field shown on a document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CustomField {
    pub field: String,
    pub value: String,
}

/// Response of a document creation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedDocument {
    pub id: HoldedDocumentId,
    #[serde(default)]
    pub invoice_num: Option<String>,
}

/// Body of a document payment request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentInput {
    /// Unix timestamp.
    pub date: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_product_tolerates_loose_types() {
        let product: HoldedProduct = serde_json::from_value(serde_json::json!({
            "id": "5f0a",
            "kind": "variants",
            "name": "T-Shirt",
            "price": "12.5",
            "tax": 21,
            "stock": null,
            "forSale": 0,
            "variants": [{
                "id": "v1",
                "sku": "TS-R",
                "price": 12.5,
                "categoryFields": [{"name": "Color", "field": "Red"}]
            }]
        }))
        .unwrap();

        assert_eq!(product.kind, ProductKind::Variants);
        assert_eq!(product.price, dec!(12.5));
        assert_eq!(product.stock, Decimal::ZERO);
        assert!(!product.for_sale);
        assert_eq!(product.variants[0].category_fields[0].field, "Red");
    }

    #[test]
    fn test_for_sale_defaults_to_true() {
        let product: HoldedProduct =
            serde_json::from_value(serde_json::json!({"id": "a", "sku": "  "})).unwrap();
        assert!(product.for_sale);
        assert_eq!(product.sku(), None);
    }

    #[test]
    fn test_document_serializes_numbers_and_skips_empty_fields() {
        let doc = DocumentInput {
            contact_name: "Ada".to_string(),
            date: 1_700_000_000,
            currency: "eur".to_string(),
            approve_doc: true,
            items: vec![DocumentItem {
                name: "Mug".to_string(),
                units: dec!(2),
                subtotal: dec!(9.5),
                discount: dec!(0),
                tax: dec!(21),
                ..DocumentItem::default()
            }],
            ..DocumentInput::default()
        };

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["contactName"], "Ada");
        assert_eq!(json["approveDoc"], true);
        assert_eq!(json["items"][0]["subtotal"], 9.5);
        assert!(json.get("contactCode").is_none());
        assert!(json.get("customFields").is_none());
    }
}
