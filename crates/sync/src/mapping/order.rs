//! WooCommerce order → Holded document.

use rust_decimal::Decimal;

use woo_holded_core::{discount_percent, tax_rate, unit_price};

use super::MappingError;
use crate::config::OrderExportConfig;
use crate::holded::{CustomField, DocumentInput, DocumentItem};
use crate::woocommerce::{Address, LineItem, MetaData, TaxLine, WcOrder, meta_text};

/// Order meta keys holding the customer's VAT number, by priority.
pub const VAT_META_KEYS: &[&str] = &[
    "_billing_vat",
    "_billing_nif",
    "billing_vat",
    "_vat_number",
    "NIF",
];

/// Custom field carrying the shop order number on the document.
pub const ORDER_CUSTOM_FIELD: &str = "WooCommerce Order";

/// Meta key marking a bundle parent line (value: component ids).
const BUNDLE_IDS_META: &str = "_woosb_ids";
/// Meta key marking a bundle component line (value: parent product id).
const BUNDLE_PARENT_META: &str = "_woosb_parent_id";

/// Map an order to the body of a Holded document.
///
/// # Errors
///
/// Returns `MappingError::EmptyOrder` when the order has no lines and
/// `MappingError::MissingDate` when it has no usable date.
pub fn map_order(
    order: &WcOrder,
    options: &OrderExportConfig,
) -> Result<DocumentInput, MappingError> {
    let date = order
        .date_paid_gmt
        .or(order.date_created_gmt)
        .ok_or(MappingError::MissingDate)?
        .and_utc()
        .timestamp();

    let mut items: Vec<DocumentItem> = order
        .line_items
        .iter()
        .map(|item| {
            let parent = bundle_parent_name(item, &order.line_items);
            map_line_item(item, parent, &order.tax_lines)
        })
        .collect();

    items.extend(order.shipping_lines.iter().map(|line| DocumentItem {
        name: format!("{}: {}", options.shipping_label, line.method_title),
        units: Decimal::ONE,
        subtotal: line.total,
        tax: tax_rate(line.total, line.total_tax),
        ..DocumentItem::default()
    }));

    items.extend(order.fee_lines.iter().map(|fee| DocumentItem {
        name: fee.name.clone(),
        units: Decimal::ONE,
        subtotal: fee.total,
        tax: tax_rate(fee.total, fee.total_tax),
        ..DocumentItem::default()
    }));

    if items.is_empty() {
        return Err(MappingError::EmptyOrder);
    }

    let billing = &order.billing;
    let contact_address = join_non_empty(
        &[billing.address_1.as_str(), billing.address_2.as_str()],
        ", ",
    );

    Ok(DocumentInput {
        contact_name: contact_name(order),
        contact_code: meta_text(&order.meta_data, VAT_META_KEYS),
        contact_email: non_empty(billing.email.as_deref().unwrap_or_default()),
        contact_phone: non_empty(billing.phone.as_deref().unwrap_or_default()),
        contact_address,
        contact_city: non_empty(&billing.city),
        contact_cp: non_empty(&billing.postcode),
        contact_province: non_empty(&billing.state),
        contact_country_code: non_empty(&billing.country).map(|c| c.to_uppercase()),
        date,
        notes: order_notes(order),
        currency: order.currency.to_lowercase(),
        num_serie_id: options.series_id.clone(),
        design_id: options.design_id.clone(),
        sales_channel_id: options.sales_channel_id.clone(),
        approve_doc: options.approve,
        items,
        custom_fields: vec![CustomField {
            field: ORDER_CUSTOM_FIELD.to_string(),
            value: order.display_number(),
        }],
    })
}

/// Company, else full name, of the billing (then shipping) address.
fn contact_name(order: &WcOrder) -> String {
    let from = |address: &Address| {
        non_empty(&address.company).or_else(|| {
            join_non_empty(
                &[address.first_name.as_str(), address.last_name.as_str()],
                " ",
            )
        })
    };

    from(&order.billing)
        .or_else(|| from(&order.shipping))
        .or_else(|| order.billing.email.clone().filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| format!("WooCommerce order {}", order.display_number()))
}

fn map_line_item(
    item: &LineItem,
    bundle_parent: Option<&str>,
    tax_lines: &[TaxLine],
) -> DocumentItem {
    let mut desc: Vec<String> = Vec::new();
    if let Some(parent) = bundle_parent {
        desc.push(format!("Bundle: {parent}"));
    }
    desc.extend(visible_meta(&item.meta_data));

    DocumentItem {
        name: item.name.clone(),
        desc: (!desc.is_empty()).then(|| desc.join("\n")),
        units: item.quantity,
        subtotal: unit_price(item.subtotal, item.quantity),
        discount: discount_percent(item.subtotal, item.total),
        tax: line_tax_rate(item, tax_lines),
        sku: item.sku.as_deref().and_then(non_empty),
    }
}

/// Rate of the tax lines charged on an item.
///
/// Uses the configured rate percentages of the order's tax lines when every
/// non-zero tax entry of the item can be matched to one, else the ratio of
/// tax to subtotal.
fn line_tax_rate(item: &LineItem, tax_lines: &[TaxLine]) -> Decimal {
    let charged: Vec<_> = item
        .taxes
        .iter()
        .filter(|t| !t.total.is_zero() || !t.subtotal.is_zero())
        .collect();

    if !charged.is_empty() {
        let rates: Option<Vec<Decimal>> = charged
            .iter()
            .map(|tax| {
                tax_lines
                    .iter()
                    .find(|line| line.rate_id == tax.id && !line.rate_percent.is_zero())
                    .map(|line| line.rate_percent)
            })
            .collect();
        if let Some(rates) = rates {
            return rates.into_iter().sum::<Decimal>().normalize();
        }
    }

    tax_rate(item.subtotal, item.subtotal_tax)
}

/// Name of the bundle line a component line belongs to.
fn bundle_parent_name<'a>(item: &LineItem, lines: &'a [LineItem]) -> Option<&'a str> {
    let parent_id = meta_text(&item.meta_data, &[BUNDLE_PARENT_META])?;

    lines
        .iter()
        .filter(|line| line.id != item.id)
        .filter(|line| meta_text(&line.meta_data, &[BUNDLE_IDS_META]).is_some())
        .find(|line| {
            line.product_id
                .is_some_and(|id| id.to_string() == parent_id)
        })
        .map(|line| line.name.as_str())
}

/// `key: value` lines of the item meta shown to the customer.
fn visible_meta(meta: &[MetaData]) -> impl Iterator<Item = String> + '_ {
    meta.iter()
        .filter(|m| !m.key.starts_with('_'))
        .filter_map(|m| m.text().map(|value| format!("{}: {value}", m.key)))
}

fn order_notes(order: &WcOrder) -> Option<String> {
    let mut notes = Vec::new();

    if let Some(note) = non_empty(&order.customer_note) {
        notes.push(format!("Customer note: {note}"));
    }

    let coupons: Vec<&str> = order.coupon_lines.iter().map(|c| c.code.as_str()).collect();
    if !coupons.is_empty() {
        notes.push(format!("Coupons: {}", coupons.join(", ")));
    }

    if let Some(method) = non_empty(&order.payment_method_title) {
        notes.push(format!("Payment method: {method}"));
    }

    (!notes.is_empty()).then(|| notes.join("\n"))
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn join_non_empty(parts: &[&str], separator: &str) -> Option<String> {
    let parts: Vec<&str> = parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    (!parts.is_empty()).then(|| parts.join(separator))
}
