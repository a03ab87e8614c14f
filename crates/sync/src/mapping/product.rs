//! Holded product → WooCommerce product.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use woo_holded_core::{ProductKind, WcCategoryId, WcProductId, WcProductType};

use super::MappingError;
use crate::config::ProductSyncConfig;
use crate::holded::{HoldedProduct, HoldedVariant};
use crate::woocommerce::{
    CategoryRef, MetaData, ProductAttribute, ProductInput, VariationAttribute, VariationInput,
};

/// Product meta holding the components of a WPC bundle.
pub const BUNDLE_IDS_META: &str = "woosb_ids";

/// WooCommerce ids resolved before mapping.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRefs {
    /// Categories for the product's tags.
    pub categories: Vec<WcCategoryId>,
    /// WooCommerce id and units of every pack component, in pack order.
    pub bundle: Vec<(WcProductId, Decimal)>,
}

/// Everything needed to create or update one product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPlan {
    pub product: ProductInput,
    /// Variations, for variable products only.
    pub variations: Vec<VariationInput>,
}

/// Map a Holded product to WooCommerce request bodies.
///
/// Returns `Ok(None)` for products that are not for sale.
///
/// # Errors
///
/// Returns `MappingError` when the product or a variant has no SKU, a
/// variable product has no variants, or a pack has no components.
pub fn map_product(
    product: &HoldedProduct,
    config: &ProductSyncConfig,
    refs: &ResolvedRefs,
) -> Result<Option<ProductPlan>, MappingError> {
    if !product.for_sale {
        return Ok(None);
    }
    let sku = product.sku().ok_or(MappingError::MissingSku)?;

    let mut input = ProductInput {
        name: product.name.trim().to_string(),
        product_type: WcProductType::from(product.kind),
        status: None,
        sku: sku.to_string(),
        description: product
            .desc
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        weight: (!product.weight.is_zero()).then(|| format_amount(product.weight)),
        categories: refs
            .categories
            .iter()
            .map(|&id| CategoryRef { id })
            .collect(),
        ..ProductInput::default()
    };

    let mut variations = Vec::new();

    match product.kind {
        ProductKind::Simple => {
            input.regular_price = Some(format_price(product_price(product, config)));
            apply_stock(&mut input, product.stock, config);
        }
        ProductKind::Variants => {
            if product.variants.is_empty() {
                return Err(MappingError::NoVariants);
            }
            input.attributes = attributes(&product.variants);
            variations = product
                .variants
                .iter()
                .map(|variant| map_variant(product, variant, config))
                .collect::<Result<_, _>>()?;
        }
        ProductKind::Pack => {
            if product.pack_items.is_empty() {
                return Err(MappingError::EmptyPack);
            }
            if refs.bundle.len() != product.pack_items.len() {
                let missing = product
                    .pack_items
                    .get(refs.bundle.len())
                    .map(|item| item.product_id.to_string())
                    .unwrap_or_default();
                return Err(MappingError::UnknownComponent(missing));
            }
            input.regular_price = Some(format_price(product_price(product, config)));
            apply_stock(&mut input, product.stock, config);
            input.meta_data = vec![MetaData::new(BUNDLE_IDS_META, bundle_ids(&refs.bundle))];
        }
    }

    Ok(Some(ProductPlan {
        product: input,
        variations,
    }))
}

/// Price in the configured rate, else the base price.
///
/// Tax is included when the shop enters prices with tax.
fn product_price(product: &HoldedProduct, config: &ProductSyncConfig) -> Decimal {
    rate_price(product, config).unwrap_or_else(|| {
        taxed(product.price, product.total, product.tax, config)
    })
}

/// Price in the configured rate, when the product carries that rate.
fn rate_price(product: &HoldedProduct, config: &ProductSyncConfig) -> Option<Decimal> {
    let id = config.price_rate.as_deref()?;
    let rate = product.rates.iter().find(|r| r.id == id)?;
    Some(taxed(rate.subtotal, rate.total, product.tax, config))
}

/// A zero `total` means Holded did not compute it.
fn taxed(subtotal: Decimal, total: Decimal, tax: Decimal, config: &ProductSyncConfig) -> Decimal {
    if !config.prices_include_tax {
        subtotal
    } else if total.is_zero() {
        with_tax(subtotal, tax)
    } else {
        total
    }
}

fn with_tax(subtotal: Decimal, tax_percent: Decimal) -> Decimal {
    (subtotal + subtotal * tax_percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn map_variant(
    product: &HoldedProduct,
    variant: &HoldedVariant,
    config: &ProductSyncConfig,
) -> Result<VariationInput, MappingError> {
    let sku = variant
        .sku()
        .ok_or_else(|| MappingError::MissingVariantSku(variant.id.clone()))?;

    // Configured rate first, then the variant's own price, then the product's.
    let price = rate_price(product, config).unwrap_or_else(|| {
        let base = if variant.price.is_zero() {
            product.price
        } else {
            variant.price
        };
        if config.prices_include_tax {
            with_tax(base, product.tax)
        } else {
            base
        }
    });

    let mut input = VariationInput {
        sku: sku.to_string(),
        regular_price: Some(format_price(price)),
        attributes: variant
            .category_fields
            .iter()
            .map(|f| VariationAttribute {
                name: f.name.clone(),
                option: f.field.clone(),
            })
            .collect(),
        ..VariationInput::default()
    };
    if config.sync_stock {
        input.manage_stock = Some(true);
        input.stock_quantity = Some(whole_units(variant.stock));
        input.backorders = Some(config.backorders);
    }

    Ok(input)
}

/// Union of the variants' attribute names, each with its distinct values.
///
/// Names and values keep the order in which they first appear.
fn attributes(variants: &[HoldedVariant]) -> Vec<ProductAttribute> {
    let mut attributes: Vec<ProductAttribute> = Vec::new();

    for field in variants.iter().flat_map(|v| &v.category_fields) {
        match attributes.iter_mut().find(|a| a.name == field.name) {
            Some(attribute) => {
                if !attribute.options.contains(&field.field) {
                    attribute.options.push(field.field.clone());
                }
            }
            None => attributes.push(ProductAttribute {
                name: field.name.clone(),
                visible: true,
                variation: true,
                options: vec![field.field.clone()],
            }),
        }
    }

    attributes
}

fn apply_stock(input: &mut ProductInput, stock: Decimal, config: &ProductSyncConfig) {
    if config.sync_stock {
        input.manage_stock = Some(true);
        input.stock_quantity = Some(whole_units(stock));
        input.backorders = Some(config.backorders);
    }
}

/// `<woo id>/<units>` pairs joined by commas.
#[must_use]
pub fn bundle_ids(components: &[(WcProductId, Decimal)]) -> String {
    components
        .iter()
        .map(|(id, units)| format!("{id}/{}", format_amount(*units)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Stock levels are whole units in WooCommerce.
fn whole_units(stock: Decimal) -> i64 {
    stock.floor().to_i64().unwrap_or(0)
}

fn format_price(price: Decimal) -> String {
    price
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string()
}

fn format_amount(value: Decimal) -> String {
    value.normalize().to_string()
}
