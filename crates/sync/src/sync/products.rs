//! Import of a single Holded product into WooCommerce.

use thiserror::Error;
use tracing::instrument;

use woo_holded_core::{HoldedProductId, ProductKind, WcProductId};

use crate::config::ProductSyncConfig;
use crate::holded::{HoldedClient, HoldedError, HoldedProduct};
use crate::mapping::{MappingError, ProductPlan, ResolvedRefs, map_product};
use crate::woocommerce::{WooCommerceClient, WooCommerceError};

/// Errors that can occur while importing one product.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Holded: {0}")]
    Holded(#[from] HoldedError),

    #[error("WooCommerce: {0}")]
    WooCommerce(#[from] WooCommerceError),

    #[error(transparent)]
    Mapping(#[from] MappingError),
}

impl ImportError {
    /// Seconds to wait when the failure is a rate limit worth retrying.
    #[must_use]
    pub const fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Holded(HoldedError::RateLimited(secs))
            | Self::WooCommerce(WooCommerceError::RateLimited(secs)) => Some(*secs),
            _ => None,
        }
    }
}

/// Result of importing one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Created(WcProductId),
    Updated(WcProductId),
    /// Not for sale in Holded.
    Skipped,
}

/// Creates or updates WooCommerce products from Holded products.
#[derive(Debug, Clone)]
pub struct ProductImporter {
    holded: HoldedClient,
    woocommerce: WooCommerceClient,
    config: ProductSyncConfig,
}

impl ProductImporter {
    #[must_use]
    pub const fn new(
        holded: HoldedClient,
        woocommerce: WooCommerceClient,
        config: ProductSyncConfig,
    ) -> Self {
        Self {
            holded,
            woocommerce,
            config,
        }
    }

    /// Fetch the current Holded version of a product.
    ///
    /// # Errors
    ///
    /// Returns `ImportError::Holded` if the product cannot be fetched.
    pub async fn fetch(&self, id: &HoldedProductId) -> Result<HoldedProduct, ImportError> {
        Ok(self.holded.get_product(id).await?)
    }

    /// Create or update the WooCommerce product matching `product` by SKU.
    ///
    /// # Errors
    ///
    /// Returns `ImportError` if mapping fails or either API rejects a request.
    #[instrument(skip(self, product), fields(product_id = %product.id, sku = ?product.sku()))]
    pub async fn import(&self, product: &HoldedProduct) -> Result<ImportOutcome, ImportError> {
        if !product.for_sale {
            tracing::debug!("Product not for sale, skipping");
            return Ok(ImportOutcome::Skipped);
        }
        // Validate before any lookups
        let sku = product.sku().ok_or(MappingError::MissingSku)?;

        let refs = ResolvedRefs {
            categories: self.resolve_categories(product).await?,
            bundle: self.resolve_bundle(product).await?,
        };
        let Some(plan) = map_product(product, &self.config, &refs)? else {
            return Ok(ImportOutcome::Skipped);
        };

        let outcome = self.upsert(sku, plan).await?;
        tracing::info!(outcome = ?outcome, "Imported product");
        Ok(outcome)
    }

    async fn upsert(&self, sku: &str, mut plan: ProductPlan) -> Result<ImportOutcome, ImportError> {
        let (id, outcome) = match self.woocommerce.find_product_by_sku(sku).await? {
            Some(existing) => {
                let updated = self
                    .woocommerce
                    .update_product(existing.id, &plan.product)
                    .await?;
                (updated.id, ImportOutcome::Updated(updated.id))
            }
            None => {
                plan.product.status = Some(self.config.product_status);
                let created = self.woocommerce.create_product(&plan.product).await?;
                (created.id, ImportOutcome::Created(created.id))
            }
        };

        if !plan.variations.is_empty() {
            self.upsert_variations(id, &plan).await?;
        }

        Ok(outcome)
    }

    /// Match planned variations to existing ones by SKU.
    async fn upsert_variations(
        &self,
        product_id: WcProductId,
        plan: &ProductPlan,
    ) -> Result<(), ImportError> {
        let existing = self.woocommerce.list_variations(product_id).await?;

        for variation in &plan.variations {
            match existing.iter().find(|v| v.sku == variation.sku) {
                Some(found) => {
                    self.woocommerce
                        .update_variation(product_id, found.id, variation)
                        .await?;
                }
                None => {
                    self.woocommerce
                        .create_variation(product_id, variation)
                        .await?;
                }
            }
        }

        Ok(())
    }

    /// Category ids for the product's tags, creating missing categories.
    async fn resolve_categories(
        &self,
        product: &HoldedProduct,
    ) -> Result<Vec<woo_holded_core::WcCategoryId>, ImportError> {
        if !self.config.import_categories {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for tag in product.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let category = match self.woocommerce.find_category(tag).await? {
                Some(category) => category,
                None => {
                    tracing::info!(tag, "Creating product category");
                    self.woocommerce.create_category(tag).await?
                }
            };
            if !ids.contains(&category.id) {
                ids.push(category.id);
            }
        }

        Ok(ids)
    }

    /// WooCommerce ids of a pack's components, looked up by their Holded SKU.
    async fn resolve_bundle(
        &self,
        product: &HoldedProduct,
    ) -> Result<Vec<(WcProductId, rust_decimal::Decimal)>, ImportError> {
        if product.kind != ProductKind::Pack {
            return Ok(Vec::new());
        }

        let mut components = Vec::with_capacity(product.pack_items.len());
        for item in &product.pack_items {
            let unknown = || MappingError::UnknownComponent(item.product_id.to_string());

            let component = self.holded.get_product(&item.product_id).await?;
            let sku = component.sku().ok_or_else(unknown)?;
            let found = self
                .woocommerce
                .find_product_by_sku(sku)
                .await?
                .ok_or_else(unknown)?;

            components.push((found.id, item.units));
        }

        Ok(components)
    }
}
