//! Product catalog operations for the Holded API.

use tracing::instrument;

use woo_holded_core::HoldedProductId;

use super::{HoldedClient, HoldedError, HoldedProduct};

/// Upper bound on pages fetched by [`HoldedClient::list_products`].
const MAX_PAGES: u32 = 500;

impl HoldedClient {
    /// List the whole product catalog.
    ///
    /// Holded pages by `?page=N` and answers past the end with an empty page
    /// (some accounts repeat the last page instead, which is detected by its
    /// first id).
    ///
    /// # Errors
    ///
    /// Returns error if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<HoldedProduct>, HoldedError> {
        let mut products: Vec<HoldedProduct> = Vec::new();
        let mut previous_first: Option<HoldedProductId> = None;

        for page in 1..=MAX_PAGES {
            let batch: Vec<HoldedProduct> = self
                .get("/products", &[("page", page.to_string())])
                .await?;

            let Some(first) = batch.first() else {
                break;
            };
            if previous_first.as_ref() == Some(&first.id) {
                break;
            }
            previous_first = Some(first.id.clone());

            tracing::debug!(page, count = batch.len(), "Fetched Holded product page");
            products.extend(batch);
        }

        Ok(products)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `HoldedError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &HoldedProductId) -> Result<HoldedProduct, HoldedError> {
        self.get(&format!("/products/{id}"), &[]).await
    }
}
