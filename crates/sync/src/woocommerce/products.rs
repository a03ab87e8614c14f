//! Product and variation operations for the WooCommerce API.

use tracing::instrument;

use woo_holded_core::{WcProductId, WcVariationId};

use super::{
    MAX_PER_PAGE, ProductInput, VariationInput, WcProduct, WcVariation, WooCommerceClient,
    WooCommerceError,
};

impl WooCommerceClient {
    /// Find the product or variation with an exact SKU.
    ///
    /// Searches every status so drafts created by an earlier sync are found.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn find_product_by_sku(
        &self,
        sku: &str,
    ) -> Result<Option<WcProduct>, WooCommerceError> {
        let products: Vec<WcProduct> = self
            .get(
                "/products",
                &[("sku", sku.to_string()), ("status", "any".to_string())],
            )
            .await?;

        // The sku filter is a LIKE match on some WooCommerce versions
        Ok(products.into_iter().find(|p| p.sku == sku))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns error if WooCommerce rejects the product.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<WcProduct, WooCommerceError> {
        self.post("/products", input).await
    }

    /// Update a product.
    ///
    /// # Errors
    ///
    /// Returns error if the product does not exist or the update is rejected.
    #[instrument(skip(self, input), fields(product_id = %id, sku = %input.sku))]
    pub async fn update_product(
        &self,
        id: WcProductId,
        input: &ProductInput,
    ) -> Result<WcProduct, WooCommerceError> {
        self.put(&format!("/products/{id}"), input).await
    }

    /// List every variation of a variable product.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn list_variations(
        &self,
        product_id: WcProductId,
    ) -> Result<Vec<WcVariation>, WooCommerceError> {
        let mut variations = Vec::new();
        let path = format!("/products/{product_id}/variations");

        for page in 1.. {
            let batch: Vec<WcVariation> = self
                .get(
                    &path,
                    &[
                        ("per_page", MAX_PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let full = batch.len() >= MAX_PER_PAGE as usize;
            variations.extend(batch);
            if !full {
                break;
            }
        }

        Ok(variations)
    }

    /// Create a variation.
    ///
    /// # Errors
    ///
    /// Returns error if WooCommerce rejects the variation.
    #[instrument(skip(self, input), fields(product_id = %product_id, sku = %input.sku))]
    pub async fn create_variation(
        &self,
        product_id: WcProductId,
        input: &VariationInput,
    ) -> Result<WcVariation, WooCommerceError> {
        self.post(&format!("/products/{product_id}/variations"), input)
            .await
    }

    /// Update a variation.
    ///
    /// # Errors
    ///
    /// Returns error if the variation does not exist or the update is rejected.
    #[instrument(skip(self, input), fields(product_id = %product_id, variation_id = %id))]
    pub async fn update_variation(
        &self,
        product_id: WcProductId,
        id: WcVariationId,
        input: &VariationInput,
    ) -> Result<WcVariation, WooCommerceError> {
        self.put(&format!("/products/{product_id}/variations/{id}"), input)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::woocommerce::test_support::client;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_find_by_sku_requires_exact_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wc/v3/products"))
            .and(query_param("sku", "MUG"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 3, "name": "Mug XL", "sku": "MUG-XL", "type": "simple"},
                {"id": 4, "name": "Mug", "sku": "MUG", "type": "simple"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wc/v3/products"))
            .and(query_param("sku", "NONE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let found = client.find_product_by_sku("MUG").await.unwrap().unwrap();
        assert_eq!(found.id.as_i64(), 4);
        assert!(client.find_product_by_sku("NONE").await.unwrap().is_none());
    }
}
