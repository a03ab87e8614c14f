//! Product category operations for the WooCommerce API.

use tracing::instrument;

use super::{CategoryInput, MAX_PER_PAGE, WcCategory, WooCommerceClient, WooCommerceError};

impl WooCommerceClient {
    /// Find a product category by name (case-insensitive exact match).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn find_category(&self, name: &str) -> Result<Option<WcCategory>, WooCommerceError> {
        let candidates: Vec<WcCategory> = self
            .get(
                "/products/categories",
                &[
                    ("search", name.to_string()),
                    ("per_page", MAX_PER_PAGE.to_string()),
                ],
            )
            .await?;

        Ok(candidates
            .into_iter()
            .find(|c| decode_entities(&c.name).eq_ignore_ascii_case(name.trim())))
    }

    /// Create a product category.
    ///
    /// # Errors
    ///
    /// Returns error if WooCommerce rejects the category.
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<WcCategory, WooCommerceError> {
        self.post(
            "/products/categories",
            &CategoryInput {
                name: name.trim().to_string(),
            },
        )
        .await
    }
}

/// Term names come back HTML-escaped (`Tea &amp; Coffee`).
fn decode_entities(name: &str) -> String {
    name.replace("&amp;", "&")
        .replace("&#039;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
