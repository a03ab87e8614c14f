//! Order operations for the WooCommerce API.

use tracing::instrument;

use woo_holded_core::{OrderStatus, WcOrderId};

use super::{OrderNote, OrderNoteInput, WcOrder, WooCommerceClient, WooCommerceError};

impl WooCommerceClient {
    /// Get a single order.
    ///
    /// # Errors
    ///
    /// Returns `WooCommerceError::NotFound` if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: WcOrderId) -> Result<WcOrder, WooCommerceError> {
        self.get(&format!("/orders/{id}"), &[]).await
    }

    /// List one page of orders in a status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        status: OrderStatus,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<WcOrder>, WooCommerceError> {
        self.get(
            "/orders",
            &[
                ("status", status.as_str().to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
                ("orderby", "id".to_string()),
                ("order", "asc".to_string()),
            ],
        )
        .await
    }

    /// Add a private note to an order.
    ///
    /// # Errors
    ///
    /// Returns error if the order does not exist or the note is rejected.
    #[instrument(skip(self, note), fields(order_id = %id))]
    pub async fn add_order_note(
        &self,
        id: WcOrderId,
        note: &str,
    ) -> Result<OrderNote, WooCommerceError> {
        self.post(
            &format!("/orders/{id}/notes"),
            &OrderNoteInput {
                note: note.to_string(),
                customer_note: false,
            },
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::woocommerce::test_support::client;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_orders_filters_by_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wc/v3/orders"))
            .and(query_param("status", "on-hold"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 11, "status": "on-hold"}
            ])))
            .mount(&server)
            .await;

        let orders = client(&server.uri())
            .list_orders(OrderStatus::OnHold, 2, 50)
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::OnHold);
    }

    #[tokio::test]
    async fn test_add_order_note_is_private() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/wp-json/wc/v3/orders/11/notes"))
            .and(body_partial_json(serde_json::json!({"customer_note": false})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 300, "note": "Exported"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let note = client(&server.uri())
            .add_order_note(WcOrderId::new(11), "Exported")
            .await
            .unwrap();
        assert_eq!(note.id, 300);
    }
}
