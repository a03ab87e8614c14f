//! Sales document operations for the Holded API.

use tracing::instrument;

use woo_holded_core::{DocumentType, HoldedDocumentId};

use super::{ApiStatus, CreatedDocument, DocumentInput, HoldedClient, HoldedError, PaymentInput};

impl HoldedClient {
    /// Create a document of the given type.
    ///
    /// # Errors
    ///
    /// Returns `HoldedError::Api` if Holded rejects the document, or if
    /// `doc_type` is [`DocumentType::NoSync`].
    #[instrument(skip(self, input), fields(doc_type = %doc_type, items = input.items.len()))]
    pub async fn create_document(
        &self,
        doc_type: DocumentType,
        input: &DocumentInput,
    ) -> Result<CreatedDocument, HoldedError> {
        let path = document_path(doc_type)?;
        self.post(&path, input).await
    }

    /// Register a payment against a document.
    ///
    /// # Errors
    ///
    /// Returns `HoldedError::Api` if Holded rejects the payment.
    #[instrument(skip(self, payment), fields(doc_type = %doc_type, document_id = %id))]
    pub async fn pay_document(
        &self,
        doc_type: DocumentType,
        id: &HoldedDocumentId,
        payment: &PaymentInput,
    ) -> Result<(), HoldedError> {
        let path = format!("{}/{id}/pay", document_path(doc_type)?);
        let status: ApiStatus = self.post(&path, payment).await?;
        if status.is_failure() {
            return Err(HoldedError::Api {
                status: 200,
                message: status.info.unwrap_or_else(|| "payment rejected".to_string()),
            });
        }
        Ok(())
    }
}

fn document_path(doc_type: DocumentType) -> Result<String, HoldedError> {
    doc_type
        .api_path()
        .map(|segment| format!("/documents/{segment}"))
        .ok_or_else(|| HoldedError::Api {
            status: 0,
            message: "document export is disabled (nosync)".to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::HoldedConfig;
    use rust_decimal_macros::dec;
    use secrecy::SecretString;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> HoldedClient {
        HoldedClient::new(&HoldedConfig {
            api_url: server.uri(),
            api_key: SecretString::from("8d2f6a1c9e4b7d3a5f0c2e8b6d1a9f4c"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_document_posts_to_type_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoicing/v1/documents/salesreceipt"))
            .and(body_partial_json(serde_json::json!({"contactName": "Ada"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 1, "id": "doc-9", "invoiceNum": "T-0009"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let input = DocumentInput {
            contact_name: "Ada".to_string(),
            currency: "eur".to_string(),
            ..DocumentInput::default()
        };
        let created = client(&server)
            .create_document(DocumentType::SalesReceipt, &input)
            .await
            .unwrap();
        assert_eq!(created.id.as_str(), "doc-9");
        assert_eq!(created.invoice_num.as_deref(), Some("T-0009"));
    }

    #[tokio::test]
    async fn test_rejection_in_ok_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoicing/v1/documents/invoice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 0, "info": "Invalid contact"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_document(DocumentType::Invoice, &DocumentInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HoldedError::Api { message, .. } if message == "Invalid contact"));
    }

    #[tokio::test]
    async fn test_pay_document() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoicing/v1/documents/invoice/doc-9/pay"))
            .and(body_partial_json(serde_json::json!({"amount": 24.2})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 1, "info": "Paid", "id": "pay-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .pay_document(
                DocumentType::Invoice,
                &HoldedDocumentId::new("doc-9"),
                &PaymentInput {
                    date: 1_700_000_000,
                    amount: dec!(24.2),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_nosync_never_calls_holded() {
        let server = MockServer::start().await;
        let err = client(&server)
            .create_document(DocumentType::NoSync, &DocumentInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HoldedError::Api { status: 0, .. }));
    }
}
