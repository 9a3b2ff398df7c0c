//! Local provider that approves any callback carrying a transaction id.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use super::{PaymentProvider, PaymentRequest, PaymentResult};

/// Stand-in gateway: redirects straight back to the shop's callback.
#[derive(Debug, Clone, Default)]
pub struct StubProvider;

impl StubProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentProvider for StubProvider {
    fn name(&self) -> &str {
        "StubProvider"
    }

    async fn create_payment_url(&self, request: &PaymentRequest) -> String {
        let transaction_id = Uuid::new_v4().simple();
        format!(
            "/payment/callback?orderId={}&transactionId={transaction_id}",
            request.order_id
        )
    }

    async fn verify(&self, params: &HashMap<String, String>) -> PaymentResult {
        match params.get("transactionId").filter(|tx| !tx.is_empty()) {
            Some(tx) => PaymentResult {
                success: true,
                provider_transaction_id: Some(tx.clone()),
                raw_response: Some(serde_json::json!({ "transactionId": tx }).to_string()),
                error_message: None,
            },
            None => {
                let mut pairs: Vec<_> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
                pairs.sort();
                PaymentResult {
                    success: false,
                    provider_transaction_id: params.get("transactionId").cloned(),
                    raw_response: Some(pairs.join(";")),
                    error_message: Some("Missing transactionId".to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use emporium_core::{Money, OrderId};

    #[tokio::test]
    async fn test_payment_url_shape() {
        let request = PaymentRequest::new(OrderId::new(42), Money::ZERO);
        let url = StubProvider::new().create_payment_url(&request).await;

        let (path, tx) = url.split_once("&transactionId=").unwrap();
        assert_eq!(path, "/payment/callback?orderId=42");
        assert_eq!(tx.len(), 32);
        assert!(tx.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_verify_success() {
        let params = HashMap::from([
            ("orderId".to_string(), "42".to_string()),
            ("transactionId".to_string(), "f00d".to_string()),
        ]);
        let result = StubProvider::new().verify(&params).await;
        assert!(result.success);
        assert_eq!(result.raw_response.as_deref(), Some(r#"{"transactionId":"f00d"}"#));
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn test_verify_missing_transaction_id() {
        let params = HashMap::from([
            ("orderId".to_string(), "42".to_string()),
            ("transactionId".to_string(), String::new()),
        ]);
        let result = StubProvider::new().verify(&params).await;
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("Missing transactionId"));
        assert_eq!(result.raw_response.as_deref(), Some("orderId=42;transactionId="));
    }
}
