//! Payment-provider dispatch.
//!
//! Providers are registered once at startup and looked up by a
//! case-insensitive name prefix, so `"stub"` selects [`StubProvider`].

mod stub;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use emporium_core::{CurrencyCode, Money, OrderId};

pub use stub::StubProvider;

/// A request to start paying for an order.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub amount: Money,
    pub currency: CurrencyCode,
    pub description: String,
}

impl PaymentRequest {
    /// Request in the default currency with an empty description.
    #[must_use]
    pub fn new(order_id: OrderId, amount: Money) -> Self {
        Self {
            order_id,
            amount,
            currency: CurrencyCode::default(),
            description: String::new(),
        }
    }
}

/// Outcome of verifying a provider callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PaymentResult {
    pub success: bool,
    pub provider_transaction_id: Option<String>,
    pub raw_response: Option<String>,
    pub error_message: Option<String>,
}

/// Errors from provider dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// No registered provider name starts with the requested name.
    #[error("Payment provider '{0}' not found.")]
    ProviderNotFound(String),
}

/// A payment gateway integration.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Provider name used for lookup and stored on transactions.
    fn name(&self) -> &str;

    /// URL the customer is redirected to in order to pay.
    async fn create_payment_url(&self, request: &PaymentRequest) -> String;

    /// Check the parameters a provider sent back to the callback URL.
    async fn verify(&self, params: &HashMap<String, String>) -> PaymentResult;
}

/// Registered providers.
#[derive(Clone, Default)]
pub struct PaymentService {
    providers: Vec<Arc<dyn PaymentProvider>>,
}

impl PaymentService {
    /// Create a service with no providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider. Earlier registrations win on lookup.
    #[must_use]
    pub fn with_provider(mut self, provider: impl PaymentProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// First provider whose name starts with `name`, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ProviderNotFound` when nothing matches.
    pub fn provider(&self, name: &str) -> Result<&dyn PaymentProvider, PaymentError> {
        let wanted = name.to_ascii_lowercase();
        self.providers
            .iter()
            .find(|p| p.name().to_ascii_lowercase().starts_with(&wanted))
            .map(|p| &**p)
            .ok_or_else(|| PaymentError::ProviderNotFound(name.to_string()))
    }

    /// Build the payment URL through the named provider.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ProviderNotFound` for an unknown provider.
    pub async fn create_payment(
        &self,
        provider_name: &str,
        request: &PaymentRequest,
    ) -> Result<String, PaymentError> {
        let provider = self.provider(provider_name)?;
        Ok(provider.create_payment_url(request).await)
    }

    /// Verify callback parameters through the named provider.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ProviderNotFound` for an unknown provider.
    pub async fn verify(
        &self,
        provider_name: &str,
        params: &HashMap<String, String>,
    ) -> Result<PaymentResult, PaymentError> {
        let provider = self.provider(provider_name)?;
        Ok(provider.verify(params).await)
    }

    /// Verify a bare transaction id.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ProviderNotFound` for an unknown provider.
    pub async fn handle_payment_callback(
        &self,
        provider_name: &str,
        transaction_id: &str,
    ) -> Result<PaymentResult, PaymentError> {
        let params = HashMap::from([("transactionId".to_string(), transaction_id.to_string())]);
        self.verify(provider_name, &params).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FixedProvider(&'static str);

    #[async_trait]
    impl PaymentProvider for FixedProvider {
        fn name(&self) -> &str {
            self.0
        }

        async fn create_payment_url(&self, request: &PaymentRequest) -> String {
            format!("https://{}/pay/{}", self.0, request.order_id)
        }

        async fn verify(&self, _params: &HashMap<String, String>) -> PaymentResult {
            PaymentResult {
                success: true,
                provider_transaction_id: Some(self.0.to_string()),
                ..PaymentResult::default()
            }
        }
    }

    fn service() -> PaymentService {
        PaymentService::new()
            .with_provider(FixedProvider("CasysProvider"))
            .with_provider(StubProvider::new())
    }

    #[test]
    fn test_provider_lookup_is_prefix_and_case_insensitive() {
        let payments = service();
        assert_eq!(payments.provider("stub").unwrap().name(), "StubProvider");
        assert_eq!(payments.provider("CASYS").unwrap().name(), "CasysProvider");
    }

    #[test]
    fn test_provider_not_found_message() {
        let err = service().provider("paypal").err().unwrap();
        assert_eq!(err.to_string(), "Payment provider 'paypal' not found.");
    }

    #[test]
    fn test_request_defaults_to_mkd() {
        let request = PaymentRequest::new(OrderId::new(1), Money::ZERO);
        assert_eq!(request.currency, CurrencyCode::Mkd);
        assert!(request.description.is_empty());
    }

    #[tokio::test]
    async fn test_create_payment_dispatches_by_name() {
        let request = PaymentRequest::new(OrderId::new(8), Money::ZERO);
        let url = service().create_payment("casys", &request).await.unwrap();
        assert_eq!(url, "https://CasysProvider/pay/8");
    }

    #[tokio::test]
    async fn test_handle_payment_callback_wraps_transaction_id() {
        let result = service()
            .handle_payment_callback("stub", "abc123")
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.provider_transaction_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_verify_unknown_provider() {
        let result = service().verify("nope", &HashMap::new()).await;
        assert_eq!(result, Err(PaymentError::ProviderNotFound("nope".to_string())));
    }
}
