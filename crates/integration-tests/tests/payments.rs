//! Stub payment round trip through the storefront's provider dispatch.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use emporium_core::OrderId;
use emporium_integration_tests::cents;
use emporium_storefront::services::{PaymentError, PaymentRequest, PaymentService, StubProvider};

fn payments() -> PaymentService {
    PaymentService::new().with_provider(StubProvider::new())
}

/// Split the callback URL's query string into parameters.
fn query_params(url: &str) -> HashMap<String, String> {
    let (_, query) = url.split_once('?').unwrap();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_stub_round_trip() {
    let service = payments();
    let request = PaymentRequest::new(OrderId::new(42), cents(1160_00));

    let url = service.create_payment("stub", &request).await.unwrap();
    assert!(url.starts_with("/payment/callback?"));

    let params = query_params(&url);
    assert_eq!(params["orderId"], "42");

    let result = service.verify("Stub", &params).await.unwrap();
    assert!(result.success);
    assert_eq!(
        result.provider_transaction_id.as_deref(),
        Some(params["transactionId"].as_str())
    );
}

#[tokio::test]
async fn test_each_payment_gets_a_fresh_transaction() {
    let service = payments();
    let request = PaymentRequest::new(OrderId::new(1), cents(100));

    let first = query_params(&service.create_payment("stub", &request).await.unwrap());
    let second = query_params(&service.create_payment("stub", &request).await.unwrap());
    assert_ne!(first["transactionId"], second["transactionId"]);
}

#[tokio::test]
async fn test_callback_without_transaction_fails() {
    let result = payments()
        .handle_payment_callback("stub", "")
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.error_message.as_deref(), Some("Missing transactionId"));
}

#[tokio::test]
async fn test_unknown_provider() {
    let request = PaymentRequest::new(OrderId::new(1), cents(100));
    let err = payments()
        .create_payment("casys", &request)
        .await
        .unwrap_err();
    assert_eq!(err, PaymentError::ProviderNotFound("casys".to_string()));
}
