//! Payment start and provider callback.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{OrderId, OrderStatus};

use super::Layout;
use super::checkout::{OrderView, visible_to};
use crate::db::{OrderRepository, PaymentRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flash, OptionalAuth, set_flash};
use crate::models::PaymentRecord;
use crate::services::{PaymentRequest, PaymentResult};
use crate::state::AppState;

/// Provider used for every checkout until a real gateway is registered.
const PROVIDER: &str = "stub";

/// Payment accepted template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/success.html")]
pub struct PaymentSuccessTemplate {
    pub layout: Layout,
    pub order: OrderView,
    pub transaction_id: String,
}

/// Payment declined template.
#[derive(Template, WebTemplate)]
#[template(path = "payment/failed.html")]
pub struct PaymentFailedTemplate {
    pub layout: Layout,
    pub order: OrderView,
    pub error_message: String,
}

/// Redirect the customer to the provider's payment page.
#[instrument(skip(state, session, user))]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<OrderId>,
) -> Result<Redirect> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !visible_to(&session, user.as_ref(), &order).await {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    if order.status != OrderStatus::Pending {
        set_flash(&session, Flash::error("This order has already been paid.")).await;
        return Ok(Redirect::to(&format!("/checkout/success/{id}")));
    }

    let request = PaymentRequest {
        currency: state.config().currency,
        description: format!("Order {}", order.number()),
        ..PaymentRequest::new(order.id, order.total_amount)
    };
    let url = state.payments().create_payment(PROVIDER, &request).await?;

    add_breadcrumb("payment", "Payment started", Some(&[("order_id", &id.to_string())]));
    Ok(Redirect::to(&url))
}

/// Column widths of `shop.payment_transaction`.
const MAX_PROVIDER_LENGTH: usize = 50;
const MAX_REFERENCE_LENGTH: usize = 100;
const MAX_CURRENCY_LENGTH: usize = 10;

/// At most `max` characters of `value`.
fn truncated(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Build the transaction row for a verified callback.
///
/// Values from the callback query are cut to the column widths so an
/// oversized parameter is still recorded.
fn payment_record(
    order_id: OrderId,
    merchant_order_id: &str,
    provider: &str,
    result: &PaymentResult,
    amount: emporium_core::Money,
    currency: &str,
) -> PaymentRecord {
    PaymentRecord {
        order_id,
        provider: truncated(provider, MAX_PROVIDER_LENGTH),
        merchant_order_id: truncated(merchant_order_id, MAX_REFERENCE_LENGTH),
        provider_transaction_id: truncated(
            result.provider_transaction_id.as_deref().unwrap_or_default(),
            MAX_REFERENCE_LENGTH,
        ),
        amount,
        currency: truncated(currency, MAX_CURRENCY_LENGTH),
        success: result.success,
        raw_response: result.raw_response.clone(),
    }
}

/// Handle the provider callback: verify, record, and show the outcome.
#[instrument(skip(state, session, user, params))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    let order_id = params
        .get("orderId")
        .and_then(|raw| raw.trim().parse::<OrderId>().ok())
        .ok_or_else(|| AppError::NotFound("payment callback without a valid orderId".to_string()))?;

    let provider = state.payments().provider(PROVIDER)?;
    let result = provider.verify(&params).await;

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;

    let currency = state.config().currency;
    let record = payment_record(
        order.id,
        &order.number(),
        provider.name(),
        &result,
        order.total_amount,
        currency.code(),
    );
    let status = PaymentRepository::new(state.pool())
        .record_callback(&record)
        .await?;

    let items = orders.items(order.id).await?;
    let mut view = OrderView::new(&order, &items, currency);
    view.status = status.to_string();
    view.status_class = status.badge_class();
    view.awaiting_payment = status == OrderStatus::Pending;

    let layout = Layout::load(&session, user.as_ref()).await;
    if result.success {
        Ok(PaymentSuccessTemplate {
            layout,
            order: view,
            transaction_id: record.provider_transaction_id,
        }
        .into_response())
    } else {
        tracing::warn!(
            order_id = %order.id,
            error = result.error_message.as_deref().unwrap_or("unknown"),
            "Payment verification failed"
        );
        Ok(PaymentFailedTemplate {
            layout,
            order: view,
            error_message: result
                .error_message
                .unwrap_or_else(|| "Payment could not be verified.".to_string()),
        }
        .into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_core::Money;
    use rust_decimal::Decimal;

    #[test]
    fn test_payment_record_from_failed_result() {
        let result = PaymentResult {
            success: false,
            provider_transaction_id: None,
            raw_response: Some("orderId=4".to_string()),
            error_message: Some("Missing transactionId".to_string()),
        };
        let record = payment_record(
            OrderId::new(4),
            "ORD-20260101-004",
            "StubProvider",
            &result,
            Money::new(Decimal::new(99_00, 2)),
            "MKD",
        );
        assert!(!record.success);
        assert_eq!(record.provider_transaction_id, "");
        assert_eq!(record.raw_response.as_deref(), Some("orderId=4"));
        assert_eq!(record.currency, "MKD");
    }

    #[test]
    fn test_payment_record_cuts_oversized_transaction_id() {
        let long_id = "x".repeat(500);
        let result = PaymentResult {
            success: true,
            provider_transaction_id: Some(long_id.clone()),
            raw_response: Some(format!(r#"{{"transactionId":"{long_id}"}}"#)),
            error_message: None,
        };
        let record = payment_record(
            OrderId::new(9),
            "ORD-20260101-009",
            "StubProvider",
            &result,
            Money::new(Decimal::new(10_00, 2)),
            "MKD",
        );
        assert!(record.success);
        assert_eq!(record.provider_transaction_id.chars().count(), 100);
        assert!(long_id.starts_with(&record.provider_transaction_id));
        assert_eq!(record.raw_response, result.raw_response);
    }
}
