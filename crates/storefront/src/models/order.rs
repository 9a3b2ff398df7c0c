//! Order, order line, status history and payment record types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use emporium_core::{
    Money, OrderId, OrderItemId, OrderStatus, ProductId, StatusHistoryId, UserId, order_number,
};

/// A placed order.
#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Customer-facing order number.
    #[must_use]
    pub fn number(&self) -> String {
        order_number(self.id, self.created_at)
    }

    /// Whether a payment can still be started for this order.
    #[must_use]
    pub fn awaiting_payment(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}

/// A line of a placed order, priced at checkout time.
#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i32,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A recorded status change. `changed_by_user_id` is `None` for system changes.
#[derive(Debug, Clone, FromRow)]
pub struct StatusHistoryEntry {
    pub id: StatusHistoryId,
    pub order_id: OrderId,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub changed_by_user_id: Option<UserId>,
    pub changed_at: DateTime<Utc>,
    pub note: Option<String>,
}

/// A payment attempt to persist after a provider callback.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub order_id: OrderId,
    pub provider: String,
    pub merchant_order_id: String,
    pub provider_transaction_id: String,
    pub amount: Money,
    pub currency: String,
    pub success: bool,
    pub raw_response: Option<String>,
}
