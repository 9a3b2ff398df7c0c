//! Orders as the back-office sees them.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;

use emporium_core::{
    Money, OrderId, OrderItemId, OrderStatus, PaymentTransactionId, ProductId, StatusHistoryId,
    UserId, order_number,
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
}

/// A line of a placed order.
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

/// A recorded payment attempt.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentTransaction {
    pub id: PaymentTransactionId,
    pub order_id: OrderId,
    pub provider: String,
    pub merchant_order_id: String,
    pub provider_transaction_id: String,
    pub amount: Money,
    pub currency: String,
    pub success: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A status change joined with the user who made it.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntry {
    pub id: StatusHistoryId,
    pub from_status: OrderStatus,
    pub to_status: OrderStatus,
    pub changed_by_user_id: Option<UserId>,
    pub changed_by_name: Option<String>,
    pub changed_by_email: Option<String>,
    pub changed_at: DateTime<Utc>,
    pub note: Option<String>,
}

impl HistoryEntry {
    /// Who made the change: full name, then email, then "Unknown user".
    /// Changes without a user are system changes.
    #[must_use]
    pub fn changed_by(&self) -> String {
        if self.changed_by_user_id.is_none() {
            return "System".to_string();
        }
        [&self.changed_by_name, &self.changed_by_email]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or("Unknown user")
            .to_string()
    }
}

/// Raw order list query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

/// Validated order list filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderFilter {
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    /// Build a filter from the query string. Unknown statuses are ignored.
    #[must_use]
    pub fn from_query(query: &OrderListQuery) -> Self {
        Self {
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            status: query
                .status
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .and_then(|s| s.parse().ok()),
        }
    }

    /// The search term as an order id, when it is numeric.
    #[must_use]
    pub fn search_id(&self) -> Option<OrderId> {
        self.search.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Outcome of a manual status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The status was updated and a history row written.
    Changed { from: OrderStatus, to: OrderStatus },
    /// The order already had the requested status.
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: Option<i32>, name: Option<&str>, email: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            id: StatusHistoryId::new(1),
            from_status: OrderStatus::Pending,
            to_status: OrderStatus::Processing,
            changed_by_user_id: user.map(UserId::new),
            changed_by_name: name.map(String::from),
            changed_by_email: email.map(String::from),
            changed_at: Utc::now(),
            note: None,
        }
    }

    #[test]
    fn test_changed_by_display() {
        assert_eq!(entry(None, None, None).changed_by(), "System");
        assert_eq!(
            entry(Some(1), Some("Marija P."), Some("m@emporium.mk")).changed_by(),
            "Marija P."
        );
        assert_eq!(
            entry(Some(1), Some(" "), Some("m@emporium.mk")).changed_by(),
            "m@emporium.mk"
        );
        assert_eq!(entry(Some(1), None, None).changed_by(), "Unknown user");
    }

    #[test]
    fn test_filter_from_query() {
        let filter = OrderFilter::from_query(&OrderListQuery {
            search: Some(" 42 ".to_string()),
            status: Some("shipped".to_string()),
        });
        assert_eq!(filter.search.as_deref(), Some("42"));
        assert_eq!(filter.search_id(), Some(OrderId::new(42)));
        assert_eq!(filter.status, Some(OrderStatus::Shipped));
    }

    #[test]
    fn test_filter_ignores_unknown_status() {
        let filter = OrderFilter::from_query(&OrderListQuery {
            search: Some("ana".to_string()),
            status: Some("lost".to_string()),
        });
        assert_eq!(filter.status, None);
        assert_eq!(filter.search_id(), None);
    }
}
