//! Order administration: listing, detail and manual status changes.

use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use emporium_core::{OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::catalog::like_pattern;
use crate::models::{HistoryEntry, Order, OrderFilter, OrderItem, PaymentTransaction, StatusChange};

pub(crate) const ORDER_COLUMNS: &str =
    "id, user_id, full_name, address, city, phone, email, total_amount, status, created_at";

/// Errors from a manual status change.
#[derive(Debug, Error)]
pub enum StatusChangeError {
    /// The order does not exist.
    #[error("order not found")]
    NotFound,

    /// The transition table does not allow this change.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Database failure while saving.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for StatusChangeError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// Repository for order administration.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Orders matching the filter, newest first.
    ///
    /// The search term matches the order id exactly, or the customer name,
    /// email or phone as a substring.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT ");
        query.push(ORDER_COLUMNS);
        query.push(" FROM shop.order WHERE TRUE");

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            query.push(" AND (full_name ILIKE ").push_bind(pattern.clone());
            query.push(" OR email ILIKE ").push_bind(pattern.clone());
            query.push(" OR phone ILIKE ").push_bind(pattern);
            if let Some(id) = filter.search_id() {
                query.push(" OR id = ").push_bind(id);
            }
            query.push(")");
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let orders = query.build_query_as::<Order>().fetch_all(self.pool).await?;
        Ok(orders)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// Lines of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, product_name, unit_price, quantity \
             FROM shop.order_item WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }

    /// Payment attempts for an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payments(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<PaymentTransaction>, RepositoryError> {
        let payments = sqlx::query_as::<_, PaymentTransaction>(
            "SELECT id, order_id, provider, merchant_order_id, provider_transaction_id, \
             amount, currency, success, created_at, completed_at \
             FROM shop.payment_transaction WHERE order_id = $1 ORDER BY created_at, id",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(payments)
    }

    /// Status history with the changing user's name and email, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(&self, order_id: OrderId) -> Result<Vec<HistoryEntry>, RepositoryError> {
        let history = sqlx::query_as::<_, HistoryEntry>(
            "SELECT h.id, h.from_status, h.to_status, h.changed_by_user_id, \
             u.full_name AS changed_by_name, u.email AS changed_by_email, h.changed_at, h.note \
             FROM shop.order_status_history h \
             LEFT JOIN shop.user u ON u.id = h.changed_by_user_id \
             WHERE h.order_id = $1 \
             ORDER BY h.changed_at DESC, h.id DESC",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(history)
    }

    /// Move an order to `to` on behalf of `actor`.
    ///
    /// The order row is locked for the duration of the transaction. Setting
    /// the current status again is accepted and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StatusChangeError::NotFound` if the order does not exist.
    /// Returns `StatusChangeError::InvalidTransition` if the table forbids the change.
    /// Returns `StatusChangeError::Repository` if saving fails; nothing is written then.
    pub async fn change_status(
        &self,
        id: OrderId,
        to: OrderStatus,
        actor: Option<UserId>,
        note: Option<&str>,
    ) -> Result<StatusChange, StatusChangeError> {
        let mut tx = self.pool.begin().await?;

        let from: OrderStatus =
            sqlx::query_scalar("SELECT status FROM shop.order WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(StatusChangeError::NotFound)?;

        if plan_change(from, to)? == StatusChange::Unchanged {
            return Ok(StatusChange::Unchanged);
        }

        sqlx::query("UPDATE shop.order SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(to)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO shop.order_status_history \
             (order_id, from_status, to_status, changed_by_user_id, note) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(actor)
        .bind(note.map(str::trim).filter(|n| !n.is_empty()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_id = %id, %from, %to, "Order status changed");
        Ok(StatusChange::Changed { from, to })
    }
}

/// Decide what a manual change from `from` to `to` does, before any write.
fn plan_change(from: OrderStatus, to: OrderStatus) -> Result<StatusChange, StatusChangeError> {
    if !from.can_transition_to(to) {
        Err(StatusChangeError::InvalidTransition { from, to })
    } else if from == to {
        Ok(StatusChange::Unchanged)
    } else {
        Ok(StatusChange::Changed { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_change_same_status_is_unchanged() {
        for status in OrderStatus::ALL {
            assert!(matches!(plan_change(status, status), Ok(StatusChange::Unchanged)));
        }
    }

    #[test]
    fn test_plan_change_follows_transition_table() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                if from == to {
                    continue;
                }
                match plan_change(from, to) {
                    Ok(change) => {
                        assert!(from.can_transition_to(to));
                        assert_eq!(change, StatusChange::Changed { from, to });
                    }
                    Err(StatusChangeError::InvalidTransition { from: f, to: t }) => {
                        assert!(!from.can_transition_to(to));
                        assert_eq!((f, t), (from, to));
                    }
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
        }
    }

    #[test]
    fn test_plan_change_rejects_leaving_terminal_states() {
        assert!(matches!(
            plan_change(OrderStatus::Completed, OrderStatus::Processing),
            Err(StatusChangeError::InvalidTransition { .. })
        ));
        assert!(matches!(
            plan_change(OrderStatus::Pending, OrderStatus::Shipped),
            Err(StatusChangeError::InvalidTransition { .. })
        ));
        assert_eq!(
            plan_change(OrderStatus::Pending, OrderStatus::Processing).ok(),
            Some(StatusChange::Changed {
                from: OrderStatus::Pending,
                to: OrderStatus::Processing,
            })
        );
    }
}
