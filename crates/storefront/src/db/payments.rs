//! Payment transaction storage and the system-driven `Pending -> Paid` move.

use sqlx::PgPool;

use emporium_core::{OrderStatus, UserId};

use super::RepositoryError;
use crate::models::PaymentRecord;

/// Repository for payment transactions.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a provider callback and apply its effect on the order.
    ///
    /// The transaction row is always written. A successful payment moves a
    /// `Pending` order to `Paid` and writes a system history row; any other
    /// combination leaves the status untouched. Returns the order's status
    /// after the callback.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order vanished, or
    /// `RepositoryError::Database` if a statement fails.
    pub async fn record_callback(
        &self,
        record: &PaymentRecord,
    ) -> Result<OrderStatus, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_scalar::<_, OrderStatus>(
            "SELECT status FROM shop.order WHERE id = $1 FOR UPDATE",
        )
        .bind(record.order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query(
            "INSERT INTO shop.payment_transaction \
             (order_id, provider, merchant_order_id, provider_transaction_id, amount, currency, \
              success, completed_at, raw_response) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8)",
        )
        .bind(record.order_id)
        .bind(&record.provider)
        .bind(&record.merchant_order_id)
        .bind(&record.provider_transaction_id)
        .bind(record.amount)
        .bind(&record.currency)
        .bind(record.success)
        .bind(record.raw_response.as_deref())
        .execute(&mut *tx)
        .await?;

        let next = callback_outcome(current, record.success);

        if next != current {
            sqlx::query("UPDATE shop.order SET status = $2 WHERE id = $1")
                .bind(record.order_id)
                .bind(next)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO shop.order_status_history \
                 (order_id, from_status, to_status, changed_by_user_id, note) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(record.order_id)
            .bind(current)
            .bind(next)
            .bind(None::<UserId>)
            .bind(format!("Payment confirmed by {}", record.provider))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %record.order_id,
            provider = %record.provider,
            success = record.success,
            from = %current,
            to = %next,
            "Payment callback recorded"
        );
        Ok(next)
    }
}

/// Status after a payment callback. Only a successful payment on a
/// `Pending` order moves it, and only to `Paid`.
const fn callback_outcome(current: OrderStatus, success: bool) -> OrderStatus {
    match (current, success) {
        (OrderStatus::Pending, true) => OrderStatus::Paid,
        _ => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_callback_pays_pending_order() {
        assert_eq!(callback_outcome(OrderStatus::Pending, true), OrderStatus::Paid);
    }

    #[test]
    fn test_failed_callback_never_changes_status() {
        for status in OrderStatus::ALL {
            assert_eq!(callback_outcome(status, false), status);
        }
    }

    #[test]
    fn test_successful_callback_leaves_non_pending_orders_alone() {
        for status in OrderStatus::ALL {
            if status != OrderStatus::Pending {
                assert_eq!(callback_outcome(status, true), status);
            }
        }
    }
}
