//! Order placement and customer order history.

use sqlx::PgPool;

use emporium_core::{Cart, OrderId, OrderStatus, ShippingDetails, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, StatusHistoryEntry};

const ORDER_COLUMNS: &str =
    "id, user_id, full_name, address, city, phone, email, total_amount, status, created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order from the cart in a single transaction.
    ///
    /// Inserts the order and its lines at the cart's captured prices, then
    /// decrements stock for every line, never below zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn place_order(
        &self,
        user_id: Option<UserId>,
        details: &ShippingDetails,
        cart: &Cart,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO shop.order \
             (user_id, full_name, address, city, phone, email, total_amount, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {ORDER_COLUMNS}"
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(&details.full_name)
            .bind(&details.address)
            .bind(&details.city)
            .bind(&details.phone)
            .bind(details.email.as_str())
            .bind(cart.total())
            .bind(OrderStatus::Pending)
            .fetch_one(&mut *tx)
            .await?;

        for item in cart.items() {
            sqlx::query(
                "INSERT INTO shop.order_item \
                 (order_id, product_id, product_name, unit_price, quantity) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(&item.name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "UPDATE shop.product SET stock_quantity = GREATEST(0, stock_quantity - $2) \
                 WHERE id = $1",
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            lines = cart.items().len(),
            total = %order.total_amount,
            "Order placed"
        );
        Ok(order)
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

    /// Get an order only if it belongs to the given user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM shop.order WHERE id = $1 AND user_id = $2");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
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

    /// Status history of an order, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<StatusHistoryEntry>, RepositoryError> {
        let history = sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT id, order_id, from_status, to_status, changed_by_user_id, changed_at, note \
             FROM shop.order_status_history WHERE order_id = $1 \
             ORDER BY changed_at DESC, id DESC",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;
        Ok(history)
    }
}
