//! Reporting queries behind the dashboard.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use emporium_core::{Money, OrderStatus};

use super::RepositoryError;
use super::orders::ORDER_COLUMNS;
use crate::models::dashboard::{DASHBOARD_LIST_SIZE, LOW_STOCK_THRESHOLD};
use crate::models::{BestSeller, Kpis, LowStockProduct, Order, RecentCustomer};

/// Statuses left out of today's revenue.
const NON_REVENUE: [OrderStatus; 2] = [OrderStatus::Cancelled, OrderStatus::Refunded];

/// Repository for dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Headline numbers. "Today" is the current UTC day, and today's revenue
    /// leaves out the statuses that do not count as revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn kpis(&self, now: DateTime<Utc>) -> Result<Kpis, RepositoryError> {
        let (day_start, day_end) = utc_day(now);
        let row: (i64, i64, i64, Money, i64, Money) = sqlx::query_as(
            "SELECT \
                COUNT(*), \
                COUNT(*) FILTER (WHERE status = $1), \
                COUNT(*) FILTER (WHERE status = $2), \
                COALESCE(SUM(total_amount), 0), \
                COUNT(*) FILTER (WHERE created_at >= $3 AND created_at < $4), \
                COALESCE(SUM(total_amount) FILTER ( \
                    WHERE created_at >= $3 AND created_at < $4 AND status NOT IN ($5, $6)), 0) \
             FROM shop.order",
        )
        .bind(OrderStatus::Pending)
        .bind(OrderStatus::Processing)
        .bind(day_start)
        .bind(day_end)
        .bind(NON_REVENUE[0])
        .bind(NON_REVENUE[1])
        .fetch_one(self.pool)
        .await?;

        Ok(Kpis {
            total_orders: row.0,
            pending_orders: row.1,
            processing_orders: row.2,
            total_revenue: row.3,
            orders_today: row.4,
            revenue_today: row.5,
        })
    }

    /// The newest orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM shop.order ORDER BY created_at DESC, id DESC LIMIT $1"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(DASHBOARD_LIST_SIZE)
            .fetch_all(self.pool)
            .await?;
        Ok(orders)
    }

    /// Non-deleted products at or below the low-stock threshold, lowest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self) -> Result<Vec<LowStockProduct>, RepositoryError> {
        let products = sqlx::query_as::<_, LowStockProduct>(
            "SELECT id, name, stock_quantity FROM shop.product \
             WHERE NOT is_deleted AND stock_quantity <= $1 \
             ORDER BY stock_quantity ASC, id ASC LIMIT $2",
        )
        .bind(LOW_STOCK_THRESHOLD)
        .bind(DASHBOARD_LIST_SIZE)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Products by units sold across all orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn best_sellers(&self) -> Result<Vec<BestSeller>, RepositoryError> {
        let sellers = sqlx::query_as::<_, BestSeller>(
            "SELECT product_id, product_name, SUM(quantity)::BIGINT AS quantity_sold \
             FROM shop.order_item \
             GROUP BY product_id, product_name \
             ORDER BY quantity_sold DESC, product_id ASC LIMIT $1",
        )
        .bind(DASHBOARD_LIST_SIZE)
        .fetch_all(self.pool)
        .await?;
        Ok(sellers)
    }

    /// Customers by their most recent order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_customers(&self) -> Result<Vec<RecentCustomer>, RepositoryError> {
        let customers = sqlx::query_as::<_, RecentCustomer>(
            "SELECT full_name, email, MAX(created_at) AS last_order_at, COUNT(*) AS order_count \
             FROM shop.order \
             GROUP BY full_name, email \
             ORDER BY last_order_at DESC LIMIT $1",
        )
        .bind(DASHBOARD_LIST_SIZE)
        .fetch_all(self.pool)
        .await?;
        Ok(customers)
    }
}

/// Start and end of the UTC day containing `now`.
fn utc_day(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map_or(now, |midnight| midnight.and_utc());
    (start, start + Duration::days(1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_non_revenue_matches_status_rules() {
        for status in OrderStatus::ALL {
            assert_eq!(status.counts_as_revenue(), !NON_REVENUE.contains(&status));
        }
    }

    #[test]
    fn test_utc_day_bounds() {
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 23, 59, 59).unwrap();
        let (start, end) = utc_day(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 10, 0, 0, 0).unwrap());
    }
}
