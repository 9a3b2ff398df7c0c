//! Dashboard aggregates.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use emporium_core::{Money, ProductId};

/// Rows shown in each dashboard list.
pub const DASHBOARD_LIST_SIZE: i64 = 5;

/// Products at or below this stock level are listed as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Headline numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kpis {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub processing_orders: i64,
    pub total_revenue: Money,
    pub orders_today: i64,
    pub revenue_today: Money,
}

/// A product running out.
#[derive(Debug, Clone, FromRow)]
pub struct LowStockProduct {
    pub id: ProductId,
    pub name: String,
    pub stock_quantity: i32,
}

/// A product ranked by units sold.
#[derive(Debug, Clone, FromRow)]
pub struct BestSeller {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity_sold: i64,
}

/// A customer ranked by their latest order.
#[derive(Debug, Clone, FromRow)]
pub struct RecentCustomer {
    pub full_name: String,
    pub email: String,
    pub last_order_at: DateTime<Utc>,
    pub order_count: i64,
}
