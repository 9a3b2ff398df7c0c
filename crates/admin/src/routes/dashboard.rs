//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::CurrencyCode;

use super::Layout;
use super::orders::OrderRowView;
use crate::db::DashboardRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{BestSeller, Kpis, LowStockProduct, RecentCustomer};
use crate::state::AppState;

/// Dashboard metrics, formatted.
#[derive(Debug, Clone)]
pub struct KpiView {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub processing_orders: i64,
    pub total_revenue: String,
    pub orders_today: i64,
    pub revenue_today: String,
}

impl KpiView {
    fn new(kpis: &Kpis, currency: CurrencyCode) -> Self {
        Self {
            total_orders: kpis.total_orders,
            pending_orders: kpis.pending_orders,
            processing_orders: kpis.processing_orders,
            total_revenue: kpis.total_revenue.display(currency),
            orders_today: kpis.orders_today,
            revenue_today: kpis.revenue_today.display(currency),
        }
    }
}

/// Recent customer row.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub full_name: String,
    pub email: String,
    pub last_order_at: String,
    pub order_count: i64,
}

impl From<&RecentCustomer> for CustomerView {
    fn from(customer: &RecentCustomer) -> Self {
        Self {
            full_name: customer.full_name.clone(),
            email: customer.email.clone(),
            last_order_at: customer.last_order_at.format("%Y-%m-%d %H:%M").to_string(),
            order_count: customer.order_count,
        }
    }
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub kpis: KpiView,
    pub latest_orders: Vec<OrderRowView>,
    pub low_stock: Vec<LowStockProduct>,
    pub best_sellers: Vec<BestSeller>,
    pub recent_customers: Vec<CustomerView>,
}

/// Dashboard page handler.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<DashboardTemplate> {
    let currency = state.config().currency;
    let repo = DashboardRepository::new(state.pool());

    let kpis = repo.kpis(Utc::now()).await?;
    let latest_orders = repo.latest_orders().await?;
    let low_stock = repo.low_stock().await?;
    let best_sellers = repo.best_sellers().await?;
    let recent_customers = repo.recent_customers().await?;

    Ok(DashboardTemplate {
        layout: Layout::load(&session, &admin, "/").await,
        kpis: KpiView::new(&kpis, currency),
        latest_orders: latest_orders
            .iter()
            .map(|o| OrderRowView::new(o, currency))
            .collect(),
        low_stock,
        best_sellers,
        recent_customers: recent_customers.iter().map(CustomerView::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_core::Money;
    use rust_decimal::Decimal;

    #[test]
    fn test_kpi_view_formats_money() {
        let kpis = Kpis {
            total_orders: 10,
            pending_orders: 2,
            processing_orders: 3,
            total_revenue: Money::new(Decimal::new(1_250_00, 2)),
            orders_today: 1,
            revenue_today: Money::new(Decimal::new(99_90, 2)),
        };
        let view = KpiView::new(&kpis, CurrencyCode::Eur);
        assert_eq!(view.total_orders, 10);
        assert_eq!(view.total_revenue, "1250.00 €");
        assert_eq!(view.revenue_today, "99.90 €");
    }
}
