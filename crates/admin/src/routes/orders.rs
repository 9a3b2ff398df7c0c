//! Order administration: list, detail and status changes.
//!
//! Status changes come in through a plain form post or the JSON endpoint
//! used by the detail page script. Both go through
//! [`OrderRepository::change_status`] and notify the customer only when the
//! status actually moved.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{CurrencyCode, OrderId, OrderStatus};

use super::Layout;
use crate::db::{OrderRepository, StatusChangeError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Actor, Flash, RequireAdminAuth, set_flash};
use crate::models::{
    HistoryEntry, Order, OrderFilter, OrderItem, OrderListQuery, PaymentTransaction, StatusChange,
};
use crate::state::AppState;

/// Order row in lists.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: i32,
    pub number: String,
    pub created_at: String,
    pub full_name: String,
    pub email: String,
    pub total: String,
    pub status: &'static str,
    pub status_class: &'static str,
}

impl OrderRowView {
    pub(crate) fn new(order: &Order, currency: CurrencyCode) -> Self {
        Self {
            id: order.id.as_i32(),
            number: order.number(),
            created_at: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            full_name: order.full_name.clone(),
            email: order.email.clone(),
            total: order.total_amount.display(currency),
            status: order.status.as_str(),
            status_class: order.status.badge_class(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemView {
    pub product_name: String,
    pub unit_price: String,
    pub quantity: i32,
    pub line_total: String,
}

impl ItemView {
    fn new(item: &OrderItem, currency: CurrencyCode) -> Self {
        Self {
            product_name: item.product_name.clone(),
            unit_price: item.unit_price.display(currency),
            quantity: item.quantity,
            line_total: item.line_total().display(currency),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaymentView {
    pub provider: String,
    pub transaction_id: String,
    pub amount: String,
    pub success: bool,
    pub created_at: String,
    pub completed_at: String,
}

impl PaymentView {
    fn new(payment: &PaymentTransaction) -> Self {
        Self {
            provider: payment.provider.clone(),
            transaction_id: payment.provider_transaction_id.clone(),
            amount: format!("{} {}", payment.amount, payment.currency),
            success: payment.success,
            created_at: payment.created_at.format("%Y-%m-%d %H:%M").to_string(),
            completed_at: payment
                .completed_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HistoryView {
    pub changed_at: String,
    pub from_status: &'static str,
    pub to_status: &'static str,
    pub changed_by: String,
    pub note: String,
}

impl From<&HistoryEntry> for HistoryView {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            changed_at: entry.changed_at.format("%Y-%m-%d %H:%M").to_string(),
            from_status: entry.from_status.as_str(),
            to_status: entry.to_status.as_str(),
            changed_by: entry.changed_by(),
            note: entry.note.clone().unwrap_or_default(),
        }
    }
}

/// A status filter option on the list page.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub selected: bool,
}

/// Order list template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderRowView>,
    pub search: String,
    pub statuses: Vec<StatusOption>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderDetailTemplate {
    pub layout: Layout,
    pub order: OrderRowView,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub items: Vec<ItemView>,
    pub payments: Vec<PaymentView>,
    pub next_statuses: Vec<&'static str>,
    pub history: Vec<HistoryView>,
}

/// List orders, optionally filtered by search term and status.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<OrderListQuery>,
) -> Result<OrdersTemplate> {
    let currency = state.config().currency;
    let filter = OrderFilter::from_query(&query);
    let orders = OrderRepository::new(state.pool()).list(&filter).await?;

    Ok(OrdersTemplate {
        layout: Layout::load(&session, &admin, "/orders").await,
        orders: orders
            .iter()
            .map(|o| OrderRowView::new(o, currency))
            .collect(),
        search: filter.search.clone().unwrap_or_default(),
        statuses: OrderStatus::ALL
            .into_iter()
            .map(|status| StatusOption {
                value: status.as_str(),
                selected: filter.status == Some(status),
            })
            .collect(),
    })
}

/// Show an order with its lines, payments and history.
#[instrument(skip(state, session, admin))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<OrderId>,
) -> Result<OrderDetailTemplate> {
    let currency = state.config().currency;
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let items = orders.items(id).await?;
    let payments = orders.payments(id).await?;
    let history = orders.history(id).await?;

    Ok(OrderDetailTemplate {
        layout: Layout::load(&session, &admin, "/orders").await,
        order: OrderRowView::new(&order, currency),
        address: order.address.clone(),
        city: order.city.clone(),
        phone: order.phone.clone(),
        items: items.iter().map(|i| ItemView::new(i, currency)).collect(),
        payments: payments.iter().map(PaymentView::new).collect(),
        next_statuses: order
            .status
            .allowed_transitions()
            .iter()
            .map(|s| s.as_str())
            .collect(),
        history: history.iter().map(HistoryView::from).collect(),
    })
}

/// Status form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Change the status from the detail page form.
#[instrument(skip(state, session, actor, form), fields(admin_id = %actor.admin.id))]
pub async fn update_status(
    State(state): State<AppState>,
    session: Session,
    actor: Actor,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect> {
    let redirect = Redirect::to(&format!("/orders/{id}"));

    let Ok(to) = form.status.parse::<OrderStatus>() else {
        set_flash(&session, Flash::error("Invalid status.")).await;
        return Ok(redirect);
    };

    let change = OrderRepository::new(state.pool())
        .change_status(id, to, Some(actor.admin.id), form.note.as_deref())
        .await;

    match change {
        Ok(change) => {
            if matches!(change, StatusChange::Changed { .. }) {
                notify_customer(&state, id, to).await;
            }
            set_flash(
                &session,
                Flash::success(format!("Order #{id} status updated to {to}.")),
            )
            .await;
        }
        Err(StatusChangeError::InvalidTransition { from, to }) => {
            set_flash(
                &session,
                Flash::error(format!("Cannot change status from {from} to {to}.")),
            )
            .await;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(redirect)
}

/// JSON status change request.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub id: OrderId,
    /// Status name or numeric code.
    pub status: Value,
    #[serde(default)]
    pub note: Option<String>,
}

/// JSON status change response.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_status: Option<&'static str>,
}

impl StatusResponse {
    fn failure(status: StatusCode, message: &str) -> Response {
        (
            status,
            Json(Self {
                success: false,
                message: message.to_string(),
                new_status: None,
            }),
        )
            .into_response()
    }
}

/// Parse the request status, accepting a name or a numeric code.
fn parse_status(value: &Value) -> Option<OrderStatus> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

/// Change the status through the JSON endpoint.
///
/// The order is looked up before the status is parsed, so an unknown id
/// reports 404 whatever the requested status.
#[instrument(skip(state, actor, body), fields(admin_id = %actor.admin.id))]
pub async fn api_update_status(
    State(state): State<AppState>,
    actor: Actor,
    body: Bytes,
) -> Response {
    let Ok(request) = serde_json::from_slice::<StatusRequest>(&body) else {
        return StatusResponse::failure(StatusCode::BAD_REQUEST, "Invalid payload.");
    };
    let repo = OrderRepository::new(state.pool());
    match repo.get(request.id).await {
        Ok(Some(_)) => {}
        Ok(None) => return StatusResponse::failure(StatusCode::NOT_FOUND, "Order not found."),
        Err(e) => {
            let e = StatusChangeError::from(e);
            tracing::error!(error = %e, order_id = %request.id, "Failed to load order");
            let (code, message) = change_failure(&e);
            return StatusResponse::failure(code, message);
        }
    }

    let Some(to) = parse_status(&request.status) else {
        return StatusResponse::failure(StatusCode::BAD_REQUEST, "Invalid status.");
    };

    match repo
        .change_status(request.id, to, Some(actor.admin.id), request.note.as_deref())
        .await
    {
        Ok(change) => {
            if matches!(change, StatusChange::Changed { .. }) {
                notify_customer(&state, request.id, to).await;
            }
            Json(StatusResponse {
                success: true,
                message: format!("Status updated to {to}."),
                new_status: Some(to.as_str()),
            })
            .into_response()
        }
        Err(e) => {
            if let StatusChangeError::Repository(inner) = &e {
                tracing::error!(
                    error = %inner,
                    order_id = %request.id,
                    "Failed to save order status"
                );
            }
            let (code, message) = change_failure(&e);
            StatusResponse::failure(code, message)
        }
    }
}

/// HTTP status and message for a failed status change.
const fn change_failure(e: &StatusChangeError) -> (StatusCode, &'static str) {
    match e {
        StatusChangeError::NotFound => (StatusCode::NOT_FOUND, "Order not found."),
        StatusChangeError::InvalidTransition { .. } => (
            StatusCode::BAD_REQUEST,
            "Invalid status transition.",
        ),
        StatusChangeError::Repository(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Database error while saving status.",
        ),
    }
}

/// Email the customer about a status change. Failures are logged only.
async fn notify_customer(state: &AppState, id: OrderId, status: OrderStatus) {
    let Some(email) = state.email() else {
        return;
    };

    let order = match OrderRepository::new(state.pool()).get(id).await {
        Ok(Some(order)) => order,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, order_id = %id, "Could not load order for notification");
            return;
        }
    };

    if let Err(e) = email.send_status_update(&order, status).await {
        tracing::warn!(error = %e, order_id = %id, "Failed to send status update email");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;
    use serde_json::json;

    #[test]
    fn test_parse_status_accepts_name_or_code() {
        assert_eq!(parse_status(&json!("Shipped")), Some(OrderStatus::Shipped));
        assert_eq!(parse_status(&json!("processing")), Some(OrderStatus::Processing));
        assert_eq!(parse_status(&json!(4)), Some(OrderStatus::Completed));
        assert_eq!(parse_status(&json!("lost")), None);
        assert_eq!(parse_status(&json!(42)), None);
        assert_eq!(parse_status(&json!(null)), None);
    }

    #[test]
    fn test_status_request_shape() {
        let request: StatusRequest =
            serde_json::from_value(json!({"id": 7, "status": "Paid"})).unwrap();
        assert_eq!(request.id, OrderId::new(7));
        assert!(request.note.is_none());
        assert!(serde_json::from_value::<StatusRequest>(json!({"status": "Paid"})).is_err());
    }

    #[test]
    fn test_response_omits_missing_status() {
        let body = serde_json::to_value(StatusResponse {
            success: false,
            message: "Invalid status.".to_string(),
            new_status: None,
        })
        .unwrap();
        assert_eq!(body, json!({"success": false, "message": "Invalid status."}));

        let body = serde_json::to_value(StatusResponse {
            success: true,
            message: "Status updated to Shipped.".to_string(),
            new_status: Some("Shipped"),
        })
        .unwrap();
        assert_eq!(body["newStatus"], "Shipped");
    }

    #[test]
    fn test_change_failure_maps_errors() {
        assert_eq!(
            change_failure(&StatusChangeError::NotFound),
            (StatusCode::NOT_FOUND, "Order not found.")
        );
        assert_eq!(
            change_failure(&StatusChangeError::InvalidTransition {
                from: OrderStatus::Completed,
                to: OrderStatus::Pending,
            }),
            (StatusCode::BAD_REQUEST, "Invalid status transition.")
        );
        assert_eq!(
            change_failure(&StatusChangeError::Repository(RepositoryError::NotFound)),
            (StatusCode::INTERNAL_SERVER_ERROR, "Database error while saving status.")
        );
    }
}
