//! Customer account pages: order history and profile.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{CurrencyCode, OrderId};

use super::Layout;
use super::checkout::OrderView;
use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, RequireAuth, set_current_user, set_flash};
use crate::models::{CurrentUser, Order, StatusHistoryEntry};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Order row in the history list.
#[derive(Debug, Clone)]
pub struct OrderSummaryView {
    pub id: i32,
    pub number: String,
    pub created_at: String,
    pub total: String,
    pub status: String,
    pub status_class: &'static str,
}

impl OrderSummaryView {
    fn new(order: &Order, currency: CurrencyCode) -> Self {
        Self {
            id: order.id.as_i32(),
            number: order.number(),
            created_at: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            total: order.total_amount.display(currency),
            status: order.status.to_string(),
            status_class: order.status.badge_class(),
        }
    }
}

/// Status change row on the order detail page.
#[derive(Debug, Clone)]
pub struct HistoryView {
    pub changed_at: String,
    pub from_status: String,
    pub to_status: String,
    pub changed_by: &'static str,
    pub note: String,
}

impl From<&StatusHistoryEntry> for HistoryView {
    fn from(entry: &StatusHistoryEntry) -> Self {
        Self {
            changed_at: entry.changed_at.format("%Y-%m-%d %H:%M").to_string(),
            from_status: entry.from_status.to_string(),
            to_status: entry.to_status.to_string(),
            changed_by: if entry.changed_by_user_id.is_some() {
                "Store staff"
            } else {
                "System"
            },
            note: entry.note.clone().unwrap_or_default(),
        }
    }
}

/// Profile form data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderSummaryView>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order_detail.html")]
pub struct OrderDetailTemplate {
    pub layout: Layout,
    pub order: OrderView,
    pub history: Vec<HistoryView>,
}

/// Profile template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub layout: Layout,
    pub form: ProfileForm,
    pub error: Option<String>,
}

/// List the customer's orders, newest first.
#[instrument(skip(state, session, user))]
pub async fn orders(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersTemplate> {
    let currency = state.config().currency;
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        orders: orders
            .iter()
            .map(|o| OrderSummaryView::new(o, currency))
            .collect(),
    })
}

/// Show one of the customer's orders with its status history.
#[instrument(skip(state, session, user))]
pub async fn order_detail(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<OrderDetailTemplate> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_for_user(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let items = orders.items(order.id).await?;
    let history = orders.history(order.id).await?;

    Ok(OrderDetailTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        order: OrderView::new(&order, &items, state.config().currency),
        history: history.iter().map(HistoryView::from).collect(),
    })
}

/// Display the profile form.
#[instrument(skip(state, session, user))]
pub async fn profile_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<ProfileTemplate> {
    let account = AuthService::new(state.pool()).get_user(user.id).await?;

    Ok(ProfileTemplate {
        layout: Layout::load(&session, Some(&user)).await,
        form: ProfileForm {
            full_name: account.full_name.unwrap_or_default(),
            email: account.email.into_inner(),
        },
        error: None,
    })
}

/// Update name and email.
#[instrument(skip(state, session, user, form))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response> {
    let auth = AuthService::new(state.pool());
    match auth
        .update_profile(user.id, &form.email, Some(&form.full_name))
        .await
    {
        Ok(updated) => {
            let current = CurrentUser {
                id: updated.id,
                display_name: updated.display_name(),
                email: updated.email,
            };
            set_current_user(&session, &current).await?;
            set_flash(&session, Flash::success("Your profile has been updated.")).await;
            Ok(Redirect::to("/account/profile").into_response())
        }
        Err(e @ (AuthError::UserAlreadyExists | AuthError::InvalidEmail(_))) => {
            let error = match e {
                AuthError::UserAlreadyExists => {
                    "That email address is already used by another account.".to_string()
                }
                other => other.user_message(),
            };
            Ok(ProfileTemplate {
                layout: Layout::load(&session, Some(&user)).await,
                form,
                error: Some(error),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use emporium_core::{OrderStatus, StatusHistoryId, UserId};

    fn entry(changed_by: Option<UserId>, note: Option<&str>) -> StatusHistoryEntry {
        StatusHistoryEntry {
            id: StatusHistoryId::new(1),
            order_id: OrderId::new(1),
            from_status: OrderStatus::Pending,
            to_status: OrderStatus::Paid,
            changed_by_user_id: changed_by,
            changed_at: Utc::now(),
            note: note.map(String::from),
        }
    }

    #[test]
    fn test_history_view_system_change() {
        let view = HistoryView::from(&entry(None, Some("Payment confirmed by StubProvider")));
        assert_eq!(view.changed_by, "System");
        assert_eq!(view.from_status, "Pending");
        assert_eq!(view.to_status, "Paid");
        assert_eq!(view.note, "Payment confirmed by StubProvider");
    }

    #[test]
    fn test_history_view_staff_change() {
        let view = HistoryView::from(&entry(Some(UserId::new(9)), None));
        assert_eq!(view.changed_by, "Store staff");
        assert_eq!(view.note, "");
    }
}
