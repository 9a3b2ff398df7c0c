//! Checkout: shipping form, order placement and the success page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{CurrencyCode, FieldError, OrderId, ShippingDetails, ShippingForm};

use super::Layout;
use super::cart::{CartView, load_cart, save_cart};
use crate::db::{OrderRepository, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentUser, Order, OrderItem, session_keys};
use crate::state::AppState;

/// Order line display data for templates.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub product_id: i32,
    pub name: String,
    pub unit_price: String,
    pub quantity: i32,
    pub line_total: String,
}

/// Order display data shared by checkout, payment and account pages.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub number: String,
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    pub total: String,
    pub status: String,
    pub status_class: &'static str,
    pub created_at: String,
    pub awaiting_payment: bool,
    pub lines: Vec<OrderLineView>,
}

impl OrderView {
    /// Format an order and its lines in the shop currency.
    #[must_use]
    pub fn new(order: &Order, items: &[OrderItem], currency: CurrencyCode) -> Self {
        Self {
            id: order.id.as_i32(),
            number: order.number(),
            full_name: order.full_name.clone(),
            address: order.address.clone(),
            city: order.city.clone(),
            phone: order.phone.clone(),
            email: order.email.clone(),
            total: order.total_amount.display(currency),
            status: order.status.to_string(),
            status_class: order.status.badge_class(),
            created_at: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            awaiting_payment: order.awaiting_payment(),
            lines: items
                .iter()
                .map(|item| OrderLineView {
                    product_id: item.product_id.as_i32(),
                    name: item.product_name.clone(),
                    unit_price: item.unit_price.display(currency),
                    quantity: item.quantity,
                    line_total: item.line_total().display(currency),
                })
                .collect(),
        }
    }
}

/// Checkout form template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub form: ShippingForm,
    pub errors: Vec<FieldError>,
}

/// Order placed template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct SuccessTemplate {
    pub layout: Layout,
    pub order: OrderView,
}

/// Orders placed from this session, so guests can see their own success page.
async fn placed_orders(session: &Session) -> Vec<OrderId> {
    session
        .get::<Vec<OrderId>>(session_keys::PLACED_ORDERS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Whether the visitor owns the order or placed it from this session.
pub async fn visible_to(session: &Session, user: Option<&CurrentUser>, order: &Order) -> bool {
    let owns = user.is_some_and(|u| order.user_id == Some(u.id));
    owns || placed_orders(session).await.contains(&order.id)
}

async fn remember_placed_order(session: &Session, order_id: OrderId) -> Result<()> {
    let mut orders = placed_orders(session).await;
    orders.push(order_id);
    session.insert(session_keys::PLACED_ORDERS, orders).await?;
    Ok(())
}

/// Display the shipping form.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response> {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let form = match &user {
        Some(current) => prefill(&state, current).await?,
        None => ShippingForm::default(),
    };

    Ok(CheckoutTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
        cart: CartView::new(&cart, state.config().currency),
        form,
        errors: Vec::new(),
    }
    .into_response())
}

async fn prefill(state: &AppState, current: &CurrentUser) -> Result<ShippingForm> {
    let user = UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?;
    Ok(user.map_or_else(ShippingForm::default, |user| ShippingForm {
        full_name: user.full_name.unwrap_or_default(),
        email: user.email.into_inner(),
        ..ShippingForm::default()
    }))
}

/// Place the order.
#[instrument(skip(state, session, user, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<ShippingForm>,
) -> Result<Response> {
    let cart = load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let details = match ShippingDetails::parse(&form) {
        Ok(details) => details,
        Err(errors) => {
            return Ok(CheckoutTemplate {
                layout: Layout::load(&session, user.as_ref()).await,
                cart: CartView::new(&cart, state.config().currency),
                form,
                errors,
            }
            .into_response());
        }
    };

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .place_order(user.as_ref().map(|u| u.id), &details, &cart)
        .await?;

    save_cart(&session, &emporium_core::Cart::new()).await?;
    remember_placed_order(&session, order.id).await?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("order_id", &order.id.to_string())]),
    );

    send_confirmation(&state, &order).await;

    Ok(Redirect::to(&format!("/checkout/success/{}", order.id)).into_response())
}

/// Best-effort confirmation email; failures are logged.
async fn send_confirmation(state: &AppState, order: &Order) {
    let Some(email) = state.email() else {
        tracing::debug!(order_id = %order.id, "Email disabled, skipping confirmation");
        return;
    };

    let items = match OrderRepository::new(state.pool()).items(order.id).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(
                order_id = %order.id,
                error = %e,
                "Failed to load items for confirmation email"
            );
            return;
        }
    };

    if let Err(e) = email
        .send_order_confirmation(order, &items, state.config().currency)
        .await
    {
        tracing::warn!(order_id = %order.id, error = %e, "Failed to send order confirmation");
    }
}

/// Display a placed order with the "Pay now" action.
///
/// Visible to the owning account or to the session that placed it.
#[instrument(skip(state, session, user))]
pub async fn success(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<OrderId>,
) -> Result<SuccessTemplate> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if !visible_to(&session, user.as_ref(), &order).await {
        return Err(AppError::NotFound(format!("order {id}")));
    }

    let items = orders.items(order.id).await?;
    Ok(SuccessTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
        order: OrderView::new(&order, &items, state.config().currency),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use emporium_core::{Money, OrderItemId, OrderStatus, ProductId};
    use rust_decimal::Decimal;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(7),
            user_id: None,
            full_name: "Ana Kostova".to_string(),
            address: "Partizanska 12".to_string(),
            city: "Skopje".to_string(),
            phone: "070123456".to_string(),
            email: "ana@example.mk".to_string(),
            total_amount: Money::new(Decimal::new(30_00, 2)),
            status,
            created_at: Utc.with_ymd_and_hms(2026, 3, 9, 14, 5, 0).unwrap(),
        }
    }

    #[test]
    fn test_order_view_formats_order() {
        let items = vec![OrderItem {
            id: OrderItemId::new(1),
            order_id: OrderId::new(7),
            product_id: ProductId::new(2),
            product_name: "Honey".to_string(),
            unit_price: Money::new(Decimal::new(10_00, 2)),
            quantity: 3,
        }];

        let view = OrderView::new(&order(OrderStatus::Pending), &items, CurrencyCode::Usd);
        assert_eq!(view.number, "ORD-20260309-007");
        assert_eq!(view.total, "$30.00");
        assert_eq!(view.created_at, "2026-03-09 14:05");
        assert!(view.awaiting_payment);
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].line_total, "$30.00");
    }

    #[test]
    fn test_order_view_paid_is_not_awaiting_payment() {
        let view = OrderView::new(&order(OrderStatus::Paid), &[], CurrencyCode::Usd);
        assert!(!view.awaiting_payment);
        assert_eq!(view.status, "Paid");
    }
}
