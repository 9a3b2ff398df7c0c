//! Cart route handlers.
//!
//! The cart lives in the session as JSON. Every mutation redirects back to
//! `/cart` so a refresh never repeats a POST.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{Cart, CurrencyCode, ProductId};

use super::Layout;
use crate::db::CatalogRepository;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flash, OptionalAuth, set_flash};
use crate::models::session_keys;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: i32,
    pub name: String,
    pub unit_price: String,
    pub quantity: i32,
    pub line_total: String,
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub count: i32,
}

impl CartView {
    /// Format a cart for display in the shop currency.
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            lines: cart
                .items()
                .iter()
                .map(|item| CartLineView {
                    product_id: item.product_id.as_i32(),
                    name: item.name.clone(),
                    unit_price: item.unit_price.display(currency),
                    quantity: item.quantity,
                    line_total: item.line_total().display(currency),
                })
                .collect(),
            total: cart.total().display(currency),
            count: cart.count(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session; a missing or unreadable cart is empty.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the cart in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

/// Form body carrying a product ID.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub layout: Layout,
    pub cart: CartView,
}

/// Display cart page.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> CartShowTemplate {
    let cart = load_cart(&session).await;
    CartShowTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
        cart: CartView::new(&cart, state.config().currency),
    }
}

/// Add one unit of a product.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let Some(product) = CatalogRepository::new(state.pool())
        .get_product(form.product_id)
        .await?
    else {
        set_flash(&session, Flash::error("Product not found.")).await;
        return Ok(Redirect::to("/shop"));
    };

    let mut cart = load_cart(&session).await;
    match cart.add(
        product.id,
        &product.name,
        product.price,
        product.stock_quantity,
    ) {
        Ok(()) => {
            save_cart(&session, &cart).await?;
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", &product.id.to_string())]),
            );
            set_flash(
                &session,
                Flash::success(format!("{} added to cart.", product.name)),
            )
            .await;
        }
        Err(e) => set_flash(&session, Flash::error(e.to_string())).await,
    }

    Ok(Redirect::to("/cart"))
}

/// Increase the quantity of a line, checking current stock.
#[instrument(skip(state, session))]
pub async fn increase(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Result<Redirect> {
    let mut cart = load_cart(&session).await;
    if cart.get(form.product_id).is_none() {
        return Ok(Redirect::to("/cart"));
    }

    let available = CatalogRepository::new(state.pool())
        .get_product(form.product_id)
        .await?
        .map_or(0, |p| p.stock_quantity);

    match cart.increase(form.product_id, available) {
        Ok(()) => save_cart(&session, &cart).await?,
        Err(e) => set_flash(&session, Flash::error(e.to_string())).await,
    }
    Ok(Redirect::to("/cart"))
}

/// Decrease the quantity of a line, removing it at zero.
#[instrument(skip(session))]
pub async fn decrease(session: Session, Form(form): Form<ProductForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await;
    cart.decrease(form.product_id);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<ProductForm>) -> Result<Redirect> {
    let mut cart = load_cart(&session).await;
    cart.remove(form.product_id);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Cart badge count as plain text.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    load_cart(&session).await.count().to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use emporium_core::Money;
    use rust_decimal::Decimal;

    #[test]
    fn test_cart_view_formats_lines() {
        let mut cart = Cart::new();
        let price = Money::new(Decimal::new(12_50, 2));
        cart.add(ProductId::new(1), "Ajvar", price, 10).unwrap();
        cart.add(ProductId::new(1), "Ajvar", price, 10).unwrap();

        let view = CartView::new(&cart, CurrencyCode::Usd);
        assert_eq!(view.count, 2);
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].unit_price, "$12.50");
        assert_eq!(view.lines[0].line_total, "$25.00");
        assert_eq!(view.total, "$25.00");
    }

    #[test]
    fn test_cart_view_empty() {
        let view = CartView::new(&Cart::new(), CurrencyCode::Usd);
        assert!(view.lines.is_empty());
        assert_eq!(view.count, 0);
        assert_eq!(view.total, "$0.00");
    }
}
