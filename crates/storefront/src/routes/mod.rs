//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Catalog (same as /shop)
//! GET  /shop                      - Catalog with category, search, sort, paging
//! GET  /products/{id}             - Product detail
//!
//! # Cart (session)
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add one unit of a product
//! POST /cart/increase             - Increase quantity
//! POST /cart/decrease             - Decrease quantity (removes at zero)
//! POST /cart/remove               - Remove a line
//! GET  /cart/count                - Badge count (plain text)
//!
//! # Checkout & payment
//! GET  /checkout                  - Shipping form
//! POST /checkout                  - Place order
//! GET  /checkout/success/{id}     - Order placed
//! POST /payment/start/{id}        - Redirect to the provider
//! GET  /payment/callback          - Provider callback
//!
//! # Auth (rate limited)
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action
//! POST /auth/logout               - Logout action
//!
//! # Account (requires auth)
//! GET  /account/orders            - Order history
//! GET  /account/orders/{id}       - Order detail with status history
//! GET  /account/profile           - Profile form
//! POST /account/profile           - Update profile
//!
//! GET  /stores                    - Store locations
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod payment;
pub mod shop;
pub mod stores;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::middleware::{Flash, auth_rate_limiter, take_flash};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Data every full page needs for the shared layout.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user_name: Option<String>,
    pub flash: Option<Flash>,
    pub cart_count: i32,
}

impl Layout {
    /// Build the layout, consuming the pending flash message.
    pub async fn load(session: &Session, user: Option<&CurrentUser>) -> Self {
        Self {
            user_name: user.map(|u| u.display_name.clone()),
            flash: take_flash(session).await,
            cart_count: cart::load_cart(session).await.count(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/success/{id}", get(checkout::success))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/start/{id}", post(payment::start))
        .route("/callback", get(payment::callback))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
        .route(
            "/profile",
            get(account::profile_page).post(account::update_profile),
        )
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .route("/shop", get(shop::index))
        .route("/products/{id}", get(shop::product))
        .route("/stores", get(stores::index))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .nest("/payment", payment_routes())
        .nest("/account", account_routes())
        .nest("/auth", auth_routes())
}
