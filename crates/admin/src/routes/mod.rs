//! HTTP route handlers for the back-office.
//!
//! Everything except `/auth` requires a logged-in admin.

pub mod audit;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod stores;
pub mod users;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::middleware::{Flash, auth_rate_limiter, take_flash};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Data every admin page needs for the sidebar and flash message.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub admin_name: String,
    pub current_path: &'static str,
    pub flash: Option<Flash>,
}

impl Layout {
    /// Build the layout and consume any pending flash message.
    pub async fn load(session: &Session, admin: &CurrentAdmin, current_path: &'static str) -> Self {
        Self {
            admin_name: admin.name.clone(),
            current_path,
            flash: take_flash(session).await,
        }
    }

    /// CSS class for a sidebar link.
    #[must_use]
    pub fn nav_class(&self, section: &str) -> &'static str {
        let active = if section == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(section)
        };
        if active { "nav-link active" } else { "nav-link" }
    }
}

/// Build the auth router. Login is rate limited per client IP.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Build the order management router.
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
}

/// Build the user management router.
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index))
        .route("/{id}/promote", post(users::promote))
        .route("/{id}/demote", post(users::demote))
        .route("/{id}/lock", post(users::lock))
        .route("/{id}/unlock", post(users::unlock))
}

/// Largest accepted product form, image included.
const PRODUCT_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// Build the product management router.
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/new", get(products::new_page).post(products::create))
        .route("/{id}/edit", get(products::edit_page).post(products::update))
        .route("/{id}/delete", post(products::delete))
        .layer(DefaultBodyLimit::max(PRODUCT_UPLOAD_LIMIT))
}

/// Build the complete back-office router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes())
        .route("/api/orders/status", post(orders::api_update_status))
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .route("/categories", get(categories::index).post(categories::create))
        .route("/stores", get(stores::index).post(stores::create))
        .route("/audit", get(audit::index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(path: &'static str) -> Layout {
        Layout {
            current_path: path,
            ..Layout::default()
        }
    }

    #[test]
    fn test_nav_class_marks_section() {
        assert_eq!(layout("/orders").nav_class("/orders"), "nav-link active");
        assert_eq!(layout("/orders").nav_class("/users"), "nav-link");
        assert_eq!(layout("/").nav_class("/"), "nav-link active");
        assert_eq!(layout("/audit").nav_class("/"), "nav-link");
    }
}
