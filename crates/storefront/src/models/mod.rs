//! Domain models for the storefront.
//!
//! Row types derive `sqlx::FromRow` and are loaded with runtime-checked
//! `query_as` calls in [`crate::db`].

pub mod catalog;
pub mod order;
pub mod session;
pub mod store;
pub mod user;

pub use catalog::{Category, Product, ProductFilter, ProductPage, ProductSort};
pub use order::{Order, OrderItem, PaymentRecord, StatusHistoryEntry};
pub use session::{CurrentUser, keys as session_keys};
pub use store::Store;
pub use user::User;
