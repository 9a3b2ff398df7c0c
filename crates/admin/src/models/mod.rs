//! Domain models for the back-office.
//!
//! Row types derive `sqlx::FromRow` and are loaded with runtime-checked
//! `query_as` calls in [`crate::db`].

pub mod audit;
pub mod catalog;
pub mod dashboard;
pub mod order;
pub mod session;
pub mod store;
pub mod user;

pub use audit::{AuditAction, AuditEntry, NewAuditEntry};
pub use catalog::{Category, Product, ProductForm, ProductInput};
pub use dashboard::{BestSeller, Kpis, LowStockProduct, RecentCustomer};
pub use order::{
    HistoryEntry, Order, OrderFilter, OrderItem, OrderListQuery, PaymentTransaction, StatusChange,
};
pub use session::{CurrentAdmin, keys as session_keys};
pub use store::{Store, StoreInput};
pub use user::{LOCKOUT_YEARS, User, UserSummary, lockout_end};
