//! Business logic services for the back-office.
//!
//! - `audit` - Audit trail of privileged user actions
//! - `auth` - Password login restricted to unlocked admins
//! - `email` - Order status notifications

pub mod audit;
pub mod auth;
pub mod email;

pub use audit::AuditService;
pub use auth::{AdminAuthError, AdminAuthService, hash_password};
pub use email::{EmailError, EmailService};
