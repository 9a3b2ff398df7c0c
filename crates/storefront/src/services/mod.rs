//! Business logic services for the storefront.
//!
//! - `auth` - Password registration, login and profile updates
//! - `email` - Order confirmation emails
//! - `payments` - Payment-provider dispatch

pub mod auth;
pub mod email;
pub mod payments;

pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService};
pub use payments::{
    PaymentError, PaymentProvider, PaymentRequest, PaymentResult, PaymentService, StubProvider,
};
