//! Cross-crate tests for Emporium.
//!
//! These run without a database or a server. They check that the storefront,
//! the back-office and the shared core agree on the rules they both rely on:
//!
//! - `status_lifecycle` - Order status transitions and how both apps show them
//! - `cart_checkout` - Session cart through shipping validation
//! - `payments` - Provider dispatch and the stub payment round trip
//!
//! ```bash
//! cargo test -p emporium-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use emporium_core::{Money, ProductId};
use rust_decimal::Decimal;

/// Money from a whole number of cents.
#[must_use]
pub fn cents(amount: i64) -> Money {
    Money::new(Decimal::new(amount, 2))
}

/// A product id for fixtures.
#[must_use]
pub const fn product(id: i32) -> ProductId {
    ProductId::new(id)
}
