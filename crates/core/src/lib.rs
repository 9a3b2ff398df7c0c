//! Emporium Core - Shared domain library.
//!
//! This crate provides the types and rules shared by every Emporium component:
//! - `storefront` - Public shop (catalog, cart, checkout, payments, accounts)
//! - `admin` - Back-office (dashboard, orders, users, catalog management)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure business rules - no I/O, no
//! database access, no HTTP. Everything here is deterministic and unit tested.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money, order status and roles
//! - [`cart`] - Session cart operations
//! - [`checkout`] - Shipping detail validation and order numbers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod types;

pub use cart::{Cart, CartError, CartItem};
pub use checkout::{FieldError, ShippingDetails, ShippingForm, order_number};
pub use types::*;
