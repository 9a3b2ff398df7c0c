//! Emporium Storefront library.
//!
//! The public shop: catalog, session cart, checkout, stub payments and
//! customer accounts. Exposed as a library so the binary stays thin and the
//! integration tests can reach the services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
