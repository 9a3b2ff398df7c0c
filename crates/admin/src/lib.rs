//! Emporium Admin library.
//!
//! The back-office: dashboard, order handling, account roles and lockouts,
//! catalog and store management, and the audit log.
//!
//! # Security
//!
//! Every route outside `/auth` and `/health` requires a logged-in user
//! holding the Admin role. Role and lock changes are audited.

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
