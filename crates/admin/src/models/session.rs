//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use emporium_core::{Email, UserId};

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's user ID in the shop schema.
    pub id: UserId,
    /// Admin's email address.
    pub email: Email,
    /// Name shown in the sidebar, falls back to the email.
    pub name: String,
}

/// Session keys for admin state.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for one-shot flash messages.
    pub const FLASH: &str = "flash";
}
