//! Session-related types.
//!
//! Types stored in the session for authentication and shopping state.

use serde::{Deserialize, Serialize};

use emporium_core::{Email, UserId};

/// Session-stored user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Name shown in the header, falls back to the email.
    pub display_name: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopping cart (JSON list of cart lines).
    pub const CART: &str = "cart";

    /// Orders placed from this session, so guests can see their own success page.
    pub const PLACED_ORDERS: &str = "placed_orders";

    /// Key for one-shot flash messages.
    pub const FLASH: &str = "flash";
}
