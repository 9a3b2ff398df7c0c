//! Order status lifecycle and user roles.
//!
//! ```text
//!            ┌──────────► Cancelled
//!            │                ▲
//! Pending ───┴─► Processing ──┤
//!                    │        │
//! Paid ──────────────┼────────┘
//!   │                ▼
//!   └──────────► Shipped ───► Completed
//!                    │
//!                    └──────► Refunded
//! ```
//!
//! `Completed`, `Cancelled` and `Refunded` are terminal. Staying in the same
//! status is always permitted and is treated as a no-op by callers.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "snake_case")
)]
pub enum OrderStatus {
    /// Placed, awaiting payment or processing.
    #[default]
    Pending,
    /// Payment confirmed by a provider.
    Paid,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Delivered.
    Completed,
    /// Cancelled before shipping.
    Cancelled,
    /// Money returned after shipping.
    Refunded,
}

/// Error returned when a status string or code is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid order status: {0}")]
pub struct InvalidStatus(pub String);

impl OrderStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Paid,
        Self::Processing,
        Self::Shipped,
        Self::Completed,
        Self::Cancelled,
        Self::Refunded,
    ];

    /// Stable numeric code (0-6), accepted by [`FromStr`].
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Paid => 1,
            Self::Processing => 2,
            Self::Shipped => 3,
            Self::Completed => 4,
            Self::Cancelled => 5,
            Self::Refunded => 6,
        }
    }

    /// Status for a numeric code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Pending),
            1 => Some(Self::Paid),
            2 => Some(Self::Processing),
            3 => Some(Self::Shipped),
            4 => Some(Self::Completed),
            5 => Some(Self::Cancelled),
            6 => Some(Self::Refunded),
            _ => None,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Refunded => "Refunded",
        }
    }

    /// Statuses reachable from this one, excluding itself.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Completed, Self::Refunded],
            Self::Paid => &[Self::Processing, Self::Shipped, Self::Cancelled],
            Self::Completed | Self::Cancelled | Self::Refunded => &[],
        }
    }

    /// Whether a manual change from `self` to `to` is permitted.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self == to || self.allowed_transitions().contains(&to)
    }

    /// No further manual changes are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Whether the order total counts toward revenue figures.
    #[must_use]
    pub const fn counts_as_revenue(self) -> bool {
        !matches!(self, Self::Cancelled | Self::Refunded)
    }

    /// CSS badge class used by both apps.
    #[must_use]
    pub const fn badge_class(self) -> &'static str {
        match self {
            Self::Pending => "badge badge-pending",
            Self::Paid => "badge badge-paid",
            Self::Processing => "badge badge-processing",
            Self::Shipped => "badge badge-shipped",
            Self::Completed => "badge badge-completed",
            Self::Cancelled | Self::Refunded => "badge badge-closed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    /// Parses a status name (any case) or its numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u8>() {
            return Self::from_code(code).ok_or_else(|| InvalidStatus(s.to_owned()));
        }
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidStatus(s.to_owned()))
    }
}

/// Role granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Access to the back-office.
    Admin,
}

impl Role {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("admin") {
            Ok(Self::Admin)
        } else {
            Err(format!("invalid role: {s}"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use OrderStatus::{Cancelled, Completed, Paid, Pending, Processing, Refunded, Shipped};

    #[test]
    fn test_same_status_is_always_allowed() {
        for status in OrderStatus::ALL {
            assert!(status.can_transition_to(status), "{status} -> {status}");
        }
    }

    #[test]
    fn test_allowed_transition_table() {
        let allowed = [
            (Pending, Processing),
            (Pending, Cancelled),
            (Processing, Shipped),
            (Processing, Cancelled),
            (Shipped, Completed),
            (Shipped, Refunded),
            (Paid, Processing),
            (Paid, Shipped),
            (Paid, Cancelled),
        ];

        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = from == to || allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "{from} -> {to} should be {expected}"
                );
            }
        }
    }

    #[test]
    fn test_manual_paid_is_not_reachable_from_pending() {
        // Only payment callbacks move an order to Paid.
        assert!(!Pending.can_transition_to(Paid));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(Completed.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(Refunded.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!Paid.is_terminal());
        assert!(!Shipped.is_terminal());
    }

    #[test]
    fn test_counts_as_revenue() {
        assert!(Pending.counts_as_revenue());
        assert!(Completed.counts_as_revenue());
        assert!(!Cancelled.counts_as_revenue());
        assert!(!Refunded.counts_as_revenue());
    }

    #[test]
    fn test_parse_names_and_codes() {
        assert_eq!("shipped".parse::<OrderStatus>().unwrap(), Shipped);
        assert_eq!("PAID".parse::<OrderStatus>().unwrap(), Paid);
        assert_eq!("6".parse::<OrderStatus>().unwrap(), Refunded);
        assert_eq!(" 0 ".parse::<OrderStatus>().unwrap(), Pending);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("7".parse::<OrderStatus>().is_err());
        assert!("lost".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_codes_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_code(status.code()), Some(status));
        }
    }

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Admin.label(), "Admin");
        assert!("owner".parse::<Role>().is_err());
    }
}
