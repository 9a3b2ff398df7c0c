//! User domain types.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use emporium_core::{Email, UserId};

/// A shop account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account is locked at `now`.
    #[must_use]
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Full name when set, otherwise the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| self.email.to_string(), str::to_owned)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(full_name: Option<&str>, locked_until: Option<DateTime<Utc>>) -> User {
        User {
            id: UserId::new(1),
            email: Email::parse("kupuvac@emporium.mk").unwrap(),
            full_name: full_name.map(String::from),
            locked_until,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_is_locked_at() {
        let now = Utc::now();
        assert!(!user(None, None).is_locked_at(now));
        assert!(user(None, Some(now + Duration::days(1))).is_locked_at(now));
        assert!(!user(None, Some(now - Duration::minutes(1))).is_locked_at(now));
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(user(Some("Ana K."), None).display_name(), "Ana K.");
        assert_eq!(user(Some("  "), None).display_name(), "kupuvac@emporium.mk");
        assert_eq!(user(None, None).display_name(), "kupuvac@emporium.mk");
    }
}
