//! Shop accounts as managed from the back-office.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use emporium_core::{Email, UserId};

/// Lockouts set from the back-office last this long.
pub const LOCKOUT_YEARS: i32 = 100;

/// A shop account.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
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

/// A row of the user list: the account plus whether it holds the Admin role.
#[derive(Debug, Clone, FromRow)]
pub struct UserSummary {
    pub id: UserId,
    pub email: Email,
    pub full_name: Option<String>,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_admin: bool,
}

impl UserSummary {
    #[must_use]
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }
}

/// When a lock applied at `now` ends.
#[must_use]
pub fn lockout_end(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(chrono::Months::new(12 * LOCKOUT_YEARS.unsigned_abs()))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    #[test]
    fn test_lockout_end_is_a_century_away() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let end = lockout_end(now);
        assert_eq!(end.year(), 2126);
        assert_eq!(end.month(), 5);
    }

    #[test]
    fn test_summary_lock_state() {
        let now = Utc::now();
        let summary = UserSummary {
            id: UserId::new(3),
            email: Email::parse("kupuvac@emporium.mk").unwrap(),
            full_name: None,
            locked_until: Some(lockout_end(now)),
            created_at: now,
            is_admin: false,
        };
        assert!(summary.is_locked_at(now));
        assert!(!UserSummary { locked_until: None, ..summary }.is_locked_at(now));
    }
}
