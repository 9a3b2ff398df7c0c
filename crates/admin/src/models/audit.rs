//! Audit log of privileged user actions.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use emporium_core::{AuditLogId, UserId};

/// Audited back-office actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserPromoted,
    UserDemoted,
    UserLocked,
    UserUnlocked,
}

impl AuditAction {
    /// Action name stored in `admin.audit_log.action`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserPromoted => "Admin.User.Promoted",
            Self::UserDemoted => "Admin.User.Demoted",
            Self::UserLocked => "Admin.User.Locked",
            Self::UserUnlocked => "Admin.User.Unlocked",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored audit entry.
#[derive(Debug, Clone, FromRow)]
pub struct AuditEntry {
    pub id: AuditLogId,
    pub actor_user_id: Option<UserId>,
    pub actor_email: String,
    pub action: String,
    pub target_user_id: Option<UserId>,
    pub target_email: String,
    pub data: Option<serde_json::Value>,
    pub correlation_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An audit entry about to be written.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub actor_user_id: Option<UserId>,
    pub actor_email: String,
    pub action: AuditAction,
    pub target_user_id: Option<UserId>,
    pub target_email: String,
    pub data: Option<serde_json::Value>,
    pub correlation_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(AuditAction::UserPromoted.to_string(), "Admin.User.Promoted");
        assert_eq!(AuditAction::UserDemoted.as_str(), "Admin.User.Demoted");
        assert_eq!(AuditAction::UserLocked.as_str(), "Admin.User.Locked");
        assert_eq!(AuditAction::UserUnlocked.as_str(), "Admin.User.Unlocked");
    }
}
