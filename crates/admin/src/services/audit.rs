//! Audit trail for privileged user actions.
//!
//! Writes never fail the request: a broken insert is logged and dropped.

use serde_json::Value;
use sqlx::PgPool;

use emporium_core::{Email, UserId};

use crate::db::AuditRepository;
use crate::middleware::Actor;
use crate::models::{AuditAction, NewAuditEntry};

/// Records audit entries on behalf of the acting admin.
pub struct AuditService<'a> {
    repo: AuditRepository<'a>,
}

impl<'a> AuditService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            repo: AuditRepository::new(pool),
        }
    }

    /// Record `action` against the target user.
    pub async fn record(
        &self,
        actor: &Actor,
        action: AuditAction,
        target_user_id: UserId,
        target_email: &Email,
        data: Option<Value>,
    ) {
        let entry = entry_for(actor, action, target_user_id, target_email, data);
        if let Err(e) = self.repo.insert(&entry).await {
            tracing::warn!(
                error = %e,
                action = %action,
                target_user_id = %target_user_id,
                "Failed to write audit entry"
            );
        }
    }
}

fn entry_for(
    actor: &Actor,
    action: AuditAction,
    target_user_id: UserId,
    target_email: &Email,
    data: Option<Value>,
) -> NewAuditEntry {
    NewAuditEntry {
        actor_user_id: Some(actor.admin.id),
        actor_email: actor.admin.email.to_string(),
        action,
        target_user_id: Some(target_user_id),
        target_email: target_email.to_string(),
        data,
        correlation_id: actor.request_id.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::CurrentAdmin;

    #[test]
    fn test_entry_carries_actor_and_correlation_id() {
        let actor = Actor {
            admin: CurrentAdmin {
                id: UserId::new(1),
                email: Email::parse("admin@emporium.mk").unwrap(),
                name: "Admin".to_string(),
            },
            request_id: Some("req-123".to_string()),
        };
        let target = Email::parse("kupuvac@emporium.mk").unwrap();
        let entry = entry_for(
            &actor,
            AuditAction::UserLocked,
            UserId::new(7),
            &target,
            Some(serde_json::json!({"years": 100})),
        );
        assert_eq!(entry.actor_user_id, Some(UserId::new(1)));
        assert_eq!(entry.actor_email, "admin@emporium.mk");
        assert_eq!(entry.action, AuditAction::UserLocked);
        assert_eq!(entry.target_user_id, Some(UserId::new(7)));
        assert_eq!(entry.target_email, "kupuvac@emporium.mk");
        assert_eq!(entry.correlation_id.as_deref(), Some("req-123"));
    }
}
