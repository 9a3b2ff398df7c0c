//! Audit log viewer.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::db::AuditRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::AuditEntry;
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct AuditRowView {
    pub created_at: String,
    pub actor: String,
    pub action: String,
    pub target: String,
    pub data: String,
    pub correlation_id: String,
}

impl From<&AuditEntry> for AuditRowView {
    fn from(entry: &AuditEntry) -> Self {
        Self {
            created_at: entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            actor: entry.actor_email.clone(),
            action: entry.action.clone(),
            target: entry.target_email.clone(),
            data: entry
                .data
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            correlation_id: entry.correlation_id.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "audit/index.html")]
pub struct AuditTemplate {
    pub layout: Layout,
    pub entries: Vec<AuditRowView>,
}

/// Latest audit entries, newest first.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<AuditTemplate> {
    let entries = AuditRepository::new(state.pool()).latest().await?;
    Ok(AuditTemplate {
        layout: Layout::load(&session, &admin, "/audit").await,
        entries: entries.iter().map(AuditRowView::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use emporium_core::{AuditLogId, UserId};
    use serde_json::json;

    #[test]
    fn test_row_view_renders_data_as_json() {
        let entry = AuditEntry {
            id: AuditLogId::new(1),
            actor_user_id: Some(UserId::new(1)),
            actor_email: "admin@emporium.mk".to_string(),
            action: "Admin.User.Locked".to_string(),
            target_user_id: Some(UserId::new(2)),
            target_email: "ana@emporium.mk".to_string(),
            data: Some(json!({"lockedUntil": "2126-01-01T00:00:00Z"})),
            correlation_id: None,
            created_at: Utc::now(),
        };
        let row = AuditRowView::from(&entry);
        assert_eq!(row.data, r#"{"lockedUntil":"2126-01-01T00:00:00Z"}"#);
        assert_eq!(row.correlation_id, "");
    }
}
