//! Account administration: roles and lockouts.
//!
//! Every change here is written to the audit log. Requests that change
//! nothing are not.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use chrono::Utc;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{Email, UserId};

use super::Layout;
use crate::db::{RoleRemoval, UserRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Actor, Flash, RequireAdminAuth, set_flash};
use crate::models::{AuditAction, User, UserSummary, lockout_end};
use crate::services::AuditService;
use crate::state::AppState;

/// Row of the user list.
#[derive(Debug, Clone)]
pub struct UserRowView {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub created_at: String,
    pub is_admin: bool,
    pub is_locked: bool,
    pub is_self: bool,
}

impl UserRowView {
    fn new(user: &UserSummary, current: UserId) -> Self {
        Self {
            id: user.id.as_i32(),
            email: user.email.to_string(),
            full_name: user.full_name.clone().unwrap_or_default(),
            created_at: user.created_at.format("%Y-%m-%d").to_string(),
            is_admin: user.is_admin,
            is_locked: user.is_locked_at(Utc::now()),
            is_self: user.id == current,
        }
    }
}

/// User list template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersTemplate {
    pub layout: Layout,
    pub users: Vec<UserRowView>,
}

/// List all accounts.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<UsersTemplate> {
    let users = UserRepository::new(state.pool()).list().await?;

    Ok(UsersTemplate {
        layout: Layout::load(&session, &admin, "/users").await,
        users: users.iter().map(|u| UserRowView::new(u, admin.id)).collect(),
    })
}

async fn load_user(state: &AppState, id: UserId) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {id}")))
}

/// Grant the Admin role.
#[instrument(skip(state, session, actor), fields(admin_id = %actor.admin.id))]
pub async fn promote(
    State(state): State<AppState>,
    session: Session,
    actor: Actor,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    let user = load_user(&state, id).await?;
    let added = UserRepository::new(state.pool()).add_admin_role(id).await?;

    AuditService::new(state.pool())
        .record(
            &actor,
            AuditAction::UserPromoted,
            user.id,
            &user.email,
            Some(json!({ "alreadyAdmin": !added })),
        )
        .await;

    set_flash(
        &session,
        Flash::success(format!("User '{}' has been promoted to Admin.", user.email)),
    )
    .await;
    Ok(Redirect::to("/users"))
}

/// Revoke the Admin role, unless it is the last one.
#[instrument(skip(state, session, actor), fields(admin_id = %actor.admin.id))]
pub async fn demote(
    State(state): State<AppState>,
    session: Session,
    actor: Actor,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    let user = load_user(&state, id).await?;

    let outcome = UserRepository::new(state.pool())
        .remove_admin_role(id)
        .await?;

    if outcome == RoleRemoval::Removed {
        AuditService::new(state.pool())
            .record(
                &actor,
                AuditAction::UserDemoted,
                user.id,
                &user.email,
                Some(json!({ "wasAdmin": true })),
            )
            .await;
    }

    if let Some(flash) = demotion_flash(outcome, &user.email) {
        set_flash(&session, flash).await;
    }
    Ok(Redirect::to("/users"))
}

/// Flash for a demotion. A user who was never an admin gets none.
fn demotion_flash(outcome: RoleRemoval, email: &Email) -> Option<Flash> {
    match outcome {
        RoleRemoval::LastAdmin => Some(Flash::error("You cannot remove the last admin.")),
        RoleRemoval::Removed => Some(Flash::success(format!(
            "Admin role removed from '{email}'."
        ))),
        RoleRemoval::NotAdmin => None,
    }
}

/// Lock an account for [`LOCKOUT_YEARS`](crate::models::LOCKOUT_YEARS) years.
#[instrument(skip(state, session, actor), fields(admin_id = %actor.admin.id))]
pub async fn lock(
    State(state): State<AppState>,
    session: Session,
    actor: Actor,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    if id == actor.admin.id {
        set_flash(&session, Flash::error("You cannot lock your own account.")).await;
        return Ok(Redirect::to("/users"));
    }

    let user = load_user(&state, id).await?;
    let until = lockout_end(Utc::now());
    UserRepository::new(state.pool())
        .set_locked_until(id, Some(until))
        .await?;

    AuditService::new(state.pool())
        .record(
            &actor,
            AuditAction::UserLocked,
            user.id,
            &user.email,
            Some(json!({ "lockedUntil": until })),
        )
        .await;

    set_flash(
        &session,
        Flash::success(format!("User '{}' has been locked.", user.email)),
    )
    .await;
    Ok(Redirect::to("/users"))
}

/// Clear an account lock.
#[instrument(skip(state, session, actor), fields(admin_id = %actor.admin.id))]
pub async fn unlock(
    State(state): State<AppState>,
    session: Session,
    actor: Actor,
    Path(id): Path<UserId>,
) -> Result<Redirect> {
    let user = load_user(&state, id).await?;
    UserRepository::new(state.pool())
        .set_locked_until(id, None)
        .await?;

    AuditService::new(state.pool())
        .record(&actor, AuditAction::UserUnlocked, user.id, &user.email, None)
        .await;

    set_flash(
        &session,
        Flash::success(format!("User '{}' has been unlocked.", user.email)),
    )
    .await;
    Ok(Redirect::to("/users"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_view_flags() {
        let now = Utc::now();
        let summary = UserSummary {
            id: UserId::new(4),
            email: Email::parse("ana@emporium.mk").unwrap(),
            full_name: Some("Ana".to_string()),
            locked_until: Some(lockout_end(now)),
            created_at: now,
            is_admin: true,
        };

        let row = UserRowView::new(&summary, UserId::new(4));
        assert!(row.is_self);
        assert!(row.is_locked);
        assert!(row.is_admin);
        assert_eq!(row.email, "ana@emporium.mk");

        let other = UserRowView::new(&summary, UserId::new(1));
        assert!(!other.is_self);
    }

    #[test]
    fn test_demotion_flash() {
        let email = Email::parse("ana@emporium.mk").unwrap();
        assert_eq!(
            demotion_flash(RoleRemoval::Removed, &email),
            Some(Flash::success("Admin role removed from 'ana@emporium.mk'."))
        );
        assert_eq!(
            demotion_flash(RoleRemoval::LastAdmin, &email),
            Some(Flash::error("You cannot remove the last admin."))
        );
        assert_eq!(demotion_flash(RoleRemoval::NotAdmin, &email), None);
    }
}
