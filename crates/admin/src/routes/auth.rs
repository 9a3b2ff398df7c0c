//! Admin login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::{AdminAuthError, AdminAuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<&'static str>,
}

/// Display the login page.
#[instrument(skip(admin))]
pub async fn login_page(OptionalAdminAuth(admin): OptionalAdminAuth) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        email: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match AdminAuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let admin = CurrentAdmin {
                id: user.id,
                name: user.display_name(),
                email: user.email,
            };
            set_current_admin(&session, &admin).await?;
            set_sentry_user(&admin.id, Some(admin.email.as_str()));
            tracing::info!(user_id = %admin.id, "Admin logged in");
            Ok(Redirect::to("/").into_response())
        }
        Err(e @ (AdminAuthError::InvalidCredentials
        | AdminAuthError::NotAdmin
        | AdminAuthError::Locked)) => {
            tracing::warn!(error = %e, "Admin login failed");
            Ok(LoginTemplate {
                email: form.email,
                error: Some(e.user_message()),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login"))
}
