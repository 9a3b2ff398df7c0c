//! Authentication route handlers.
//!
//! Email and password accounts stored in the shop database. Logging in keeps
//! the session cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    Flash, OptionalAuth, clear_current_user, set_current_user, set_flash,
};
use crate::models::{CurrentUser, User};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub return_url: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub full_name: Option<String>,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub return_url: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub email: String,
    pub return_url: String,
    pub error: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub layout: Layout,
    pub email: String,
    pub full_name: String,
    pub error: Option<String>,
}

/// Only same-site paths are followed after login.
fn safe_return_url(return_url: Option<&str>) -> &str {
    match return_url {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => url,
        _ => "/",
    }
}

async fn sign_in(session: &Session, user: &User) -> Result<()> {
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        display_name: user.display_name(),
    };
    set_current_user(session, &current).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(session, user))]
pub async fn login_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<LoginQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        layout: Layout::load(&session, None).await,
        email: String::new(),
        return_url: safe_return_url(query.return_url.as_deref()).to_string(),
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
    let return_url = safe_return_url(form.return_url.as_deref()).to_string();

    match AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            sign_in(&session, &user).await?;
            tracing::info!(user_id = %user.id, "User logged in");
            Ok(Redirect::to(&return_url).into_response())
        }
        Err(e @ (AuthError::InvalidCredentials | AuthError::Locked)) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                layout: Layout::load(&session, None).await,
                email: form.email,
                return_url,
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
    clear_current_user(&session).await?;
    clear_sentry_user();
    set_flash(&session, Flash::success("You have been logged out.")).await;
    Ok(Redirect::to("/"))
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(session, user))]
pub async fn register_page(session: Session, OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    RegisterTemplate {
        layout: Layout::load(&session, None).await,
        email: String::new(),
        full_name: String::new(),
        error: None,
    }
    .into_response()
}

/// Handle registration form submission and log the new user in.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    if form.password != form.password_confirm {
        return Ok(register_error(&session, &form, "Passwords do not match.".to_string()).await);
    }

    match AuthService::new(state.pool())
        .register_with_password(&form.email, form.full_name.as_deref(), &form.password)
        .await
    {
        Ok(user) => {
            sign_in(&session, &user).await?;
            set_flash(&session, Flash::success("Welcome! Your account has been created.")).await;
            Ok(Redirect::to("/").into_response())
        }
        Err(
            e @ (AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::UserAlreadyExists),
        ) => Ok(register_error(&session, &form, e.user_message()).await),
        Err(e) => Err(e.into()),
    }
}

async fn register_error(session: &Session, form: &RegisterForm, error: String) -> Response {
    RegisterTemplate {
        layout: Layout::load(session, None).await,
        email: form.email.clone(),
        full_name: form.full_name.clone().unwrap_or_default(),
        error: Some(error),
    }
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_return_url() {
        assert_eq!(safe_return_url(Some("/account/orders")), "/account/orders");
        assert_eq!(safe_return_url(Some("//evil.example")), "/");
        assert_eq!(safe_return_url(Some("https://evil.example")), "/");
        assert_eq!(safe_return_url(Some("/\\evil.example")), "/");
        assert_eq!(safe_return_url(None), "/");
    }
}
