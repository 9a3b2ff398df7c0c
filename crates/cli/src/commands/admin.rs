//! Admin account commands.
//!
//! Admins are shop accounts holding the Admin role, so these commands write
//! to the `shop` schema through the back-office repositories.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)

use emporium_admin::db::{self, RepositoryError, UserRepository};
use emporium_admin::services::{AdminAuthError, hash_password};
use emporium_core::{Email, UserId};
use thiserror::Error;

use super::database_url;

/// Shortest password accepted for a new admin, matching shop registration.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(#[from] AdminAuthError),

    /// No account with this email.
    #[error("No account with email: {0}")]
    UserNotFound(String),
}

fn parse_email(email: &str) -> Result<Email, AdminError> {
    Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))
}

/// Create an admin account if missing, then make sure it holds the Admin role.
///
/// An existing account keeps its password.
///
/// # Errors
///
/// Returns an error for an invalid email or short password, or if a
/// database operation fails.
pub async fn create(email: &str, password: &str, name: Option<&str>) -> Result<UserId, AdminError> {
    let email = parse_email(email)?;
    let url = database_url("ADMIN_DATABASE_URL").map_err(AdminError::MissingEnvVar)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&url).await?;
    let users = UserRepository::new(&pool);

    let user = match users.get_by_email(&email).await? {
        Some(user) => {
            tracing::info!(user_id = %user.id, "Account exists, keeping its password");
            user
        }
        None => {
            if password.chars().count() < MIN_PASSWORD_LENGTH {
                return Err(AdminError::WeakPassword);
            }
            let hash = hash_password(password)?;
            let name = name.map(str::trim).filter(|n| !n.is_empty());
            let user = users.create_with_password(&email, name, &hash).await?;
            tracing::info!(user_id = %user.id, "Account created");
            user
        }
    };

    if users.add_admin_role(user.id).await? {
        tracing::info!("Admin role granted to {}", email);
    } else {
        tracing::info!("{} already holds the Admin role", email);
    }

    Ok(user.id)
}

/// Grant the Admin role to an existing account.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if no account has this email.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let email = parse_email(email)?;
    let url = database_url("ADMIN_DATABASE_URL").map_err(AdminError::MissingEnvVar)?;

    let pool = db::create_pool(&url).await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_string()))?;

    if users.add_admin_role(user.id).await? {
        tracing::info!(user_id = %user.id, "Promoted {} to Admin", email);
    } else {
        tracing::info!(user_id = %user.id, "{} is already an Admin", email);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_rejects_garbage() {
        assert!(matches!(
            parse_email("not-an-email"),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(parse_email("admin@emporium.mk").is_ok());
    }
}
