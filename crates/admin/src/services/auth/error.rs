//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Wrong email or password, or no such account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The password is right but the account lacks the Admin role.
    #[error("not an admin")]
    NotAdmin,

    /// The account is locked.
    #[error("account locked")]
    Locked,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl AdminAuthError {
    /// Message safe to show on the login form.
    ///
    /// A missing role reads like bad credentials so the form does not reveal
    /// which shop accounts exist.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials | Self::NotAdmin => "Invalid email or password.",
            Self::Locked => "This account is locked.",
            Self::PasswordHash | Self::Repository(_) => "Something went wrong. Please try again.",
        }
    }
}
