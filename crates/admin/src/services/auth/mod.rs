//! Password login for the back-office.
//!
//! Admins are ordinary shop accounts holding the Admin role. The password
//! must verify, the role must be present and the account must not be locked.

mod error;

pub use error::AdminAuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sqlx::PgPool;

use emporium_core::Email;

use crate::db::UserRepository;
use crate::models::User;

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Check an admin's email and password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for an unknown email or wrong password.
    /// Returns `AdminAuthError::NotAdmin` if the account lacks the Admin role.
    /// Returns `AdminAuthError::Locked` if the account is locked.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;
        let password_hash = self
            .users
            .get_password_hash(user.id)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !self.users.is_admin(user.id).await? {
            tracing::warn!(user_id = %user.id, "Admin login refused: missing Admin role");
            return Err(AdminAuthError::NotAdmin);
        }
        if user.is_locked_at(Utc::now()) {
            tracing::warn!(user_id = %user.id, "Admin login refused: account locked");
            return Err(AdminAuthError::Locked);
        }

        Ok(user)
    }
}

/// Hash a password with Argon2id, as the storefront does at registration.
///
/// # Errors
///
/// Returns `AdminAuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AdminAuthError::PasswordHash)
}

/// Verify a password against a PHC hash string.
fn verify_password(password: &str, hash: &str) -> Result<(), AdminAuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminAuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AdminAuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_password() {
        let hash = hash_password("admin password").unwrap();
        assert!(verify_password("admin password", &hash).is_ok());
        assert!(matches!(
            verify_password("guess", &hash),
            Err(AdminAuthError::InvalidCredentials)
        ));
        assert!(verify_password("anything", "garbage").is_err());
    }

    #[test]
    fn test_not_admin_reads_like_bad_credentials() {
        assert_eq!(
            AdminAuthError::NotAdmin.user_message(),
            AdminAuthError::InvalidCredentials.user_message()
        );
    }
}
