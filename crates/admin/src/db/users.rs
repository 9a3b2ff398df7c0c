//! Account administration: roles and lockouts.
//!
//! Accounts live in the storefront's `shop` schema. The back-office reads
//! them, grants or revokes the Admin role and sets lockouts.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use emporium_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::{User, UserSummary};

const USER_COLUMNS: &str = "id, email, full_name, locked_until, created_at";

/// Outcome of removing the Admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRemoval {
    /// The role was removed.
    Removed,
    /// The user did not have the role.
    NotAdmin,
    /// The user is the only admin left; nothing was changed.
    LastAdmin,
}

/// Repository for account administration.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All accounts with their admin flag, by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<UserSummary>, RepositoryError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT u.id, u.email, u.full_name, u.locked_until, u.created_at, \
             EXISTS (SELECT 1 FROM shop.user_role r WHERE r.user_id = u.id AND r.role = $1) \
             AS is_admin \
             FROM shop.user u ORDER BY u.email",
        )
        .bind(Role::Admin)
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM shop.user WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM shop.user WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get the stored password hash for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM shop.user_password WHERE user_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(hash)
    }

    /// Whether the user holds the Admin role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_admin(&self, id: UserId) -> Result<bool, RepositoryError> {
        let is_admin = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM shop.user_role WHERE user_id = $1 AND role = $2)",
        )
        .bind(id)
        .bind(Role::Admin)
        .fetch_one(self.pool)
        .await?;
        Ok(is_admin)
    }

    /// Grant the Admin role. Returns `false` if the user already had it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_admin_role(&self, id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO shop.user_role (user_id, role) VALUES ($1, $2) \
             ON CONFLICT (user_id, role) DO NOTHING",
        )
        .bind(id)
        .bind(Role::Admin)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke the Admin role unless the user is the last admin.
    ///
    /// Admin role rows are locked while counting so two concurrent demotions
    /// cannot leave the shop without an admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails.
    pub async fn remove_admin_role(&self, id: UserId) -> Result<RoleRemoval, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let admins: Vec<UserId> = sqlx::query_scalar(
            "SELECT user_id FROM shop.user_role WHERE role = $1 FOR UPDATE",
        )
        .bind(Role::Admin)
        .fetch_all(&mut *tx)
        .await?;

        let outcome = removal_outcome(&admins, id);
        if outcome == RoleRemoval::Removed {
            sqlx::query("DELETE FROM shop.user_role WHERE user_id = $1 AND role = $2")
                .bind(id)
                .bind(Role::Admin)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(outcome)
    }

    /// Set or clear the lockout end.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_locked_until(
        &self,
        id: UserId,
        locked_until: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.user SET locked_until = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(locked_until)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Create an account with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already registered.
    pub async fn create_with_password(
        &self,
        email: &Email,
        full_name: Option<&str>,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO shop.user (email, full_name) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(full_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        sqlx::query("INSERT INTO shop.user_password (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }
}

/// Decide a demotion given the current admins.
fn removal_outcome(admins: &[UserId], id: UserId) -> RoleRemoval {
    if !admins.contains(&id) {
        RoleRemoval::NotAdmin
    } else if admins.len() <= 1 {
        RoleRemoval::LastAdmin
    } else {
        RoleRemoval::Removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_outcome() {
        let one = UserId::new(1);
        let two = UserId::new(2);
        assert_eq!(removal_outcome(&[one], one), RoleRemoval::LastAdmin);
        assert_eq!(removal_outcome(&[one, two], one), RoleRemoval::Removed);
        assert_eq!(removal_outcome(&[one], two), RoleRemoval::NotAdmin);
        assert_eq!(removal_outcome(&[], two), RoleRemoval::NotAdmin);
    }
}
