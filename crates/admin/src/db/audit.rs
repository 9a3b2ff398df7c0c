//! Audit log storage.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{AuditEntry, NewAuditEntry};

/// Entries shown on the audit page.
pub const AUDIT_PAGE_SIZE: i64 = 100;

/// Repository for `admin.audit_log`.
pub struct AuditRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AuditRepository<'a> {
    /// Create a new audit repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, entry: &NewAuditEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO admin.audit_log \
             (actor_user_id, actor_email, action, target_user_id, target_email, data, \
              correlation_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.actor_user_id)
        .bind(&entry.actor_email)
        .bind(entry.action.as_str())
        .bind(entry.target_user_id)
        .bind(&entry.target_email)
        .bind(&entry.data)
        .bind(&entry.correlation_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// The most recent entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self) -> Result<Vec<AuditEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            "SELECT id, actor_user_id, actor_email, action, target_user_id, target_email, \
             data, correlation_id, created_at \
             FROM admin.audit_log ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(AUDIT_PAGE_SIZE)
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }
}
