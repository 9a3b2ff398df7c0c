//! Store location reads.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Store;

/// Repository for store locations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All stores ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Store>, RepositoryError> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT id, name, location, created_at FROM shop.store ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(stores)
    }
}
