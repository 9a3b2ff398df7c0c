//! Store locations.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::{Store, StoreInput};

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

    /// Add a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &StoreInput) -> Result<Store, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            "INSERT INTO shop.store (name, location) VALUES ($1, $2) \
             RETURNING id, name, location, created_at",
        )
        .bind(&input.name)
        .bind(&input.location)
        .fetch_one(self.pool)
        .await?;
        Ok(store)
    }
}
