//! Product and category management.

use sqlx::PgPool;

use emporium_core::ProductId;

use super::RepositoryError;
use crate::models::{Category, Product, ProductInput};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.stock_quantity, \
     p.category_id, c.name AS category_name, p.image_url, p.created_at";

/// Repository for catalog management.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All non-deleted products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p \
             LEFT JOIN shop.category c ON c.id = p.category_id \
             WHERE NOT p.is_deleted ORDER BY p.created_at DESC, p.id DESC"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(products)
    }

    /// A non-deleted product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.product p \
             LEFT JOIN shop.category c ON c.id = p.category_id \
             WHERE p.id = $1 AND NOT p.is_deleted"
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(product)
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails, for example
    /// when the category no longer exists.
    pub async fn create_product(
        &self,
        input: &ProductInput,
        image_url: Option<&str>,
    ) -> Result<ProductId, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            "INSERT INTO shop.product \
             (name, description, price, stock_quantity, category_id, image_url) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(input.category_id)
        .bind(image_url)
        .fetch_one(self.pool)
        .await?;

        tracing::info!(product_id = %id, "Product created");
        Ok(id)
    }

    /// Update a product. A `None` image keeps the current one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or deleted.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
        image_url: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.product SET name = $2, description = $3, price = $4, \
             stock_quantity = $5, category_id = $6, image_url = COALESCE($7, image_url) \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.stock_quantity)
        .bind(input.category_id)
        .bind(image_url)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Soft delete a product. Order lines keep their copy of the name and price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is missing or already deleted.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.product SET is_deleted = TRUE WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM shop.category ORDER BY name")
                .fetch_all(self.pool)
                .await?;
        Ok(categories)
    }

    /// Add a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a category with this name exists.
    pub async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO shop.category (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category name already exists"))
    }
}
