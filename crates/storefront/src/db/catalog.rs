//! Catalog queries.

use sqlx::{PgPool, Postgres, QueryBuilder};

use emporium_core::ProductId;

use super::RepositoryError;
use crate::models::catalog::{PAGE_SIZE, like_pattern};
use crate::models::{Category, Product, ProductFilter, ProductPage};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.stock_quantity, \
     p.category_id, c.name AS category_name, p.image_url, p.created_at";

/// Repository for catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
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

    /// One page of non-deleted products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn search_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<ProductPage, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM shop.product p LEFT JOIN shop.category c ON c.id = p.category_id",
        );
        push_filter(&mut count, filter);
        let total_count: i64 = count.build_query_scalar().fetch_one(self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT ");
        select.push(PRODUCT_COLUMNS);
        select.push(" FROM shop.product p LEFT JOIN shop.category c ON c.id = p.category_id");
        push_filter(&mut select, filter);
        select.push(filter.sort.order_by());
        select.push(" LIMIT ").push_bind(PAGE_SIZE);
        select.push(" OFFSET ").push_bind(filter.offset());

        let products = select
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok(ProductPage {
            products,
            page: filter.page,
            total_count,
        })
    }

    /// A single non-deleted product with its category name.
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
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    builder.push(" WHERE NOT p.is_deleted");
    if let Some(category_id) = filter.category_id {
        builder.push(" AND p.category_id = ").push_bind(category_id);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (p.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
