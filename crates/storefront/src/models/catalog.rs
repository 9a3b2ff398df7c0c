//! Catalog types: categories, products and the listing query.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;

use emporium_core::{CategoryId, Money, ProductId};

/// Products per catalog page.
pub const PAGE_SIZE: i64 = 12;

/// A product category.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A product joined with its category name.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// Catalog sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    Name,
    NameDesc,
    PriceAsc,
    PriceDesc,
    #[default]
    Newest,
}

impl ProductSort {
    /// Parse the `sort` query value. Unknown values fall back to newest first.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => Self::Name,
            Some("name_desc") => Self::NameDesc,
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            _ => Self::Newest,
        }
    }

    /// Query-string value for links.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::NameDesc => "name_desc",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
        }
    }

    /// `ORDER BY` clause. The id tiebreaker keeps paging stable.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Name => " ORDER BY p.name ASC, p.id ASC",
            Self::NameDesc => " ORDER BY p.name DESC, p.id DESC",
            Self::PriceAsc => " ORDER BY p.price ASC, p.id ASC",
            Self::PriceDesc => " ORDER BY p.price DESC, p.id DESC",
            Self::Newest => " ORDER BY p.created_at DESC, p.id DESC",
        }
    }

    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::Name,
        Self::NameDesc,
        Self::PriceAsc,
        Self::PriceDesc,
    ];

    /// Label for the sort drop-down.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::PriceAsc => "Price (low to high)",
            Self::PriceDesc => "Price (high to low)",
            Self::Newest => "Newest",
        }
    }
}

/// Raw catalog query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub category_id: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
}

/// Validated catalog filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub search: Option<String>,
    pub sort: ProductSort,
    pub page: i64,
}

impl ProductFilter {
    /// Build a filter from the query string. Malformed values are ignored.
    #[must_use]
    pub fn from_query(query: &CatalogQuery) -> Self {
        let category_id = query
            .category_id
            .as_deref()
            .and_then(|raw| raw.parse::<CategoryId>().ok());
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let page = query
            .page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);

        Self {
            category_id,
            search,
            sort: ProductSort::parse(query.sort.as_deref()),
            page,
        }
    }

    /// Row offset of the page. Pages past the end give an empty result.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(PAGE_SIZE)
    }
}

/// One page of catalog results.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: i64,
    pub total_count: i64,
}

impl ProductPage {
    /// Number of pages, at least one even when nothing matches.
    #[must_use]
    pub const fn total_pages(&self) -> i64 {
        let pages = (self.total_count + PAGE_SIZE - 1) / PAGE_SIZE;
        if pages < 1 { 1 } else { pages }
    }
}

/// Escape `%`, `_` and `\` so user input matches literally in `ILIKE`.
#[must_use]
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse() {
        assert_eq!(ProductSort::parse(Some("price_desc")), ProductSort::PriceDesc);
        assert_eq!(ProductSort::parse(Some("bogus")), ProductSort::Newest);
        assert_eq!(ProductSort::parse(None), ProductSort::Newest);
        for sort in ProductSort::ALL {
            assert_eq!(ProductSort::parse(Some(sort.as_str())), sort);
        }
    }

    #[test]
    fn test_filter_from_query() {
        let query = CatalogQuery {
            category_id: Some("4".to_string()),
            search: Some("  tea ".to_string()),
            sort: Some("name".to_string()),
            page: Some("3".to_string()),
        };
        let filter = ProductFilter::from_query(&query);
        assert_eq!(filter.category_id, Some(CategoryId::new(4)));
        assert_eq!(filter.search.as_deref(), Some("tea"));
        assert_eq!(filter.sort, ProductSort::Name);
        assert_eq!(filter.offset(), 24);
    }

    #[test]
    fn test_filter_ignores_garbage() {
        let query = CatalogQuery {
            category_id: Some(String::new()),
            search: Some("   ".to_string()),
            sort: None,
            page: Some("-2".to_string()),
        };
        let filter = ProductFilter::from_query(&query);
        assert_eq!(filter, ProductFilter { page: 1, ..ProductFilter::default() });
    }

    #[test]
    fn test_huge_page_offset_saturates() {
        let query = CatalogQuery {
            page: Some(i64::MAX.to_string()),
            ..CatalogQuery::default()
        };
        let filter = ProductFilter::from_query(&query);
        assert_eq!(filter.page, i64::MAX);
        assert_eq!(filter.offset(), i64::MAX);
    }

    #[test]
    fn test_total_pages_minimum_one() {
        let page = |total_count| ProductPage {
            products: Vec::new(),
            page: 1,
            total_count,
        };
        assert_eq!(page(0).total_pages(), 1);
        assert_eq!(page(12).total_pages(), 1);
        assert_eq!(page(13).total_pages(), 2);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("mug"), "%mug%");
    }
}
