//! Catalog listing and product detail.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use tower_sessions::Session;
use tracing::instrument;

use emporium_core::{CurrencyCode, ProductId};

use super::Layout;
use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::catalog::CatalogQuery;
use crate::models::{Product, ProductFilter, ProductPage, ProductSort};
use crate::state::AppState;

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category_name: Option<String>,
    pub image_url: Option<String>,
    pub stock_quantity: i32,
    pub in_stock: bool,
}

impl ProductView {
    fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.display(currency),
            category_name: product.category_name.clone(),
            image_url: product.image_url.clone(),
            stock_quantity: product.stock_quantity,
            in_stock: product.in_stock(),
        }
    }
}

/// A category in the filter sidebar.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: i32,
    pub name: String,
    pub selected: bool,
}

/// A sort choice in the drop-down.
#[derive(Debug, Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// A numbered pagination link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: i64,
    pub href: String,
    pub current: bool,
}

/// Pagination for the listing, with filter parameters preserved in every link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub links: Vec<PageLink>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl Pagination {
    fn new(filter: &ProductFilter, total_pages: i64) -> Self {
        let href = |page: i64| page_href(filter, page);
        let page = filter.page;
        Self {
            links: (1..=total_pages)
                .map(|number| PageLink {
                    number,
                    href: href(number),
                    current: number == page,
                })
                .collect(),
            prev: (page > 1).then(|| href(page - 1)),
            next: (page < total_pages).then(|| href(page + 1)),
        }
    }
}

fn page_href(filter: &ProductFilter, page: i64) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if let Some(category_id) = filter.category_id {
        query.append_pair("category_id", &category_id.to_string());
    }
    if let Some(search) = &filter.search {
        query.append_pair("search", search);
    }
    query.append_pair("sort", filter.sort.as_str());
    query.append_pair("page", &page.to_string());
    format!("/shop?{}", query.finish())
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryOption>,
    pub sorts: Vec<SortOption>,
    pub search: String,
    pub total_count: i64,
    pub pagination: Pagination,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/product.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub product: ProductView,
}

/// Display the catalog.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> Result<ShopIndexTemplate> {
    let filter = ProductFilter::from_query(&query);
    let currency = state.config().currency;

    let page: ProductPage = CatalogRepository::new(state.pool())
        .search_products(&filter)
        .await?;
    let categories = state.categories().await?;

    Ok(ShopIndexTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
        products: page
            .products
            .iter()
            .map(|p| ProductView::new(p, currency))
            .collect(),
        categories: categories
            .iter()
            .map(|c| CategoryOption {
                id: c.id.as_i32(),
                name: c.name.clone(),
                selected: filter.category_id == Some(c.id),
            })
            .collect(),
        sorts: ProductSort::ALL
            .iter()
            .map(|&sort| SortOption {
                value: sort.as_str(),
                label: sort.label(),
                selected: sort == filter.sort,
            })
            .collect(),
        search: filter.search.clone().unwrap_or_default(),
        total_count: page.total_count,
        pagination: Pagination::new(&filter, page.total_pages()),
    })
}

/// Display a single product.
#[instrument(skip(state, session, user))]
pub async fn product(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
) -> Result<ProductTemplate> {
    let product = CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
        product: ProductView::new(&product, state.config().currency),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use emporium_core::CategoryId;

    #[test]
    fn test_page_href_preserves_filters() {
        let filter = ProductFilter {
            category_id: Some(CategoryId::new(3)),
            search: Some("green tea".to_string()),
            sort: ProductSort::PriceAsc,
            page: 1,
        };
        assert_eq!(
            page_href(&filter, 2),
            "/shop?category_id=3&search=green+tea&sort=price_asc&page=2"
        );
    }

    #[test]
    fn test_pagination_bounds() {
        let filter = ProductFilter {
            page: 1,
            ..ProductFilter::default()
        };
        let pagination = Pagination::new(&filter, 3);
        assert_eq!(pagination.links.len(), 3);
        assert!(pagination.links[0].current);
        assert!(pagination.prev.is_none());
        assert_eq!(
            pagination.next.as_deref(),
            Some("/shop?sort=newest&page=2")
        );

        let last = ProductFilter {
            page: 3,
            ..ProductFilter::default()
        };
        let pagination = Pagination::new(&last, 3);
        assert!(pagination.next.is_none());
        assert!(pagination.prev.is_some());
    }
}
