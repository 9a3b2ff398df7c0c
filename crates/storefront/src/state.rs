//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{CatalogRepository, RepositoryError};
use crate::models::Category;
use crate::services::{EmailService, PaymentService, StubProvider};

/// Categories are edited by the admin process; cached entries expire after a minute.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    payments: PaymentService,
    email: Option<EmailService>,
    categories: Cache<(), Arc<Vec<Category>>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Registers the stub payment provider and builds the SMTP transport when
    /// email is configured. A broken SMTP config disables email with a warning.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let email = config
            .email
            .as_ref()
            .and_then(|email_config| match EmailService::new(email_config) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(error = %e, "Email disabled: invalid SMTP configuration");
                    None
                }
            });

        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments: PaymentService::new().with_provider(StubProvider::new()),
                email,
                categories,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Registered payment providers.
    #[must_use]
    pub fn payments(&self) -> &PaymentService {
        &self.inner.payments
    }

    /// Email sender, `None` when SMTP is not configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    /// All categories, served from a short-lived cache.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if loading fails on a cache miss.
    pub async fn categories(&self) -> Result<Arc<Vec<Category>>, RepositoryError> {
        if let Some(categories) = self.inner.categories.get(&()).await {
            return Ok(categories);
        }

        let categories = Arc::new(CatalogRepository::new(self.pool()).list_categories().await?);
        self.inner.categories.insert((), Arc::clone(&categories)).await;
        Ok(categories)
    }
}
