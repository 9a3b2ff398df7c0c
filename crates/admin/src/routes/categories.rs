//! Category management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::db::{CatalogRepository, RepositoryError};
use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, RequireAdminAuth, set_flash};
use crate::models::catalog::category_name;
use crate::models::{Category, CurrentAdmin};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

/// Category list and add form.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub layout: Layout,
    pub categories: Vec<Category>,
    pub name: String,
    pub error: Option<String>,
}

async fn render(
    state: &AppState,
    session: &Session,
    admin: &CurrentAdmin,
    name: String,
    error: Option<String>,
) -> Result<CategoriesTemplate> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    Ok(CategoriesTemplate {
        layout: Layout::load(session, admin, "/categories").await,
        categories,
        name,
        error,
    })
}

#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<CategoriesTemplate> {
    render(&state, &session, &admin, String::new(), None).await
}

/// Add a category. Duplicate names re-render the form with an error.
#[instrument(skip(state, session, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<CategoryForm>,
) -> Result<Response> {
    let name = match category_name(&form.name) {
        Ok(name) => name,
        Err(message) => {
            return Ok(render(&state, &session, &admin, form.name, Some(message))
                .await?
                .into_response());
        }
    };

    match CatalogRepository::new(state.pool())
        .create_category(&name)
        .await
    {
        Ok(category) => {
            tracing::info!(category_id = %category.id, "Category created");
            set_flash(
                &session,
                Flash::success(format!("Category '{}' added.", category.name)),
            )
            .await;
            Ok(Redirect::to("/categories").into_response())
        }
        Err(RepositoryError::Conflict(_)) => {
            let message = format!("A category named '{name}' already exists.");
            Ok(render(&state, &session, &admin, name, Some(message))
                .await?
                .into_response())
        }
        Err(e) => Err(e.into()),
    }
}
