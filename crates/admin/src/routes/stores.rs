//! Store location management.

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
use crate::db::StoreRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::{Flash, RequireAdminAuth, set_flash};
use crate::models::{Store, StoreInput};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct StoreForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "stores/index.html")]
pub struct StoresTemplate {
    pub layout: Layout,
    pub stores: Vec<Store>,
    pub form: StoreForm,
    pub error: Option<String>,
}

#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<StoresTemplate> {
    let stores = StoreRepository::new(state.pool()).list().await?;
    Ok(StoresTemplate {
        layout: Layout::load(&session, &admin, "/stores").await,
        stores,
        form: StoreForm::default(),
        error: None,
    })
}

/// Add a store location.
#[instrument(skip(state, session, admin, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<StoreForm>,
) -> Result<Response> {
    let repo = StoreRepository::new(state.pool());

    let input = match StoreInput::parse(&form.name, &form.location) {
        Ok(input) => input,
        Err(error) => {
            return Ok(StoresTemplate {
                layout: Layout::load(&session, &admin, "/stores").await,
                stores: repo.list().await?,
                form,
                error: Some(error),
            }
            .into_response());
        }
    };

    let store = repo.create(&input).await?;
    tracing::info!(store_id = %store.id, "Store created");
    set_flash(
        &session,
        Flash::success(format!("Store '{}' added.", store.name)),
    )
    .await;
    Ok(Redirect::to("/stores").into_response())
}
