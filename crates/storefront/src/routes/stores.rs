//! Store locations.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use super::Layout;
use crate::db::StoreRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::Store;
use crate::state::AppState;

/// Store list template.
#[derive(Template, WebTemplate)]
#[template(path = "stores/index.html")]
pub struct StoresTemplate {
    pub layout: Layout,
    pub stores: Vec<Store>,
}

/// List store locations.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<StoresTemplate> {
    let stores = StoreRepository::new(state.pool()).list().await?;
    Ok(StoresTemplate {
        layout: Layout::load(&session, user.as_ref()).await,
        stores,
    })
}
