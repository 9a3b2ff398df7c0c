//! Session middleware configuration.
//!
//! `PostgreSQL`-backed sessions in `admin.session`, separate from the shop's
//! sessions, with a 30 minute idle timeout and a strict same-site cookie.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "emporium_admin_session";

/// Idle timeout in seconds.
const SESSION_IDLE_SECONDS: i64 = 30 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The session table must exist (created by the admin migrations).
///
/// # Errors
///
/// Returns an error if the schema or table name is rejected by the store.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> Result<SessionManagerLayer<PostgresStore>, String> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .map_err(|e| e.to_string())?
        .with_table_name("session")
        .map_err(|e| e.to_string())?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_IDLE_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/"))
}
