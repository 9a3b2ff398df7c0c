//! Database migration commands.
//!
//! # Migration Files
//!
//! Storefront migrations: `crates/storefront/migrations/`
//! Admin migrations: `crates/admin/migrations/`
//!
//! Both sets are applied to the same database, so each run ignores the
//! versions recorded by the other set.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - Used by `migrate storefront`
//! - `ADMIN_DATABASE_URL` - Used by `migrate admin`
//! - `DATABASE_URL` - Fallback for both

use emporium_admin::db;
use thiserror::Error;

use super::database_url;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A migration failed to apply.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    let url = database_url("STOREFRONT_DATABASE_URL").map_err(MigrationError::MissingEnvVar)?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Running storefront migrations...");
    let mut migrator = sqlx::migrate!("../storefront/migrations");
    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    let url = database_url("ADMIN_DATABASE_URL").map_err(MigrationError::MissingEnvVar)?;

    tracing::info!("Connecting to admin database...");
    let pool = db::create_pool(&url).await?;

    tracing::info!("Running admin migrations...");
    let mut migrator = sqlx::migrate!("../admin/migrations");
    migrator.set_ignore_missing(true);
    migrator.run(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
