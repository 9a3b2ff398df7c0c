//! Subcommand implementations.
//!
//! Every command loads `.env` and connects with `<PREFIX>_DATABASE_URL`,
//! falling back to `DATABASE_URL`. Storefront and admin share one database.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Resolve the database URL for a component.
///
/// Returns the name of the variable that was looked up first when neither is set.
pub(crate) fn database_url(var: &'static str) -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    std::env::var(var)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| var)
}
