//! Physical store locations.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use emporium_core::StoreId;

/// A store location shown on `/stores`.
#[derive(Debug, Clone, FromRow)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}
