//! Physical store locations.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use emporium_core::StoreId;

/// A store location.
#[derive(Debug, Clone, FromRow)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// Validated store fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreInput {
    pub name: String,
    pub location: String,
}

impl StoreInput {
    const NAME_MAX: usize = 100;
    const LOCATION_MAX: usize = 200;

    /// Trim and bound the submitted fields.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message for the first invalid field.
    pub fn parse(name: &str, location: &str) -> Result<Self, String> {
        let name = name.trim();
        let location = location.trim();
        if name.is_empty() || location.is_empty() {
            return Err("Name and location are required.".to_string());
        }
        if name.chars().count() > Self::NAME_MAX {
            return Err(format!("Name must be at most {} characters.", Self::NAME_MAX));
        }
        if location.chars().count() > Self::LOCATION_MAX {
            return Err(format!(
                "Location must be at most {} characters.",
                Self::LOCATION_MAX
            ));
        }
        Ok(Self {
            name: name.to_string(),
            location: location.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_input() {
        let input = StoreInput::parse(" Centar ", " Makedonija 1, Skopje ");
        assert_eq!(
            input,
            Ok(StoreInput {
                name: "Centar".to_string(),
                location: "Makedonija 1, Skopje".to_string(),
            })
        );
        assert!(StoreInput::parse("", "Bitola").is_err());
        assert!(StoreInput::parse(&"n".repeat(101), "Bitola").is_err());
    }
}
