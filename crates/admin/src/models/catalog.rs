//! Catalog management: products, categories and product form validation.

use std::path::Path;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use emporium_core::{CategoryId, FieldError, Money, ProductId};

/// Image types accepted for product uploads.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

const MAX_NAME_LENGTH: usize = 100;

/// A product category.
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A non-deleted product with its category name.
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Product form fields as submitted.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub stock_quantity: String,
    pub category_id: String,
}

impl ProductForm {
    /// Prefill the edit form from a stored product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            stock_quantity: product.stock_quantity.to_string(),
            category_id: product
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }

    /// Set a field by its multipart name. Unknown fields are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        match field {
            "name" => self.name = value,
            "description" => self.description = value,
            "price" => self.price = value,
            "stock_quantity" => self.stock_quantity = value,
            "category_id" => self.category_id = value,
            _ => {}
        }
    }
}

/// Validated product fields ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock_quantity: i32,
    pub category_id: Option<CategoryId>,
}

impl ProductInput {
    /// Validate a submitted form, collecting every field error.
    ///
    /// # Errors
    ///
    /// Returns the list of field errors when any field is invalid.
    pub fn parse(form: &ProductForm) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = form.name.trim().to_string();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required."));
        } else if name.chars().count() > MAX_NAME_LENGTH {
            errors.push(FieldError::new(
                "name",
                format!("Name must be at most {MAX_NAME_LENGTH} characters."),
            ));
        }

        let price = match form.price.trim().parse::<Decimal>() {
            Ok(price) if price >= Decimal::ZERO => Some(Money::new(price)),
            Ok(_) => {
                errors.push(FieldError::new("price", "Price cannot be negative."));
                None
            }
            Err(_) => {
                errors.push(FieldError::new("price", "Enter a valid price."));
                None
            }
        };

        let stock_quantity = match form.stock_quantity.trim().parse::<i32>() {
            Ok(stock) if stock >= 0 => Some(stock),
            _ => {
                errors.push(FieldError::new(
                    "stock_quantity",
                    "Stock must be a whole number of zero or more.",
                ));
                None
            }
        };

        let category_id = match form.category_id.trim() {
            "" => None,
            raw => match raw.parse::<CategoryId>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.push(FieldError::new("category_id", "Choose a valid category."));
                    None
                }
            },
        };

        match (price, stock_quantity) {
            (Some(price), Some(stock_quantity)) if errors.is_empty() => Ok(Self {
                name,
                description: Some(form.description.trim().to_string()).filter(|d| !d.is_empty()),
                price,
                stock_quantity,
                category_id,
            }),
            _ => Err(errors),
        }
    }
}

/// Lower-case extension of an uploaded file name, if it is an accepted image type.
#[must_use]
pub fn image_extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Escape `%`, `_` and `\` so user input matches literally in `ILIKE`.
#[must_use]
pub fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Category name as submitted, trimmed and bounded.
///
/// # Errors
///
/// Returns a user-facing message when the name is empty or too long.
pub fn category_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("Category name is required.".to_string());
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!(
            "Category name must be at most {MAX_NAME_LENGTH} characters."
        ));
    }
    Ok(name.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "Ajvar 500g".to_string(),
            description: "  ".to_string(),
            price: "180.50".to_string(),
            stock_quantity: "12".to_string(),
            category_id: "2".to_string(),
        }
    }

    #[test]
    fn test_parse_valid_form() {
        let input = ProductInput::parse(&form()).unwrap();
        assert_eq!(input.name, "Ajvar 500g");
        assert_eq!(input.description, None);
        assert_eq!(input.price, Money::new(Decimal::new(180_50, 2)));
        assert_eq!(input.stock_quantity, 12);
        assert_eq!(input.category_id, Some(CategoryId::new(2)));
    }

    #[test]
    fn test_parse_collects_all_errors() {
        let errors = ProductInput::parse(&ProductForm {
            name: String::new(),
            price: "-1".to_string(),
            stock_quantity: "many".to_string(),
            category_id: "x".to_string(),
            ..form()
        })
        .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, ["name", "price", "stock_quantity", "category_id"]);
    }

    #[test]
    fn test_empty_category_means_uncategorized() {
        let input = ProductInput::parse(&ProductForm {
            category_id: " ".to_string(),
            ..form()
        })
        .unwrap();
        assert_eq!(input.category_id, None);
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(image_extension("shot.webp").as_deref(), Some("webp"));
        assert_eq!(image_extension("script.svg"), None);
        assert_eq!(image_extension("no_extension"), None);
    }

    #[test]
    fn test_form_set_ignores_unknown_fields() {
        let mut form = ProductForm::default();
        form.set("name", "Honey".to_string());
        form.set("image", "ignored".to_string());
        assert_eq!(form.name, "Honey");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("070"), "%070%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_category_name() {
        assert_eq!(category_name("  Preserves ").unwrap(), "Preserves");
        assert!(category_name("   ").is_err());
        assert!(category_name(&"x".repeat(101)).is_err());
    }
}
