//! Product management with image upload.
//!
//! Create and edit forms are `multipart/form-data`. The optional `image`
//! field is stored as `{upload_dir}/{uuid}.{ext}` and served from
//! `/uploads`. Editing without a new image keeps the current one.

use std::path::Path as FsPath;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use emporium_core::{CurrencyCode, FieldError, ProductId};

use super::Layout;
use crate::db::{CatalogRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{Flash, RequireAdminAuth, set_flash};
use crate::models::catalog::{IMAGE_EXTENSIONS, image_extension};
use crate::models::{Category, CurrentAdmin, Product, ProductForm, ProductInput};
use crate::state::AppState;

/// Row of the product list.
#[derive(Debug, Clone)]
pub struct ProductRowView {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
}

impl ProductRowView {
    fn new(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            category: product.category_name.clone().unwrap_or_default(),
            price: product.price.display(currency),
            stock_quantity: product.stock_quantity,
            image_url: product.image_url.clone(),
        }
    }
}

/// Category choice in the product form.
#[derive(Debug, Clone)]
pub struct CategoryOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

fn category_options(categories: &[Category], selected: &str) -> Vec<CategoryOption> {
    categories
        .iter()
        .map(|c| {
            let id = c.id.to_string();
            CategoryOption {
                selected: id == selected.trim(),
                id,
                name: c.name.clone(),
            }
        })
        .collect()
}

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub layout: Layout,
    pub products: Vec<ProductRowView>,
}

/// Create and edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub title: &'static str,
    pub action: String,
    pub form: ProductForm,
    pub categories: Vec<CategoryOption>,
    pub image_url: Option<String>,
    pub errors: Vec<FieldError>,
}

/// An accepted image upload.
#[derive(Debug)]
struct UploadedImage {
    extension: String,
    bytes: Bytes,
}

/// The parsed multipart submission.
#[derive(Debug, Default)]
struct ProductSubmission {
    form: ProductForm,
    image: Option<UploadedImage>,
    image_error: Option<FieldError>,
}

impl ProductSubmission {
    /// Read every field. An empty file input means no new image.
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                submission.accept_image(&file_name, bytes);
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                submission.form.set(&name, value);
            }
        }

        Ok(submission)
    }

    fn accept_image(&mut self, file_name: &str, bytes: Bytes) {
        if file_name.is_empty() || bytes.is_empty() {
            return;
        }
        match image_extension(file_name) {
            Some(extension) => self.image = Some(UploadedImage { extension, bytes }),
            None => {
                self.image_error = Some(FieldError::new(
                    "image",
                    format!("Images must be one of: {}.", IMAGE_EXTENSIONS.join(", ")),
                ));
            }
        }
    }

    /// Validate the form fields and the image together.
    fn validate(&self) -> std::result::Result<ProductInput, Vec<FieldError>> {
        let parsed = ProductInput::parse(&self.form);
        match (parsed, self.image_error.clone()) {
            (Ok(input), None) => Ok(input),
            (Ok(_), Some(image_error)) => Err(vec![image_error]),
            (Err(mut errors), image_error) => {
                errors.extend(image_error);
                Err(errors)
            }
        }
    }
}

/// Write an uploaded image and return its public URL.
async fn store_image(upload_dir: &FsPath, image: &UploadedImage) -> Result<String> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| AppError::Internal(format!("create upload dir: {e}")))?;

    let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
    tokio::fs::write(upload_dir.join(&file_name), &image.bytes)
        .await
        .map_err(|e| AppError::Internal(format!("write upload: {e}")))?;

    tracing::info!(file = %file_name, size = image.bytes.len(), "Product image stored");
    Ok(format!("/uploads/{file_name}"))
}

/// List products.
#[instrument(skip(state, session, admin))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<ProductsTemplate> {
    let currency = state.config().currency;
    let products = CatalogRepository::new(state.pool()).list_products().await?;

    Ok(ProductsTemplate {
        layout: Layout::load(&session, &admin, "/products").await,
        products: products
            .iter()
            .map(|p| ProductRowView::new(p, currency))
            .collect(),
    })
}

async fn render_form(
    state: &AppState,
    session: &Session,
    admin: &CurrentAdmin,
    target: Option<ProductId>,
    form: ProductForm,
    image_url: Option<String>,
    errors: Vec<FieldError>,
) -> Result<ProductFormTemplate> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;
    let (title, action) = match target {
        Some(id) => ("Edit product", format!("/products/{id}/edit")),
        None => ("New product", "/products/new".to_string()),
    };

    Ok(ProductFormTemplate {
        layout: Layout::load(session, admin, "/products").await,
        title,
        action,
        categories: category_options(&categories, &form.category_id),
        form,
        image_url,
        errors,
    })
}

/// Display the create form.
#[instrument(skip(state, session, admin))]
pub async fn new_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<ProductFormTemplate> {
    render_form(
        &state,
        &session,
        &admin,
        None,
        ProductForm::default(),
        None,
        Vec::new(),
    )
    .await
}

/// Create a product.
#[instrument(skip(state, session, admin, multipart))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    multipart: Multipart,
) -> Result<Response> {
    let submission = ProductSubmission::read(multipart).await?;

    let input = match submission.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(render_form(
                &state,
                &session,
                &admin,
                None,
                submission.form,
                None,
                errors,
            )
            .await?
            .into_response());
        }
    };

    let image_url = match &submission.image {
        Some(image) => Some(store_image(state.upload_dir(), image).await?),
        None => None,
    };

    let id = CatalogRepository::new(state.pool())
        .create_product(&input, image_url.as_deref())
        .await?;

    set_flash(
        &session,
        Flash::success(format!("Product '{}' created.", input.name)),
    )
    .await;
    tracing::info!(product_id = %id, admin_id = %admin.id, "Product created from back-office");
    Ok(Redirect::to("/products").into_response())
}

async fn load_product(state: &AppState, id: ProductId) -> Result<Product> {
    CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Display the edit form.
#[instrument(skip(state, session, admin))]
pub async fn edit_page(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<ProductFormTemplate> {
    let product = load_product(&state, id).await?;

    render_form(
        &state,
        &session,
        &admin,
        Some(id),
        ProductForm::from_product(&product),
        product.image_url,
        Vec::new(),
    )
    .await
}

/// Update a product.
#[instrument(skip(state, session, admin, multipart))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let product = load_product(&state, id).await?;
    let submission = ProductSubmission::read(multipart).await?;

    let input = match submission.validate() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(render_form(
                &state,
                &session,
                &admin,
                Some(id),
                submission.form,
                product.image_url,
                errors,
            )
            .await?
            .into_response());
        }
    };

    let image_url = match &submission.image {
        Some(image) => Some(store_image(state.upload_dir(), image).await?),
        None => None,
    };

    CatalogRepository::new(state.pool())
        .update_product(id, &input, image_url.as_deref())
        .await?;

    set_flash(
        &session,
        Flash::success(format!("Product '{}' updated.", input.name)),
    )
    .await;
    Ok(Redirect::to("/products").into_response())
}

/// Soft delete a product.
#[instrument(skip(state, session, admin))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    match CatalogRepository::new(state.pool()).delete_product(id).await {
        Ok(()) => set_flash(&session, Flash::success("Product deleted.")).await,
        Err(RepositoryError::NotFound) => {
            set_flash(&session, Flash::error("Product not found.")).await;
        }
        Err(e) => return Err(e.into()),
    }
    tracing::info!(product_id = %id, admin_id = %admin.id, "Product deleted");
    Ok(Redirect::to("/products"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use emporium_core::CategoryId;

    fn valid_form() -> ProductForm {
        ProductForm {
            name: "Rakija 0.7l".to_string(),
            description: String::new(),
            price: "650".to_string(),
            stock_quantity: "8".to_string(),
            category_id: String::new(),
        }
    }

    #[test]
    fn test_empty_file_input_is_no_image() {
        let mut submission = ProductSubmission::default();
        submission.accept_image("", Bytes::from_static(b"data"));
        submission.accept_image("photo.png", Bytes::new());
        assert!(submission.image.is_none());
        assert!(submission.image_error.is_none());
    }

    #[test]
    fn test_accepts_known_image_types() {
        let mut submission = ProductSubmission::default();
        submission.accept_image("Photo.PNG", Bytes::from_static(b"\x89PNG"));
        assert_eq!(submission.image.unwrap().extension, "png");
    }

    #[test]
    fn test_rejects_other_files() {
        let mut submission = ProductSubmission {
            form: valid_form(),
            ..ProductSubmission::default()
        };
        submission.accept_image("payload.svg", Bytes::from_static(b"<svg/>"));
        assert!(submission.image.is_none());

        let errors = submission.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "image");
    }

    #[test]
    fn test_validate_merges_field_and_image_errors() {
        let mut submission = ProductSubmission {
            form: ProductForm {
                name: String::new(),
                ..valid_form()
            },
            ..ProductSubmission::default()
        };
        submission.accept_image("notes.txt", Bytes::from_static(b"hi"));

        let fields: Vec<&str> = submission
            .validate()
            .unwrap_err()
            .iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, ["name", "image"]);
    }

    #[test]
    fn test_category_options_mark_selection() {
        let categories = vec![
            Category {
                id: CategoryId::new(1),
                name: "Preserves".to_string(),
            },
            Category {
                id: CategoryId::new(2),
                name: "Spirits".to_string(),
            },
        ];
        let options = category_options(&categories, "2");
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert!(category_options(&categories, "").iter().all(|o| !o.selected));
    }
}
