//! Product management handlers.
//!
//! The listing is visible to every signed-in user; create, update, and
//! delete are admin-only. Mutations invalidate the product cache and
//! queue a flash for the redirected page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tillpoint_core::ProductId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::{RequireAdmin, RequireUser};
use crate::models::{CurrentUser, Flash, NewProduct, Product, ProductPatch, set_flash, take_flash};
use crate::nav::{VisibleNavGroup, sidebar};
use crate::repos::ProductRepository;
use crate::state::AppState;

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsTemplate {
    pub user: CurrentUser,
    pub nav: Vec<VisibleNavGroup>,
    pub flash: Option<Flash>,
    pub products: Vec<Product>,
}

/// Product form data, shared by create and update.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category: Option<String>,
    pub sku: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ProductForm {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("Product name is required".to_owned()));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::BadRequest("Price must not be negative".to_owned()));
        }
        if self.stock_quantity < 0 {
            return Err(AppError::BadRequest(
                "Stock quantity must not be negative".to_owned(),
            ));
        }
        Ok(())
    }
}

/// List all products.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<ProductsTemplate, AppError> {
    let products = state.cache().products(state.gateway()).await?;

    Ok(ProductsTemplate {
        nav: sidebar(user.is_admin()),
        flash: take_flash(&session).await,
        products: products.as_ref().clone(),
        user,
    })
}

/// Create a product (admin-only).
#[instrument(skip(state, session, form), fields(name = %form.name))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    form.validate()?;

    ProductRepository::new(state.gateway().as_ref())
        .create(NewProduct {
            name: form.name.trim().to_owned(),
            description: non_empty(form.description),
            price: form.price,
            stock_quantity: form.stock_quantity,
            category: non_empty(form.category),
            sku: non_empty(form.sku),
        })
        .await?;

    state.cache().invalidate_products();
    set_flash(&session, Flash::success("Product created successfully!")).await;
    Ok(Redirect::to("/products"))
}

/// Update a product (admin-only).
#[instrument(skip(state, session, form), fields(product_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    form.validate()?;

    ProductRepository::new(state.gateway().as_ref())
        .update(
            id,
            ProductPatch {
                name: Some(form.name.trim().to_owned()),
                description: Some(non_empty(form.description)),
                price: Some(form.price),
                stock_quantity: Some(form.stock_quantity),
                category: Some(non_empty(form.category)),
                sku: Some(non_empty(form.sku)),
            },
        )
        .await?;

    state.cache().invalidate_products();
    set_flash(&session, Flash::success("Product updated successfully!")).await;
    Ok(Redirect::to("/products"))
}

/// Delete a product (admin-only).
#[instrument(skip(state, session), fields(product_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    ProductRepository::new(state.gateway().as_ref())
        .delete(id)
        .await?;

    state.cache().invalidate_products();
    set_flash(&session, Flash::success("Product deleted successfully!")).await;
    Ok(Redirect::to("/products"))
}
