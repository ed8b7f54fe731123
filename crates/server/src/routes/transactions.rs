//! Checkout page and cart handlers.
//!
//! The page shows the in-stock product picker, the session's cart, and
//! the cashier's recent sales. Cart mutations redirect back to the
//! page; a failed mutation surfaces its message as a flash and leaves
//! the cart unchanged.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::Redirect,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use tillpoint_core::{PaymentMethod, ProductId};

use crate::cart::{Cart, CartLine};
use crate::checkout::{CheckoutDetails, checkout};
use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::RequireUser;
use crate::models::{
    CurrentUser, Flash, Product, Transaction, clear_cart, load_cart, save_cart, set_flash,
    take_flash,
};
use crate::nav::{VisibleNavGroup, sidebar};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "transactions/index.html")]
pub struct TransactionsTemplate {
    pub user: CurrentUser,
    pub nav: Vec<VisibleNavGroup>,
    pub flash: Option<Flash>,
    pub products: Vec<Product>,
    pub cart: CartView,
    pub recent: Vec<Transaction>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: Decimal,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            total: cart.total(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

/// Render the checkout page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<TransactionsTemplate, AppError> {
    let products = state.cache().products_in_stock(state.gateway()).await?;
    let recent = state
        .cache()
        .recent_transactions(state.gateway(), user.id)
        .await?;
    let cart = load_cart(&session).await;

    Ok(TransactionsTemplate {
        nav: sidebar(user.is_admin()),
        flash: take_flash(&session).await,
        products: products.as_ref().clone(),
        cart: CartView::from(&cart),
        recent: recent.as_ref().clone(),
        user,
    })
}

/// Add one unit of a product to the cart.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn cart_add(
    State(state): State<AppState>,
    session: Session,
    RequireUser(_user): RequireUser,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect, AppError> {
    let products = state.cache().products_in_stock(state.gateway()).await?;
    let Some(product) = products.iter().find(|p| p.id == form.product_id) else {
        return Err(AppError::NotFound("product".to_owned()));
    };

    let mut cart = load_cart(&session).await;
    if let Err(error) = cart.add(product) {
        set_flash(&session, Flash::error(error.to_string())).await;
        return Ok(Redirect::to("/transactions"));
    }
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/transactions"))
}

/// Set a cart line's quantity (zero removes it).
#[instrument(skip(session), fields(product_id = %form.product_id, quantity = form.quantity))]
pub async fn cart_update(
    session: Session,
    RequireUser(_user): RequireUser,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect, AppError> {
    let mut cart = load_cart(&session).await;
    if let Err(error) = cart.update_quantity(form.product_id, form.quantity) {
        set_flash(&session, Flash::error(error.to_string())).await;
        return Ok(Redirect::to("/transactions"));
    }
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/transactions"))
}

/// Remove a cart line.
#[instrument(skip(session), fields(product_id = %form.product_id))]
pub async fn cart_remove(
    session: Session,
    RequireUser(_user): RequireUser,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect, AppError> {
    let mut cart = load_cart(&session).await;
    cart.remove(form.product_id);
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/transactions"))
}

/// Record the sale from the cart's contents.
///
/// On success the cart is cleared and both cache domains are dropped.
/// On failure the cart is kept so the cashier can retry; any writes
/// that already landed stay in the store.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect, AppError> {
    let cart = load_cart(&session).await;

    let details = CheckoutDetails {
        payment_method: form.payment_method,
        customer_name: form.customer_name,
        customer_email: form.customer_email,
    };

    match checkout(state.gateway().as_ref(), user.id, &cart, details).await {
        Ok(receipt) => {
            clear_cart(&session).await?;
            state.cache().invalidate_products();
            state.cache().invalidate_transactions();
            set_flash(
                &session,
                Flash::success("Transaction completed successfully!"),
            )
            .await;
            tracing::info!(transaction_id = %receipt.transaction_id, "checkout complete");
        }
        Err(error) => {
            warn!(%error, "checkout failed");
            set_flash(&session, Flash::error("Failed to complete transaction")).await;
        }
    }

    Ok(Redirect::to("/transactions"))
}
