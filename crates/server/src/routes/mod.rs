//! HTTP route handlers for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Dashboard (stat cards, best sellers)
//! GET  /health                 - Health check
//!
//! # Products (admin-only mutations)
//! GET  /products               - Product listing
//! POST /products               - Create product
//! POST /products/{id}          - Update product
//! POST /products/{id}/delete   - Delete product
//!
//! # Transactions
//! GET  /transactions           - Checkout page (picker, cart, recent sales)
//! POST /cart/add               - Add a product to the cart
//! POST /cart/update            - Set a cart line's quantity
//! POST /cart/remove            - Remove a cart line
//! POST /checkout               - Record the sale
//!
//! # Reports
//! GET  /reports                - Stat cards, charts, latest sales
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! POST /auth/logout            - Logout action
//! ```

pub mod auth;
pub mod dashboard;
pub mod products;
pub mod reports;
pub mod transactions;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/{id}", post(products::update))
        .route("/{id}/delete", post(products::delete))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(transactions::cart_add))
        .route("/update", post(transactions::cart_update))
        .route("/remove", post(transactions::cart_remove))
}

/// Create all routes for the dashboard.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/", get(dashboard::index))
        // Product management
        .nest("/products", product_routes())
        // Checkout page and cart mutations
        .route("/transactions", get(transactions::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(transactions::submit))
        // Reports
        .route("/reports", get(reports::index))
        // Auth routes
        .nest("/auth", auth_routes())
}
