//! Dashboard page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::RequireUser;
use crate::models::{CurrentUser, Flash, take_flash};
use crate::nav::{VisibleNavGroup, sidebar};
use crate::reports::{TopProduct, low_stock_count, top_products, transaction_stats};
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: CurrentUser,
    pub nav: Vec<VisibleNavGroup>,
    pub flash: Option<Flash>,
    pub product_count: usize,
    pub today_count: usize,
    pub today_revenue: rust_decimal::Decimal,
    pub low_stock: usize,
    pub best_sellers: Vec<TopProduct>,
}

/// Stat cards and the best-sellers chart.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<DashboardTemplate, AppError> {
    let products = state.cache().products(state.gateway()).await?;
    let transactions = state.cache().all_transactions(state.gateway()).await?;
    let items = state.cache().transaction_items(state.gateway()).await?;

    let stats = transaction_stats(&transactions, Utc::now());
    let best_sellers = top_products(&items, &products);

    Ok(DashboardTemplate {
        nav: sidebar(user.is_admin()),
        flash: take_flash(&session).await,
        product_count: products.len(),
        today_count: stats.today_count,
        today_revenue: stats.today_revenue,
        low_stock: low_stock_count(&products),
        best_sellers,
        user,
    })
}
