//! Reports page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::RequireUser;
use crate::models::{CurrentUser, Flash, TransactionWithCashier, take_flash};
use crate::nav::{VisibleNavGroup, sidebar};
use crate::reports::{
    DailyRevenue, TopProduct, TransactionStats, daily_revenue, top_products, transaction_stats,
};
use crate::state::AppState;

/// How many sales the "Recent Transactions" table shows.
const LATEST_SALES_LIMIT: usize = 10;

/// Reports page template.
#[derive(Template, WebTemplate)]
#[template(path = "reports/index.html")]
pub struct ReportsTemplate {
    pub user: CurrentUser,
    pub nav: Vec<VisibleNavGroup>,
    pub flash: Option<Flash>,
    pub stats: TransactionStats,
    pub daily: Vec<DailyRevenue>,
    pub top: Vec<TopProduct>,
    pub latest: Vec<TransactionWithCashier>,
}

/// Stat cards, both charts, and the latest sales with cashier names.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireUser(user): RequireUser,
) -> Result<ReportsTemplate, AppError> {
    let now = Utc::now();
    let transactions = state.cache().all_transactions(state.gateway()).await?;
    let items = state.cache().transaction_items(state.gateway()).await?;
    let products = state.cache().products(state.gateway()).await?;
    let names = state.cache().cashier_names(state.gateway()).await?;

    let latest = transactions
        .iter()
        .take(LATEST_SALES_LIMIT)
        .map(|transaction| TransactionWithCashier {
            cashier_name: names.get(&transaction.user_id).cloned(),
            transaction: transaction.clone(),
        })
        .collect();

    Ok(ReportsTemplate {
        nav: sidebar(user.is_admin()),
        flash: take_flash(&session).await,
        stats: transaction_stats(&transactions, now),
        daily: daily_revenue(&transactions, now),
        top: top_products(&items, &products),
        latest,
        user,
    })
}
