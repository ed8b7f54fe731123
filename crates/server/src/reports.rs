//! Derived reporting figures.
//!
//! Pure aggregation over already-fetched rows. Every function takes the
//! clock as an argument so the date arithmetic is testable; the route
//! handlers pass `Utc::now()`. All bucketing is by UTC calendar date.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::models::{Product, Transaction, TransactionItem};

/// How many best sellers the reports page lists.
pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Stock level at or below which a product counts as running low.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Revenue and volume figures for the stat cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionStats {
    pub total_revenue: Decimal,
    pub total_count: usize,
    pub today_revenue: Decimal,
    pub today_count: usize,
    pub month_revenue: Decimal,
    pub month_count: usize,
    /// Total revenue over total count; zero when there are no sales.
    pub average_sale: Decimal,
}

/// One best-selling product, aggregated across all sales.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopProduct {
    pub name: String,
    pub quantity_sold: u64,
    pub revenue: Decimal,
}

/// Revenue for one calendar day in the trailing week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    /// Short weekday label for the chart axis ("Mon", "Tue", ...).
    pub label: String,
    pub revenue: Decimal,
}

/// Aggregate the stat-card figures from every recorded sale.
#[must_use]
pub fn transaction_stats(transactions: &[Transaction], now: DateTime<Utc>) -> TransactionStats {
    let today = now.date_naive();

    let mut stats = TransactionStats {
        total_revenue: Decimal::ZERO,
        total_count: transactions.len(),
        today_revenue: Decimal::ZERO,
        today_count: 0,
        month_revenue: Decimal::ZERO,
        month_count: 0,
        average_sale: Decimal::ZERO,
    };

    for transaction in transactions {
        let date = transaction.created_at.date_naive();
        stats.total_revenue += transaction.total_amount;
        if date == today {
            stats.today_revenue += transaction.total_amount;
            stats.today_count += 1;
        }
        if date.year() == today.year() && date.month() == today.month() {
            stats.month_revenue += transaction.total_amount;
            stats.month_count += 1;
        }
    }

    if stats.total_count > 0 {
        stats.average_sale = stats.total_revenue / Decimal::from(stats.total_count);
    }
    stats
}

/// How many products are at or below [`LOW_STOCK_THRESHOLD`].
#[must_use]
pub fn low_stock_count(products: &[Product]) -> usize {
    products
        .iter()
        .filter(|product| product.stock_quantity <= LOW_STOCK_THRESHOLD)
        .count()
}

/// The best sellers by revenue, at most [`TOP_PRODUCTS_LIMIT`] of them.
///
/// Line items are joined against the product list in memory and
/// aggregated by product name. Items whose product has since been
/// deleted are skipped.
#[must_use]
pub fn top_products(items: &[TransactionItem], products: &[Product]) -> Vec<TopProduct> {
    let names: HashMap<_, _> = products.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut by_name: HashMap<&str, (u64, Decimal)> = HashMap::new();
    for item in items {
        let Some(name) = names.get(&item.product_id) else {
            continue;
        };
        let entry = by_name.entry(name).or_insert((0, Decimal::ZERO));
        entry.0 += u64::from(item.quantity);
        entry.1 += item.total_price;
    }

    let mut ranked: Vec<TopProduct> = by_name
        .into_iter()
        .map(|(name, (quantity_sold, revenue))| TopProduct {
            name: name.to_owned(),
            quantity_sold,
            revenue,
        })
        .collect();
    ranked.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(TOP_PRODUCTS_LIMIT);
    ranked
}

/// Revenue per calendar day over the trailing seven days, oldest first.
///
/// Days with no sales are omitted. Sales older than seven days before
/// `now` are ignored.
#[must_use]
pub fn daily_revenue(transactions: &[Transaction], now: DateTime<Utc>) -> Vec<DailyRevenue> {
    let cutoff = now.checked_sub_days(Days::new(7)).unwrap_or(now);

    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for transaction in transactions {
        if transaction.created_at < cutoff {
            continue;
        }
        *by_date
            .entry(transaction.created_at.date_naive())
            .or_insert(Decimal::ZERO) += transaction.total_amount;
    }

    by_date
        .into_iter()
        .map(|(date, revenue)| DailyRevenue {
            date,
            label: date.format("%a").to_string(),
            revenue,
        })
        .collect()
}
