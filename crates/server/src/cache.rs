//! Query cache for store reads.
//!
//! Caches the read queries the pages share using `moka` (5-minute TTL).
//! Each query has a typed key; concurrent requests for the same key are
//! coalesced into one gateway fetch. Writes invalidate by domain:
//! product mutations drop the product keys, checkout drops both the
//! product and the transaction keys. The TTL is the backstop for
//! changes made outside this process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, warn};

use tillpoint_core::UserId;

use crate::gateway::{DataGateway, GatewayError};
use crate::models::{Product, Transaction, TransactionItem};
use crate::repos::{ProductRepository, ProfileRepository, TransactionRepository};

/// How many of the cashier's own sales the checkout page shows.
pub const RECENT_SALES_LIMIT: usize = 5;

/// Cache key for one read query.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum QueryKey {
    Products,
    ProductsInStock,
    RecentTransactions(UserId),
    AllTransactions,
    TransactionItems,
    CashierNames,
}

impl QueryKey {
    const fn is_product_data(&self) -> bool {
        matches!(self, Self::Products | Self::ProductsInStock)
    }

    const fn is_transaction_data(&self) -> bool {
        matches!(
            self,
            Self::RecentTransactions(_) | Self::AllTransactions | Self::TransactionItems
        )
    }
}

/// Cached value types. Each key maps to exactly one variant; the
/// accessors fall back to an uncached fetch if they ever disagree.
#[derive(Debug, Clone)]
enum QueryValue {
    Products(Arc<Vec<Product>>),
    Transactions(Arc<Vec<Transaction>>),
    Items(Arc<Vec<TransactionItem>>),
    Names(Arc<HashMap<UserId, String>>),
}

/// Shared cache over the data gateway's read queries.
#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<QueryKey, QueryValue>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .support_invalidation_closures()
            .build();
        Self { cache }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the underlying fetch fails.
    pub async fn products(
        &self,
        gateway: &Arc<dyn DataGateway>,
    ) -> Result<Arc<Vec<Product>>, GatewayError> {
        let fetched = self
            .cache
            .try_get_with(QueryKey::Products, async {
                debug!("fetching products");
                ProductRepository::new(gateway.as_ref())
                    .list_all()
                    .await
                    .map(|products| QueryValue::Products(Arc::new(products)))
            })
            .await
            .map_err(GatewayError::from)?;
        match fetched {
            QueryValue::Products(products) => Ok(products),
            _ => ProductRepository::new(gateway.as_ref())
                .list_all()
                .await
                .map(Arc::new),
        }
    }

    /// Products with stock on hand, for the checkout picker.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the underlying fetch fails.
    pub async fn products_in_stock(
        &self,
        gateway: &Arc<dyn DataGateway>,
    ) -> Result<Arc<Vec<Product>>, GatewayError> {
        let fetched = self
            .cache
            .try_get_with(QueryKey::ProductsInStock, async {
                debug!("fetching in-stock products");
                ProductRepository::new(gateway.as_ref())
                    .list_in_stock()
                    .await
                    .map(|products| QueryValue::Products(Arc::new(products)))
            })
            .await
            .map_err(GatewayError::from)?;
        match fetched {
            QueryValue::Products(products) => Ok(products),
            _ => ProductRepository::new(gateway.as_ref())
                .list_in_stock()
                .await
                .map(Arc::new),
        }
    }

    /// The cashier's latest sales.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the underlying fetch fails.
    pub async fn recent_transactions(
        &self,
        gateway: &Arc<dyn DataGateway>,
        user_id: UserId,
    ) -> Result<Arc<Vec<Transaction>>, GatewayError> {
        let fetched = self
            .cache
            .try_get_with(QueryKey::RecentTransactions(user_id), async {
                debug!(%user_id, "fetching recent transactions");
                TransactionRepository::new(gateway.as_ref())
                    .recent_for_user(user_id, RECENT_SALES_LIMIT)
                    .await
                    .map(|transactions| QueryValue::Transactions(Arc::new(transactions)))
            })
            .await
            .map_err(GatewayError::from)?;
        match fetched {
            QueryValue::Transactions(transactions) => Ok(transactions),
            _ => TransactionRepository::new(gateway.as_ref())
                .recent_for_user(user_id, RECENT_SALES_LIMIT)
                .await
                .map(Arc::new),
        }
    }

    /// Every transaction, newest first. Reports aggregate over this.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the underlying fetch fails.
    pub async fn all_transactions(
        &self,
        gateway: &Arc<dyn DataGateway>,
    ) -> Result<Arc<Vec<Transaction>>, GatewayError> {
        let fetched = self
            .cache
            .try_get_with(QueryKey::AllTransactions, async {
                debug!("fetching all transactions");
                TransactionRepository::new(gateway.as_ref())
                    .list_all()
                    .await
                    .map(|transactions| QueryValue::Transactions(Arc::new(transactions)))
            })
            .await
            .map_err(GatewayError::from)?;
        match fetched {
            QueryValue::Transactions(transactions) => Ok(transactions),
            _ => TransactionRepository::new(gateway.as_ref())
                .list_all()
                .await
                .map(Arc::new),
        }
    }

    /// Every line item, for the top-sellers figures.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the underlying fetch fails.
    pub async fn transaction_items(
        &self,
        gateway: &Arc<dyn DataGateway>,
    ) -> Result<Arc<Vec<TransactionItem>>, GatewayError> {
        let fetched = self
            .cache
            .try_get_with(QueryKey::TransactionItems, async {
                debug!("fetching transaction items");
                TransactionRepository::new(gateway.as_ref())
                    .list_items()
                    .await
                    .map(|items| QueryValue::Items(Arc::new(items)))
            })
            .await
            .map_err(GatewayError::from)?;
        match fetched {
            QueryValue::Items(items) => Ok(items),
            _ => TransactionRepository::new(gateway.as_ref())
                .list_items()
                .await
                .map(Arc::new),
        }
    }

    /// Cashier display names keyed by user id.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the underlying fetch fails.
    pub async fn cashier_names(
        &self,
        gateway: &Arc<dyn DataGateway>,
    ) -> Result<Arc<HashMap<UserId, String>>, GatewayError> {
        let fetched = self
            .cache
            .try_get_with(QueryKey::CashierNames, async {
                debug!("fetching cashier names");
                ProfileRepository::new(gateway.as_ref())
                    .display_names()
                    .await
                    .map(|names| QueryValue::Names(Arc::new(names)))
            })
            .await
            .map_err(GatewayError::from)?;
        match fetched {
            QueryValue::Names(names) => Ok(names),
            _ => ProfileRepository::new(gateway.as_ref())
                .display_names()
                .await
                .map(Arc::new),
        }
    }

    /// Drop the product keys after a product mutation.
    pub fn invalidate_products(&self) {
        if let Err(error) = self
            .cache
            .invalidate_entries_if(|key, _| key.is_product_data())
        {
            warn!(%error, "product cache invalidation failed");
        }
    }

    /// Drop the transaction keys after a sale is recorded.
    pub fn invalidate_transactions(&self) {
        if let Err(error) = self
            .cache
            .invalidate_entries_if(|key, _| key.is_transaction_data())
        {
            warn!(%error, "transaction cache invalidation failed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::{
        AuthUser, Filter, MemoryGateway, SelectQuery, Table,
    };
    use crate::models::NewProduct;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn gateway() -> Arc<dyn DataGateway> {
        Arc::new(MemoryGateway::new())
    }

    /// Counts selects so dedup across concurrent readers is observable.
    #[derive(Default)]
    struct CountingGateway {
        inner: MemoryGateway,
        selects: AtomicUsize,
    }

    #[async_trait]
    impl DataGateway for CountingGateway {
        async fn select(
            &self,
            table: Table,
            query: SelectQuery,
        ) -> Result<Vec<Value>, GatewayError> {
            self.selects.fetch_add(1, Ordering::SeqCst);
            // Yield so a second reader can reach the cache while this
            // fetch is still in flight.
            tokio::task::yield_now().await;
            self.inner.select(table, query).await
        }

        async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
            self.inner.insert(table, rows).await
        }

        async fn update(
            &self,
            table: Table,
            patch: Value,
            filter: Filter,
        ) -> Result<Vec<Value>, GatewayError> {
            self.inner.update(table, patch, filter).await
        }

        async fn delete(&self, table: Table, filter: Filter) -> Result<(), GatewayError> {
            self.inner.delete(table, filter).await
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, GatewayError> {
            self.inner.sign_in(email, password).await
        }
    }

    async fn seed(gateway: &Arc<dyn DataGateway>, name: &str, stock: i32) {
        ProductRepository::new(gateway.as_ref())
            .create(NewProduct {
                name: name.to_owned(),
                description: None,
                price: Decimal::new(550, 2),
                stock_quantity: stock,
                category: None,
                sku: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_products_are_served_from_cache_until_invalidated() {
        let gateway = gateway();
        let cache = QueryCache::new();
        seed(&gateway, "Aqua", 5).await;

        assert_eq!(cache.products(&gateway).await.unwrap().len(), 1);

        // A write the cache has not seen: the stale entry is served
        // until the caller invalidates.
        seed(&gateway, "Pencil 2B", 3).await;
        assert_eq!(cache.products(&gateway).await.unwrap().len(), 1);

        cache.invalidate_products();
        // Closure-based invalidation is applied lazily; sync flushes it.
        cache.cache.run_pending_tasks().await;
        assert_eq!(cache.products(&gateway).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_readers_share_one_fetch() {
        let counting = Arc::new(CountingGateway::default());
        let gateway: Arc<dyn DataGateway> = counting.clone();
        let cache = QueryCache::new();
        seed(&gateway, "Aqua", 5).await;
        counting.selects.store(0, Ordering::SeqCst);

        let (a, b) = tokio::join!(cache.products(&gateway), cache.products(&gateway));
        assert_eq!(a.unwrap().len(), 1);
        assert_eq!(b.unwrap().len(), 1);
        assert_eq!(counting.selects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_product_invalidation_keeps_transaction_keys() {
        let gateway = gateway();
        let cache = QueryCache::new();

        gateway
            .insert(Table::Transactions, vec![json!({"user_id": UserId::random().to_string(), "total_amount": "5.00", "payment_method": "cash"})])
            .await
            .unwrap();

        assert_eq!(cache.all_transactions(&gateway).await.unwrap().len(), 1);

        gateway
            .insert(Table::Transactions, vec![json!({"user_id": UserId::random().to_string(), "total_amount": "7.00", "payment_method": "cash"})])
            .await
            .unwrap();

        cache.invalidate_products();
        cache.cache.run_pending_tasks().await;
        assert_eq!(cache.all_transactions(&gateway).await.unwrap().len(), 1);

        cache.invalidate_transactions();
        cache.cache.run_pending_tasks().await;
        assert_eq!(cache.all_transactions(&gateway).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_recent_transactions_are_keyed_per_user() {
        let gateway = gateway();
        let cache = QueryCache::new();
        let a = UserId::random();
        let b = UserId::random();

        gateway
            .insert(
                Table::Transactions,
                vec![json!({"user_id": a.to_string(), "total_amount": "5.00", "payment_method": "cash"})],
            )
            .await
            .unwrap();

        assert_eq!(cache.recent_transactions(&gateway, a).await.unwrap().len(), 1);
        assert!(cache.recent_transactions(&gateway, b).await.unwrap().is_empty());
    }
}
