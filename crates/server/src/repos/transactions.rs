//! Transaction and line-item table operations.

use super::{decode_first, decode_rows};
use crate::gateway::{DataGateway, Filter, GatewayError, SelectQuery, Table};
use crate::models::{NewTransaction, NewTransactionItem, Transaction, TransactionItem};

use tillpoint_core::UserId;

/// Repository for the `transactions` and `transaction_items` tables.
pub struct TransactionRepository<'a> {
    gateway: &'a dyn DataGateway,
}

impl<'a> TransactionRepository<'a> {
    #[must_use]
    pub const fn new(gateway: &'a dyn DataGateway) -> Self {
        Self { gateway }
    }

    /// Create a transaction header, returning the stored row (with id,
    /// status, and timestamp assigned by the store).
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the write fails or returns no row.
    pub async fn create(&self, new: NewTransaction) -> Result<Transaction, GatewayError> {
        let rows = self
            .gateway
            .insert(Table::Transactions, vec![serde_json::to_value(&new)?])
            .await?;
        decode_first(rows, Table::Transactions)
    }

    /// Insert all line items for a transaction in one write.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the write fails.
    pub async fn insert_items(
        &self,
        items: Vec<NewTransactionItem>,
    ) -> Result<(), GatewayError> {
        let rows = items
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.gateway.insert(Table::TransactionItems, rows).await?;
        Ok(())
    }

    /// The latest transactions recorded by one user.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the read or decode fails.
    pub async fn recent_for_user(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> Result<Vec<Transaction>, GatewayError> {
        let rows = self
            .gateway
            .select(
                Table::Transactions,
                SelectQuery::new()
                    .filter(Filter::eq("user_id", user_id.to_string()))
                    .order_desc("created_at")
                    .limit(limit),
            )
            .await?;
        decode_rows(rows)
    }

    /// Every transaction, newest first. Reports aggregate over this.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the read or decode fails.
    pub async fn list_all(&self) -> Result<Vec<Transaction>, GatewayError> {
        let rows = self
            .gateway
            .select(
                Table::Transactions,
                SelectQuery::new().order_desc("created_at"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Every line item. Joined in memory against products for the
    /// top-sellers figures.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the read or decode fails.
    pub async fn list_items(&self) -> Result<Vec<TransactionItem>, GatewayError> {
        let rows = self
            .gateway
            .select(Table::TransactionItems, SelectQuery::new())
            .await?;
        decode_rows(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use rust_decimal::Decimal;
    use tillpoint_core::{PaymentMethod, ProductId, TransactionStatus};

    fn new_transaction(user_id: UserId, total: Decimal) -> NewTransaction {
        NewTransaction {
            user_id,
            total_amount: total,
            payment_method: PaymentMethod::Cash,
            customer_name: None,
            customer_email: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_status_and_timestamp() {
        let gateway = MemoryGateway::new();
        let repo = TransactionRepository::new(&gateway);

        let created = repo
            .create(new_transaction(UserId::random(), Decimal::new(2550, 2)))
            .await
            .unwrap();

        assert_eq!(created.total_amount, Decimal::new(2550, 2));
        assert_eq!(created.status, TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn test_recent_for_user_filters_and_limits() {
        let gateway = MemoryGateway::new();
        let repo = TransactionRepository::new(&gateway);
        let cashier = UserId::random();
        let other = UserId::random();

        for i in 1..=7 {
            repo.create(new_transaction(cashier, Decimal::new(i, 0)))
                .await
                .unwrap();
        }
        repo.create(new_transaction(other, Decimal::new(99, 0)))
            .await
            .unwrap();

        let recent = repo.recent_for_user(cashier, 5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert!(recent.iter().all(|t| t.user_id == cashier));
    }

    #[tokio::test]
    async fn test_insert_items_round_trips() {
        let gateway = MemoryGateway::new();
        let repo = TransactionRepository::new(&gateway);

        let transaction = repo
            .create(new_transaction(UserId::random(), Decimal::new(2000, 2)))
            .await
            .unwrap();

        repo.insert_items(vec![NewTransactionItem {
            transaction_id: transaction.id,
            product_id: ProductId::random(),
            quantity: 2,
            unit_price: Decimal::new(1000, 2),
            total_price: Decimal::new(2000, 2),
        }])
        .await
        .unwrap();

        let items = repo.list_items().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().transaction_id, transaction.id);
    }
}
