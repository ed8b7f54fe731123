//! Transaction and line-item domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::{PaymentMethod, ProductId, TransactionId, TransactionStatus, UserId};

/// A recorded sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a transaction header.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    pub user_id: UserId,
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

/// One line of a recorded sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionItem {
    pub transaction_id: TransactionId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Fields for creating a line item.
#[derive(Debug, Clone, Serialize)]
pub struct NewTransactionItem {
    pub transaction_id: TransactionId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// A transaction joined with its cashier's display name.
#[derive(Debug, Clone)]
pub struct TransactionWithCashier {
    pub transaction: Transaction,
    pub cashier_name: Option<String>,
}
