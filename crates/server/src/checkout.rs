//! Checkout orchestration.
//!
//! A sale is recorded as a fixed sequence of independent writes with
//! no surrounding transaction: total, header row, line items, then one
//! stock overwrite per cart line. There is no rollback. A failure
//! partway leaves the earlier writes in place, so the caller must
//! surface the error and leave the cart intact for a retry.

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use tillpoint_core::{PaymentMethod, TransactionId, UserId};

use crate::cart::Cart;
use crate::gateway::{DataGateway, GatewayError};
use crate::models::{NewTransaction, NewTransactionItem};
use crate::repos::{ProductRepository, TransactionRepository};

/// What the cashier filled in on the checkout form.
#[derive(Debug, Clone)]
pub struct CheckoutDetails {
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

/// Outcome of a completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub transaction_id: TransactionId,
    pub total: Decimal,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Record a sale from the cart's contents.
///
/// Steps, in order: compute the total from the cart lines; insert the
/// transaction header; insert all line items; overwrite each product's
/// stock with its add-time snapshot minus the quantity sold. The stock
/// arithmetic deliberately uses the snapshot from the cart line rather
/// than re-reading the store, so a concurrent sale of the same product
/// can lose its decrement.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] without writing anything if the
/// cart has no lines. Returns [`CheckoutError::Gateway`] if any write
/// fails; writes that already succeeded are not undone.
#[instrument(skip(gateway, cart, details), fields(lines = cart.len()))]
pub async fn checkout(
    gateway: &dyn DataGateway,
    user_id: UserId,
    cart: &Cart,
    details: CheckoutDetails,
) -> Result<CheckoutReceipt, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let total = cart.total();
    let transactions = TransactionRepository::new(gateway);
    let products = ProductRepository::new(gateway);

    // Blank form fields are stored as null; the display layer falls
    // back to "Walk-in" when the name is missing.
    let customer_name = details.customer_name.filter(|n| !n.trim().is_empty());
    let customer_email = details.customer_email.filter(|e| !e.trim().is_empty());

    let transaction = transactions
        .create(NewTransaction {
            user_id,
            total_amount: total,
            payment_method: details.payment_method,
            customer_name,
            customer_email,
        })
        .await?;

    let items = cart
        .lines()
        .iter()
        .map(|line| NewTransactionItem {
            transaction_id: transaction.id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            total_price: line.total(),
        })
        .collect();
    transactions.insert_items(items).await?;

    for line in cart.lines() {
        let remaining = i64::from(line.stock_limit) - i64::from(line.quantity);
        let remaining = i32::try_from(remaining.max(0)).unwrap_or(0);
        if let Err(error) = products.set_stock(line.product_id, remaining).await {
            warn!(
                transaction_id = %transaction.id,
                product_id = %line.product_id,
                "stock update failed after sale was recorded"
            );
            return Err(error.into());
        }
    }

    info!(transaction_id = %transaction.id, %total, "sale recorded");
    Ok(CheckoutReceipt {
        transaction_id: transaction.id,
        total,
    })
}
