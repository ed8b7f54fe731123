//! Cart state for one checkout session.
//!
//! An ordered collection of product/quantity lines, keyed by product
//! id with insertion order preserved for display. Every line carries a
//! snapshot of the product taken when it was added: price and name for
//! display, stock quantity as the upper bound on the line's quantity.
//! All operations are synchronous and in-process; nothing here touches
//! the network.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tillpoint_core::ProductId;

use crate::models::Product;

/// Error signalled by cart mutations. Non-fatal: the cart is left
/// unchanged and the message is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// The requested quantity exceeds the stock recorded at add-time.
    #[error("Not enough stock available")]
    StockExceeded,
}

/// Product snapshot captured when a line is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    /// Stock quantity observed at add-time; the line's quantity may
    /// never exceed it. Checkout also decrements from this value
    /// rather than re-reading the store.
    pub stock_limit: u32,
    pub quantity: u32,
}

impl CartLine {
    /// Line total (unit price × quantity).
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The cart for one checkout session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product`.
    ///
    /// If the product is already in the cart its quantity is bumped by
    /// one, bounded by the stock limit recorded when it was first
    /// added. A product that is out of stock is never added.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StockExceeded`] if the bump (or the initial
    /// add of an out-of-stock product) would exceed the stock limit;
    /// the cart is left unchanged.
    pub fn add(&mut self, product: &Product) -> Result<(), CartError> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            if line.quantity >= line.stock_limit {
                return Err(CartError::StockExceeded);
            }
            line.quantity += 1;
            return Ok(());
        }

        let stock_limit = u32::try_from(product.stock_quantity).unwrap_or(0);
        if stock_limit == 0 {
            return Err(CartError::StockExceeded);
        }

        self.lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            stock_limit,
            quantity: 1,
        });
        Ok(())
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero removes the line. A missing line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::StockExceeded`] if `quantity` exceeds the
    /// line's recorded stock limit; the cart is left unchanged.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove(product_id);
            return Ok(());
        }

        let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) else {
            return Ok(());
        };

        if quantity > line.stock_limit {
            return Err(CartError::StockExceeded);
        }

        line.quantity = quantity;
        Ok(())
    }

    /// Remove a line. Silent no-op if the product is not in the cart.
    pub fn remove(&mut self, product_id: ProductId) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Cart total, recomputed from the lines on every call.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::total).sum()
    }

    /// Empty the cart (after a successful checkout).
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines, in insertion order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
}
