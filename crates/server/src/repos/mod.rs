//! Typed repositories over the data gateway.
//!
//! Each repository wraps the generic table-scoped gateway operations
//! with the domain types for one table, decoding raw JSON rows into
//! models and encoding writes back.

mod products;
mod profiles;
mod transactions;

pub use products::ProductRepository;
pub use profiles::ProfileRepository;
pub use transactions::TransactionRepository;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::gateway::{GatewayError, Table};

/// Decode a batch of rows into domain types.
fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, GatewayError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(GatewayError::from))
        .collect()
}

/// Decode the single row a returning write must produce.
fn decode_first<T: DeserializeOwned>(rows: Vec<Value>, table: Table) -> Result<T, GatewayError> {
    let row = rows.into_iter().next().ok_or(GatewayError::MissingRow(table))?;
    serde_json::from_value(row).map_err(GatewayError::from)
}
