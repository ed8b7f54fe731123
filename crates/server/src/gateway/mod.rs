//! Remote data gateway contract.
//!
//! The dashboard owns no storage: every product, transaction, and
//! profile row lives in a remote relational store reached over HTTP.
//! [`DataGateway`] is the seam between the application and that store:
//! table-scoped select/insert/update/delete plus the sign-in call of
//! the store's auth provider.
//!
//! Two implementations exist: [`RestGateway`] speaks the store's REST
//! dialect with `reqwest`, and [`MemoryGateway`] evaluates the same
//! contract in-process for tests.

mod memory;
mod query;
mod rest;

pub use memory::{MemoryGateway, OpKind};
pub use query::{Filter, Op, Order, SelectQuery};
pub use rest::RestGateway;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use tillpoint_core::UserId;

/// Tables the dashboard reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Products,
    Transactions,
    TransactionItems,
    Profiles,
}

impl Table {
    /// Table name as it appears in the store.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Transactions => "transactions",
            Self::TransactionItems => "transaction_items",
            Self::Profiles => "profiles",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors returned by gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request with a structured error.
    #[error("gateway rejected request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The store asked us to back off.
    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    /// The response body could not be decoded.
    #[error("failed to parse gateway response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A write that should return its row returned nothing.
    #[error("gateway returned no row for {0}")]
    MissingRow(Table),

    /// The auth provider rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Error observed through the query cache's shared in-flight fetch.
    #[error("{0}")]
    Shared(Arc<GatewayError>),
}

impl From<Arc<Self>> for GatewayError {
    fn from(err: Arc<Self>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(Self::Shared)
    }
}

/// Identity returned by the auth provider on successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// Table-scoped read/write operations against the remote store.
///
/// Every method returns either rows (as raw JSON values, decoded by the
/// typed repositories in [`crate::repos`]) or a [`GatewayError`].
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Read rows matching `query`.
    async fn select(&self, table: Table, query: SelectQuery) -> Result<Vec<Value>, GatewayError>;

    /// Insert rows, returning the created representations.
    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError>;

    /// Patch rows matching `filter`, returning the updated representations.
    async fn update(
        &self,
        table: Table,
        patch: Value,
        filter: Filter,
    ) -> Result<Vec<Value>, GatewayError>;

    /// Delete rows matching `filter`.
    async fn delete(&self, table: Table, filter: Filter) -> Result<(), GatewayError>;

    /// Exchange credentials for a user identity with the auth provider.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, GatewayError>;
}
