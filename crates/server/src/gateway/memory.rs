//! In-memory implementation of the data gateway for tests.
//!
//! Holds every table as a vector of JSON rows and evaluates the same
//! select/insert/update/delete contract the HTTP gateway speaks.
//! Individual operations can be scripted to fail, which is how the
//! checkout partial-failure scenarios are exercised.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use tillpoint_core::UserId;

use super::{AuthUser, DataGateway, Filter, GatewayError, Op, SelectQuery, Table};

/// Operation kind used to target failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Debug)]
struct FailureRule {
    op: OpKind,
    table: Table,
    remaining: usize,
}

/// In-process stand-in for the remote store.
#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    users: Mutex<HashMap<String, (UserId, String)>>,
    failures: Mutex<Vec<FailureRule>>,
}

impl MemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next matching operation fail.
    pub async fn fail_on(&self, op: OpKind, table: Table) {
        self.fail_on_nth(op, table, 1).await;
    }

    /// Make the `nth` matching operation (1-based) fail.
    pub async fn fail_on_nth(&self, op: OpKind, table: Table, nth: usize) {
        self.failures.lock().await.push(FailureRule {
            op,
            table,
            remaining: nth,
        });
    }

    /// Register a sign-in identity for [`DataGateway::sign_in`].
    pub async fn add_user(&self, id: UserId, email: &str, password: &str) {
        self.users
            .lock()
            .await
            .insert(email.to_owned(), (id, password.to_owned()));
    }

    /// Snapshot of a table's rows, for assertions.
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .lock()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    async fn check_failure(&self, op: OpKind, table: Table) -> Result<(), GatewayError> {
        let mut failures = self.failures.lock().await;
        let mut fire = false;
        for rule in failures.iter_mut() {
            if rule.op == op && rule.table == table {
                rule.remaining -= 1;
                if rule.remaining == 0 {
                    fire = true;
                }
            }
        }
        failures.retain(|rule| rule.remaining > 0);
        if fire {
            return Err(GatewayError::Api {
                status: 500,
                message: format!("injected {table} failure"),
            });
        }
        Ok(())
    }
}

/// Order two JSON scalars; mismatched or non-scalar types are treated
/// as incomparable.
fn cmp_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn matches_filter(row: &Value, filter: &Filter) -> bool {
    let Some(field) = row.get(filter.column) else {
        return false;
    };
    match filter.op {
        Op::Eq => field == &filter.value,
        Op::Gt => cmp_values(field, &filter.value) == Some(Ordering::Greater),
    }
}

/// Fill the columns the store itself would default on insert.
fn apply_row_defaults(table: Table, row: &mut Value) {
    let Some(object) = row.as_object_mut() else {
        return;
    };

    let now = Value::String(Utc::now().to_rfc3339());

    object
        .entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));

    if matches!(table, Table::Products | Table::Transactions | Table::Profiles) {
        object.entry("created_at").or_insert_with(|| now.clone());
    }
    if table == Table::Products {
        object.entry("updated_at").or_insert(now);
    }
    if table == Table::Transactions {
        object
            .entry("status")
            .or_insert_with(|| Value::String("completed".to_owned()));
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn select(&self, table: Table, query: SelectQuery) -> Result<Vec<Value>, GatewayError> {
        self.check_failure(OpKind::Select, table).await?;

        let tables = self.tables.lock().await;
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches_filter(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = match (a.get(order.column), b.get(order.column)) {
                    (Some(x), Some(y)) => cmp_values(x, y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        self.check_failure(OpKind::Insert, table).await?;

        let mut created = Vec::with_capacity(rows.len());
        let mut tables = self.tables.lock().await;
        let stored = tables.entry(table).or_default();
        for mut row in rows {
            apply_row_defaults(table, &mut row);
            stored.push(row.clone());
            created.push(row);
        }
        Ok(created)
    }

    async fn update(
        &self,
        table: Table,
        patch: Value,
        filter: Filter,
    ) -> Result<Vec<Value>, GatewayError> {
        self.check_failure(OpKind::Update, table).await?;

        let Some(patch_object) = patch.as_object() else {
            return Err(GatewayError::Api {
                status: 400,
                message: "patch must be an object".to_owned(),
            });
        };

        let mut tables = self.tables.lock().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(&table) {
            for row in rows.iter_mut().filter(|row| matches_filter(row, &filter)) {
                if let Some(object) = row.as_object_mut() {
                    for (key, value) in patch_object {
                        object.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: Filter) -> Result<(), GatewayError> {
        self.check_failure(OpKind::Delete, table).await?;

        let mut tables = self.tables.lock().await;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|row| !matches_filter(row, &filter));
        }
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, GatewayError> {
        let users = self.users.lock().await;
        match users.get(email) {
            Some((id, stored)) if stored == password => Ok(AuthUser {
                id: *id,
                email: email.to_owned(),
            }),
            _ => Err(GatewayError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_select_applies_filter_order_and_limit() {
        let gateway = MemoryGateway::new();
        gateway
            .insert(
                Table::Products,
                vec![
                    json!({"name": "Aqua", "stock_quantity": 0}),
                    json!({"name": "Pencil 2B", "stock_quantity": 12}),
                    json!({"name": "Buku Sidu", "stock_quantity": 4}),
                ],
            )
            .await
            .unwrap();

        let rows = gateway
            .select(
                Table::Products,
                SelectQuery::new()
                    .filter(Filter::gt("stock_quantity", 0))
                    .order_asc("name")
                    .limit(1),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().unwrap().get("name").unwrap(), "Buku Sidu");
    }

    #[tokio::test]
    async fn test_insert_fills_id_and_timestamps() {
        let gateway = MemoryGateway::new();
        let created = gateway
            .insert(Table::Transactions, vec![json!({"total_amount": "5.00"})])
            .await
            .unwrap();

        let row = created.first().unwrap();
        assert!(row.get("id").unwrap().as_str().is_some());
        assert!(row.get("created_at").unwrap().as_str().is_some());
        assert_eq!(row.get("status").unwrap(), "completed");
    }

    #[tokio::test]
    async fn test_update_merges_patch_into_matching_rows() {
        let gateway = MemoryGateway::new();
        let created = gateway
            .insert(Table::Products, vec![json!({"name": "Aqua", "stock_quantity": 5})])
            .await
            .unwrap();
        let id = created.first().unwrap().get("id").unwrap().clone();

        let updated = gateway
            .update(
                Table::Products,
                json!({"stock_quantity": 3}),
                Filter::eq("id", id),
            )
            .await
            .unwrap();

        assert_eq!(updated.first().unwrap().get("stock_quantity").unwrap(), 3);
    }

    #[tokio::test]
    async fn test_nth_failure_fires_once_then_clears() {
        let gateway = MemoryGateway::new();
        gateway.fail_on_nth(OpKind::Update, Table::Products, 2).await;
        gateway
            .insert(Table::Products, vec![json!({"name": "Aqua"})])
            .await
            .unwrap();

        let filter = || Filter::eq("name", "Aqua");
        assert!(gateway
            .update(Table::Products, json!({"stock_quantity": 1}), filter())
            .await
            .is_ok());
        assert!(gateway
            .update(Table::Products, json!({"stock_quantity": 2}), filter())
            .await
            .is_err());
        assert!(gateway
            .update(Table::Products, json!({"stock_quantity": 3}), filter())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_sign_in_checks_password() {
        let gateway = MemoryGateway::new();
        let id = UserId::random();
        gateway.add_user(id, "cashier@example.com", "hunter2xyz").await;

        let user = gateway.sign_in("cashier@example.com", "hunter2xyz").await.unwrap();
        assert_eq!(user.id, id);
        assert!(matches!(
            gateway.sign_in("cashier@example.com", "wrong").await,
            Err(GatewayError::InvalidCredentials)
        ));
    }
}
