//! Query description types for the remote data gateway.
//!
//! A [`SelectQuery`] captures the filter/order/limit shape the gateway
//! contract exposes. Both the HTTP implementation (which renders these
//! as query-string parameters) and the in-memory implementation (which
//! evaluates them against stored rows) consume the same description.

use serde_json::Value;

/// Comparison operator for a row filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gt,
}

impl Op {
    /// Wire keyword used in the gateway's query-string syntax.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gt => "gt",
        }
    }
}

/// A single column filter.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: &'static str,
    pub op: Op,
    pub value: Value,
}

impl Filter {
    /// Equality filter.
    #[must_use]
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            op: Op::Eq,
            value: value.into(),
        }
    }

    /// Strictly-greater-than filter.
    #[must_use]
    pub fn gt(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            op: Op::Gt,
            value: value.into(),
        }
    }
}

/// Sort direction for an ordered select.
#[derive(Debug, Clone)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

/// Declarative read request: filters, optional ordering, optional limit.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl SelectQuery {
    /// Start an unconstrained query (all rows).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order ascending by a column.
    #[must_use]
    pub fn order_asc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            descending: false,
        });
        self
    }

    /// Order descending by a column.
    #[must_use]
    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            descending: true,
        });
        self
    }

    /// Cap the number of returned rows.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates_clauses() {
        let query = SelectQuery::new()
            .filter(Filter::gt("stock_quantity", 0))
            .order_asc("name")
            .limit(5);

        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.limit, Some(5));
        let order = query.order.expect("order set");
        assert_eq!(order.column, "name");
        assert!(!order.descending);
    }

    #[test]
    fn test_op_keywords() {
        assert_eq!(Op::Eq.keyword(), "eq");
        assert_eq!(Op::Gt.keyword(), "gt");
    }
}
