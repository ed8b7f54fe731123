//! HTTP implementation of the data gateway.
//!
//! Speaks the store's REST dialect with `reqwest`: one resource path
//! per table, filters and ordering as query-string parameters, writes
//! with `Prefer: return=representation` so created/updated rows come
//! back in the response body.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;

use tillpoint_core::UserId;

use super::{AuthUser, DataGateway, Filter, GatewayError, SelectQuery, Table};
use crate::config::GatewayConfig;

/// Client for the remote data store's REST and auth endpoints.
#[derive(Clone)]
pub struct RestGateway {
    inner: Arc<RestGatewayInner>,
}

struct RestGatewayInner {
    client: reqwest::Client,
    rest_endpoint: String,
    auth_endpoint: String,
    service_key: String,
}

impl RestGateway {
    /// Create a gateway client from configuration.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        let base = config.url.trim_end_matches('/');

        Self {
            inner: Arc::new(RestGatewayInner {
                client: reqwest::Client::new(),
                rest_endpoint: format!("{base}/rest/v1"),
                auth_endpoint: format!("{base}/auth/v1"),
                service_key: config.service_key.expose_secret().to_string(),
            }),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.inner.rest_endpoint, table.name())
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.inner.service_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.inner.service_key),
            )
    }

    /// Render a filter value into the query-string syntax.
    ///
    /// Strings go in bare (the store parses them positionally); other
    /// scalars use their JSON rendering.
    fn render_value(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn query_pairs(query: &SelectQuery) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_owned(), "*".to_owned())];

        for filter in &query.filters {
            pairs.push((
                filter.column.to_owned(),
                format!("{}.{}", filter.op.keyword(), Self::render_value(&filter.value)),
            ));
        }

        if let Some(order) = &query.order {
            let direction = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_owned(), format!("{}.{direction}", order.column)));
        }

        if let Some(limit) = query.limit {
            pairs.push(("limit".to_owned(), limit.to_string()));
        }

        pairs
    }

    /// Send a request and decode the response rows, surfacing rate
    /// limits and structured API errors.
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Vec<Value>, GatewayError> {
        let response = self.authed(request).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(GatewayError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "gateway returned non-success status"
            );
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        if body.is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&body)? {
            Value::Array(rows) => Ok(rows),
            single => Ok(vec![single]),
        }
    }
}

/// Pull the human-readable message out of a structured error body,
/// falling back to the (truncated) raw body.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error_description"))
                .or_else(|| v.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl DataGateway for RestGateway {
    async fn select(&self, table: Table, query: SelectQuery) -> Result<Vec<Value>, GatewayError> {
        let request = self
            .inner
            .client
            .get(self.table_url(table))
            .query(&Self::query_pairs(&query));
        self.execute(request).await
    }

    async fn insert(&self, table: Table, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError> {
        let request = self
            .inner
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);
        self.execute(request).await
    }

    async fn update(
        &self,
        table: Table,
        patch: Value,
        filter: Filter,
    ) -> Result<Vec<Value>, GatewayError> {
        let query = SelectQuery::new().filter(filter);
        let request = self
            .inner
            .client
            .patch(self.table_url(table))
            .query(&Self::query_pairs(&query))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.execute(request).await
    }

    async fn delete(&self, table: Table, filter: Filter) -> Result<(), GatewayError> {
        let query = SelectQuery::new().filter(filter);
        let request = self
            .inner
            .client
            .delete(self.table_url(table))
            .query(&Self::query_pairs(&query));
        self.execute(request).await?;
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, GatewayError> {
        let response = self
            .inner
            .client
            .post(format!(
                "{}/token?grant_type=password",
                self.inner.auth_endpoint
            ))
            .header("apikey", &self.inner.service_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(GatewayError::InvalidCredentials);
        }

        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: extract_message(&body),
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        let user = value.get("user").ok_or(GatewayError::MissingRow(Table::Profiles))?;
        let id: UserId = serde_json::from_value(
            user.get("id")
                .cloned()
                .ok_or(GatewayError::MissingRow(Table::Profiles))?,
        )?;
        let email = user
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or(email)
            .to_owned();

        Ok(AuthUser { id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_pairs_renders_filters_order_limit() {
        let query = SelectQuery::new()
            .filter(Filter::gt("stock_quantity", 0))
            .order_desc("created_at")
            .limit(5);

        let pairs = RestGateway::query_pairs(&query);
        assert!(pairs.contains(&("select".to_owned(), "*".to_owned())));
        assert!(pairs.contains(&("stock_quantity".to_owned(), "gt.0".to_owned())));
        assert!(pairs.contains(&("order".to_owned(), "created_at.desc".to_owned())));
        assert!(pairs.contains(&("limit".to_owned(), "5".to_owned())));
    }

    #[test]
    fn test_render_value_strings_are_bare() {
        let id = "4a9f0f1e-1111-2222-3333-444455556666";
        assert_eq!(RestGateway::render_value(&Value::String(id.to_owned())), id);
        assert_eq!(RestGateway::render_value(&serde_json::json!(10)), "10");
    }

    #[test]
    fn test_extract_message_prefers_structured_body() {
        let body = r#"{"message":"duplicate key value"}"#;
        assert_eq!(extract_message(body), "duplicate key value");
        assert_eq!(extract_message("plain text"), "plain text");
    }
}
