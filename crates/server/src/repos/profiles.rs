//! User-profile table operations.
//!
//! Profiles are owned by the session/role provider; the dashboard only
//! reads them, for display names and the role claim.

use std::collections::HashMap;

use super::decode_rows;
use crate::gateway::{DataGateway, Filter, GatewayError, SelectQuery, Table};
use crate::models::Profile;

use tillpoint_core::UserId;

/// Read-only repository for the `profiles` table.
pub struct ProfileRepository<'a> {
    gateway: &'a dyn DataGateway,
}

impl<'a> ProfileRepository<'a> {
    #[must_use]
    pub const fn new(gateway: &'a dyn DataGateway) -> Self {
        Self { gateway }
    }

    /// One user's profile, if the provider has written one.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the read or decode fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Profile>, GatewayError> {
        let rows = self
            .gateway
            .select(
                Table::Profiles,
                SelectQuery::new()
                    .filter(Filter::eq("id", user_id.to_string()))
                    .limit(1),
            )
            .await?;
        Ok(decode_rows::<Profile>(rows)?.into_iter().next())
    }

    /// Display names keyed by user id, for joining onto transactions.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the read or decode fails.
    pub async fn display_names(&self) -> Result<HashMap<UserId, String>, GatewayError> {
        let rows = self.gateway.select(Table::Profiles, SelectQuery::new()).await?;
        let profiles: Vec<Profile> = decode_rows(rows)?;
        Ok(profiles
            .into_iter()
            .filter_map(|p| p.full_name.map(|name| (p.id, name)))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_returns_none_for_unknown_user() {
        let gateway = MemoryGateway::new();
        let repo = ProfileRepository::new(&gateway);
        assert!(repo.get(UserId::random()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_display_names_skips_profiles_without_names() {
        let gateway = MemoryGateway::new();
        let named = UserId::random();
        let unnamed = UserId::random();
        gateway
            .insert(
                Table::Profiles,
                vec![
                    json!({"id": named.to_string(), "full_name": "Dewi", "role": "admin"}),
                    json!({"id": unnamed.to_string(), "full_name": null, "role": "cashier"}),
                ],
            )
            .await
            .unwrap();

        let repo = ProfileRepository::new(&gateway);
        let names = repo.display_names().await.unwrap();
        assert_eq!(names.get(&named).map(String::as_str), Some("Dewi"));
        assert!(!names.contains_key(&unnamed));
    }
}
