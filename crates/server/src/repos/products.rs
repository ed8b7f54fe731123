//! Product table operations.

use chrono::Utc;
use serde_json::Value;

use tillpoint_core::ProductId;

use super::{decode_first, decode_rows};
use crate::gateway::{DataGateway, Filter, GatewayError, SelectQuery, Table};
use crate::models::{NewProduct, Product, ProductPatch};

/// Repository for the `products` table.
pub struct ProductRepository<'a> {
    gateway: &'a dyn DataGateway,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(gateway: &'a dyn DataGateway) -> Self {
        Self { gateway }
    }

    /// All products, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the read or decode fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, GatewayError> {
        let rows = self
            .gateway
            .select(
                Table::Products,
                SelectQuery::new().order_desc("created_at"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Products with stock on hand, for the checkout picker.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the read or decode fails.
    pub async fn list_in_stock(&self) -> Result<Vec<Product>, GatewayError> {
        let rows = self
            .gateway
            .select(
                Table::Products,
                SelectQuery::new()
                    .filter(Filter::gt("stock_quantity", 0))
                    .order_asc("name"),
            )
            .await?;
        decode_rows(rows)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the write fails or returns no row.
    pub async fn create(&self, new: NewProduct) -> Result<Product, GatewayError> {
        let rows = self
            .gateway
            .insert(Table::Products, vec![serde_json::to_value(&new)?])
            .await?;
        decode_first(rows, Table::Products)
    }

    /// Apply a partial update, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the write fails or returns no row.
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, GatewayError> {
        let mut value = serde_json::to_value(&patch)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "updated_at".to_owned(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }

        let rows = self
            .gateway
            .update(Table::Products, value, Filter::eq("id", id.to_string()))
            .await?;
        decode_first(rows, Table::Products)
    }

    /// Overwrite a product's stock level.
    ///
    /// Used by checkout's decrement step: the caller supplies the new
    /// absolute value computed from the cart-line snapshot, not a delta.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the write fails.
    pub async fn set_stock(&self, id: ProductId, stock_quantity: i32) -> Result<(), GatewayError> {
        self.gateway
            .update(
                Table::Products,
                serde_json::json!({
                    "stock_quantity": stock_quantity,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
                Filter::eq("id", id.to_string()),
            )
            .await?;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] if the write fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), GatewayError> {
        self.gateway
            .delete(Table::Products, Filter::eq("id", id.to_string()))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use rust_decimal::Decimal;

    fn new_product(name: &str, stock: i32) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            description: None,
            price: Decimal::new(550, 2),
            stock_quantity: stock,
            category: Some("Drinks".to_owned()),
            sku: None,
        }
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let gateway = MemoryGateway::new();
        let repo = ProductRepository::new(&gateway);

        let created = repo.create(new_product("Aqua", 12)).await.unwrap();
        assert_eq!(created.name, "Aqua");
        assert_eq!(created.stock_quantity, 12);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_in_stock_excludes_empty_shelves() {
        let gateway = MemoryGateway::new();
        let repo = ProductRepository::new(&gateway);

        repo.create(new_product("Aqua", 3)).await.unwrap();
        repo.create(new_product("Pop Mie", 0)).await.unwrap();

        let in_stock = repo.list_in_stock().await.unwrap();
        assert_eq!(in_stock.len(), 1);
        assert_eq!(in_stock.first().unwrap().name, "Aqua");
    }

    #[tokio::test]
    async fn test_set_stock_overwrites_value() {
        let gateway = MemoryGateway::new();
        let repo = ProductRepository::new(&gateway);

        let created = repo.create(new_product("Aqua", 10)).await.unwrap();
        repo.set_stock(created.id, 7).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.first().unwrap().stock_quantity, 7);
    }

    #[tokio::test]
    async fn test_update_patches_only_set_fields() {
        let gateway = MemoryGateway::new();
        let repo = ProductRepository::new(&gateway);

        let created = repo.create(new_product("Aqua", 10)).await.unwrap();
        let updated = repo
            .update(
                created.id,
                ProductPatch {
                    price: Some(Decimal::new(600, 2)),
                    ..ProductPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.price, Decimal::new(600, 2));
        assert_eq!(updated.name, "Aqua");
        assert_eq!(updated.stock_quantity, 10);
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let gateway = MemoryGateway::new();
        let repo = ProductRepository::new(&gateway);

        let created = repo.create(new_product("Aqua", 10)).await.unwrap();
        repo.delete(created.id).await.unwrap();

        assert!(repo.list_all().await.unwrap().is_empty());
    }
}
