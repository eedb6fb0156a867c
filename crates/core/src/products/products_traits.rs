use async_trait::async_trait;

use super::products_model::{NewProduct, Product, ProductUpdate};
use crate::errors::Result;

/// Trait for product repository operations, scoped by owner
#[async_trait]
pub trait ProductRepositoryTrait: Send + Sync {
    /// Lists the owner's products ordered by name.
    async fn list_products(&self, owner: &str) -> Result<Vec<Product>>;
    async fn get_product(&self, owner: &str, product_id: &str) -> Result<Product>;
    async fn insert_product(&self, owner: &str, new_product: NewProduct) -> Result<Product>;
    async fn update_product(&self, owner: &str, update: ProductUpdate) -> Result<Product>;
    async fn delete_product(&self, owner: &str, product_id: &str) -> Result<()>;
}

/// Trait for product service operations
#[async_trait]
pub trait ProductServiceTrait: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn get_product(&self, product_id: &str) -> Result<Product>;
    async fn create_product(&self, new_product: NewProduct) -> Result<Product>;
    async fn update_product(&self, update: ProductUpdate) -> Result<Product>;
    async fn delete_product(&self, product_id: &str) -> Result<()>;
    async fn low_stock_products(&self) -> Result<Vec<Product>>;
}
