use std::sync::Arc;

use async_trait::async_trait;
use givd_core::constants::PRODUCTS_TABLE;
use givd_core::errors::{Error, Result};
use givd_core::products::{NewProduct, Product, ProductRepositoryTrait, ProductUpdate};

use super::model::{NewProductRow, ProductPatch, ProductRow};
use crate::client::{Query, RestClient};

pub struct ProductRepository {
    client: Arc<RestClient>,
}

impl ProductRepository {
    pub fn new(client: Arc<RestClient>) -> Self {
        ProductRepository { client }
    }

    fn by_id(owner: &str, product_id: &str) -> Query {
        Query::all().eq("id", product_id).eq("user_id", owner)
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    async fn list_products(&self, owner: &str) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = self
            .client
            .select(PRODUCTS_TABLE, &Query::all().eq("user_id", owner).order_asc("name"))
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, owner: &str, product_id: &str) -> Result<Product> {
        let rows: Vec<ProductRow> = self
            .client
            .select(PRODUCTS_TABLE, &Self::by_id(owner, product_id).limit(1))
            .await?;
        rows.into_iter()
            .next()
            .map(Product::from)
            .ok_or_else(|| Error::NotFound(format!("Product {}", product_id)))
    }

    async fn insert_product(&self, owner: &str, new_product: NewProduct) -> Result<Product> {
        let rows: Vec<ProductRow> = self
            .client
            .insert(PRODUCTS_TABLE, &[NewProductRow::new(owner, new_product)])
            .await?;
        rows.into_iter()
            .next()
            .map(Product::from)
            .ok_or_else(|| Error::Unexpected("Insert returned no product row".to_string()))
    }

    async fn update_product(&self, owner: &str, update: ProductUpdate) -> Result<Product> {
        let product_id = update.id.clone();
        let rows: Vec<ProductRow> = self
            .client
            .update(
                PRODUCTS_TABLE,
                &Self::by_id(owner, &product_id),
                &ProductPatch::from(update),
            )
            .await?;
        rows.into_iter()
            .next()
            .map(Product::from)
            .ok_or_else(|| Error::NotFound(format!("Product {}", product_id)))
    }

    async fn delete_product(&self, owner: &str, product_id: &str) -> Result<()> {
        let deleted = self
            .client
            .delete(PRODUCTS_TABLE, &Self::by_id(owner, product_id))
            .await?;
        if deleted == 0 {
            return Err(Error::NotFound(format!("Product {}", product_id)));
        }
        Ok(())
    }
}
