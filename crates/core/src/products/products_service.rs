use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::products_model::{NewProduct, Product, ProductUpdate};
use super::products_traits::{ProductRepositoryTrait, ProductServiceTrait};
use crate::errors::{Error, Result};
use crate::identity::{require_user, IdentityProviderTrait};

pub struct ProductService {
    repository: Arc<dyn ProductRepositoryTrait>,
    identity: Arc<dyn IdentityProviderTrait>,
}

impl ProductService {
    pub fn new(
        repository: Arc<dyn ProductRepositoryTrait>,
        identity: Arc<dyn IdentityProviderTrait>,
    ) -> Self {
        Self {
            repository,
            identity,
        }
    }
}

#[async_trait]
impl ProductServiceTrait for ProductService {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let user = require_user(self.identity.as_ref())?;
        self.repository.list_products(&user.id).await
    }

    async fn get_product(&self, product_id: &str) -> Result<Product> {
        let user = require_user(self.identity.as_ref())?;
        self.repository.get_product(&user.id, product_id).await
    }

    /// Creates a product after enforcing the plan's stock cap
    async fn create_product(&self, new_product: NewProduct) -> Result<Product> {
        let user = require_user(self.identity.as_ref())?;
        let new_product = new_product.normalized()?;

        let quota = user.subscription_plan.quota();
        if let Some(max) = quota.max_products {
            let current = self.repository.list_products(&user.id).await?.len();
            if !quota.allows_products(current) {
                return Err(Error::PlanLimitReached(format!(
                    "The {} plan allows at most {} products",
                    user.subscription_plan.as_str(),
                    max
                )));
            }
        }

        debug!("Creating product '{}' for {}", new_product.name, user.id);
        self.repository.insert_product(&user.id, new_product).await
    }

    async fn update_product(&self, update: ProductUpdate) -> Result<Product> {
        let user = require_user(self.identity.as_ref())?;
        update.validate()?;
        self.repository.update_product(&user.id, update).await
    }

    async fn delete_product(&self, product_id: &str) -> Result<()> {
        let user = require_user(self.identity.as_ref())?;
        self.repository.delete_product(&user.id, product_id).await?;
        info!("Deleted product {} for {}", product_id, user.id);
        Ok(())
    }

    async fn low_stock_products(&self) -> Result<Vec<Product>> {
        Ok(self
            .list_products()
            .await?
            .into_iter()
            .filter(Product::is_low_stock)
            .collect())
    }
}
