use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;

use super::dashboard_model::DashboardSummary;
use super::dashboard_traits::DashboardServiceTrait;
use crate::errors::Result;
use crate::products::ProductServiceTrait;
use crate::receipts::ReceiptServiceTrait;

pub struct DashboardService {
    product_service: Arc<dyn ProductServiceTrait>,
    receipt_service: Arc<dyn ReceiptServiceTrait>,
}

impl DashboardService {
    pub fn new(
        product_service: Arc<dyn ProductServiceTrait>,
        receipt_service: Arc<dyn ReceiptServiceTrait>,
    ) -> Self {
        Self {
            product_service,
            receipt_service,
        }
    }
}

#[async_trait]
impl DashboardServiceTrait for DashboardService {
    async fn summary(&self, now: DateTime<Utc>) -> Result<DashboardSummary> {
        let products = self.product_service.list_products().await?;
        let monthly_spend = self.receipt_service.monthly_spend(now).await?;
        let low_stock_count = products.iter().filter(|p| p.is_low_stock()).count();

        debug!(
            "Dashboard: {} products, {} low on stock, {} spent this month",
            products.len(),
            low_stock_count,
            monthly_spend
        );

        Ok(DashboardSummary {
            total_products: products.len(),
            low_stock_count,
            monthly_spend,
        })
    }
}
