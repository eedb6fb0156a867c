use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use super::receipts_model::{start_of_month, NewReceipt, Receipt};
use super::receipts_traits::{ReceiptRepositoryTrait, ReceiptServiceTrait};
use crate::errors::{Error, Result};
use crate::identity::{require_user, IdentityProviderTrait};

pub struct ReceiptService {
    repository: Arc<dyn ReceiptRepositoryTrait>,
    identity: Arc<dyn IdentityProviderTrait>,
}

impl ReceiptService {
    pub fn new(
        repository: Arc<dyn ReceiptRepositoryTrait>,
        identity: Arc<dyn IdentityProviderTrait>,
    ) -> Self {
        Self {
            repository,
            identity,
        }
    }
}

#[async_trait]
impl ReceiptServiceTrait for ReceiptService {
    async fn list_receipts(&self) -> Result<Vec<Receipt>> {
        let user = require_user(self.identity.as_ref())?;
        self.repository.list_receipts(&user.id).await
    }

    async fn create_receipt(&self, new_receipt: NewReceipt) -> Result<Receipt> {
        let user = require_user(self.identity.as_ref())?;
        new_receipt.validate()?;

        let quota = user.subscription_plan.quota();
        if let Some(max) = quota.max_receipts_per_month {
            let this_month = self
                .repository
                .list_receipts_since(&user.id, start_of_month(Utc::now()))
                .await?
                .len();
            if !quota.allows_receipts(this_month) {
                return Err(Error::PlanLimitReached(format!(
                    "The {} plan allows {} receipts per month",
                    user.subscription_plan.as_str(),
                    max
                )));
            }
        }

        debug!(
            "Recording receipt from '{}' ({}) for {}",
            new_receipt.store_name, new_receipt.total_amount, user.id
        );
        self.repository.insert_receipt(&user.id, new_receipt).await
    }

    /// Sum of receipt totals created since the first day of the current month
    async fn monthly_spend(&self, now: DateTime<Utc>) -> Result<Decimal> {
        let user = require_user(self.identity.as_ref())?;
        let receipts = self
            .repository
            .list_receipts_since(&user.id, start_of_month(now))
            .await?;
        Ok(receipts.iter().map(|r| r.total_amount).sum())
    }
}
