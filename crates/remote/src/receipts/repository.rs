use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use givd_core::constants::RECEIPTS_TABLE;
use givd_core::errors::{Error, Result};
use givd_core::receipts::{NewReceipt, Receipt, ReceiptRepositoryTrait};

use super::model::{NewReceiptRow, ReceiptRow};
use crate::client::{Query, RestClient};

pub struct ReceiptRepository {
    client: Arc<RestClient>,
}

impl ReceiptRepository {
    pub fn new(client: Arc<RestClient>) -> Self {
        ReceiptRepository { client }
    }

    async fn select(&self, query: Query) -> Result<Vec<Receipt>> {
        let rows: Vec<ReceiptRow> = self.client.select(RECEIPTS_TABLE, &query).await?;
        Ok(rows.into_iter().map(Receipt::from).collect())
    }
}

#[async_trait]
impl ReceiptRepositoryTrait for ReceiptRepository {
    async fn list_receipts(&self, owner: &str) -> Result<Vec<Receipt>> {
        self.select(Query::all().eq("user_id", owner).order_desc("created_at"))
            .await
    }

    async fn list_receipts_since(&self, owner: &str, since: DateTime<Utc>) -> Result<Vec<Receipt>> {
        let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
        self.select(
            Query::all()
                .eq("user_id", owner)
                .gte("created_at", &since)
                .order_desc("created_at"),
        )
        .await
    }

    async fn insert_receipt(&self, owner: &str, new_receipt: NewReceipt) -> Result<Receipt> {
        let rows: Vec<ReceiptRow> = self
            .client
            .insert(RECEIPTS_TABLE, &[NewReceiptRow::new(owner, new_receipt)])
            .await?;
        rows.into_iter()
            .next()
            .map(Receipt::from)
            .ok_or_else(|| Error::Unexpected("Insert returned no receipt row".to_string()))
    }
}
