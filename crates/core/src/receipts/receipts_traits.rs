use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::receipts_model::{NewReceipt, Receipt};
use crate::errors::Result;

/// Trait for receipt repository operations, scoped by owner
#[async_trait]
pub trait ReceiptRepositoryTrait: Send + Sync {
    /// Lists the owner's receipts, newest `created_at` first.
    async fn list_receipts(&self, owner: &str) -> Result<Vec<Receipt>>;
    /// Lists receipts created at or after `since`.
    async fn list_receipts_since(&self, owner: &str, since: DateTime<Utc>) -> Result<Vec<Receipt>>;
    async fn insert_receipt(&self, owner: &str, new_receipt: NewReceipt) -> Result<Receipt>;
}

/// Trait for receipt service operations
#[async_trait]
pub trait ReceiptServiceTrait: Send + Sync {
    async fn list_receipts(&self) -> Result<Vec<Receipt>>;
    async fn create_receipt(&self, new_receipt: NewReceipt) -> Result<Receipt>;
    async fn monthly_spend(&self, now: DateTime<Utc>) -> Result<Decimal>;
}
