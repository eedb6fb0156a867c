use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use super::consumption_model::{ConsumptionEvent, DailyConsumption, NewConsumptionEvent};
use super::feed::PushSubscription;
use crate::errors::Result;

/// Remote store operations for consumption events, scoped by owner.
#[async_trait]
pub trait ConsumptionStoreTrait: Send + Sync {
    /// Bulk read of up to `limit` most recent events, newest first.
    async fn fetch_recent(&self, owner: &str, limit: usize) -> Result<Vec<ConsumptionEvent>>;

    /// Events with a timestamp at or after `since`, newest first.
    async fn fetch_since(&self, owner: &str, since: DateTime<Utc>)
        -> Result<Vec<ConsumptionEvent>>;

    async fn insert_event(
        &self,
        owner: &str,
        new_event: NewConsumptionEvent,
    ) -> Result<ConsumptionEvent>;

    /// Opens a push channel delivering events inserted for `owner` until closed.
    ///
    /// Delivery is at-least-once.
    async fn subscribe_inserts(&self, owner: &str) -> Result<PushSubscription>;
}

/// Trait for consumption service operations
#[async_trait]
pub trait ConsumptionServiceTrait: Send + Sync {
    async fn record_consumption(&self, new_event: NewConsumptionEvent) -> Result<ConsumptionEvent>;
    async fn recent_consumption(&self, limit: usize) -> Result<Vec<ConsumptionEvent>>;
    async fn weekly_trend(&self, today: NaiveDate) -> Result<Vec<DailyConsumption>>;
}
