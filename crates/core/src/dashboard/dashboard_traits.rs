use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::dashboard_model::DashboardSummary;
use crate::errors::Result;

/// Trait for dashboard service operations
#[async_trait]
pub trait DashboardServiceTrait: Send + Sync {
    async fn summary(&self, now: DateTime<Utc>) -> Result<DashboardSummary>;
}
