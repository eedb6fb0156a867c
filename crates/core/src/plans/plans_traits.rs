use async_trait::async_trait;

use super::plans_model::{PlanDetails, SubscriptionPlan};
use crate::errors::Result;
use crate::identity::UserProfile;

/// Trait for profile storage operations on the hosted backend.
#[async_trait]
pub trait ProfileRepositoryTrait: Send + Sync {
    /// Persists the plan in the user's metadata and returns the updated profile.
    async fn update_plan(&self, owner: &str, plan: SubscriptionPlan) -> Result<UserProfile>;
}

/// Trait for subscription service operations
#[async_trait]
pub trait SubscriptionServiceTrait: Send + Sync {
    fn plans(&self) -> Vec<PlanDetails>;
    fn current_plan(&self) -> Result<SubscriptionPlan>;
    async fn select_plan(&self, plan: SubscriptionPlan) -> Result<UserProfile>;
}
