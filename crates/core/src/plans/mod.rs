//! Subscription plans - catalog, quotas, and plan selection.

mod plans_model;
mod plans_service;
mod plans_traits;

pub use plans_model::{plan_catalog, PlanDetails, PlanQuota, SubscriptionPlan};
pub use plans_service::SubscriptionService;
pub use plans_traits::{ProfileRepositoryTrait, SubscriptionServiceTrait};
