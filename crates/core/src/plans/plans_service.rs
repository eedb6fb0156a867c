use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};

use super::plans_model::{plan_catalog, PlanDetails, SubscriptionPlan};
use super::plans_traits::{ProfileRepositoryTrait, SubscriptionServiceTrait};
use crate::errors::Result;
use crate::identity::{require_user, SessionIdentity, UserProfile};

pub struct SubscriptionService {
    profile_repository: Arc<dyn ProfileRepositoryTrait>,
    identity: Arc<SessionIdentity>,
}

impl SubscriptionService {
    pub fn new(
        profile_repository: Arc<dyn ProfileRepositoryTrait>,
        identity: Arc<SessionIdentity>,
    ) -> Self {
        Self {
            profile_repository,
            identity,
        }
    }
}

#[async_trait]
impl SubscriptionServiceTrait for SubscriptionService {
    fn plans(&self) -> Vec<PlanDetails> {
        plan_catalog()
    }

    fn current_plan(&self) -> Result<SubscriptionPlan> {
        Ok(require_user(self.identity.as_ref())?.subscription_plan)
    }

    async fn select_plan(&self, plan: SubscriptionPlan) -> Result<UserProfile> {
        let user = require_user(self.identity.as_ref())?;
        if user.subscription_plan == plan {
            debug!("Plan {} already active for {}", plan.as_str(), user.id);
            return Ok(user);
        }

        let updated = self.profile_repository.update_plan(&user.id, plan).await?;
        self.identity.set_plan(updated.subscription_plan);
        info!(
            "Subscription plan changed for {}: {} -> {}",
            user.id,
            user.subscription_plan.as_str(),
            updated.subscription_plan.as_str()
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProfileRepository {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProfileRepositoryTrait for MockProfileRepository {
        async fn update_plan(&self, owner: &str, plan: SubscriptionPlan) -> Result<UserProfile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(UserProfile {
                id: owner.to_string(),
                email: "a@example.com".to_string(),
                full_name: None,
                avatar_url: None,
                subscription_plan: plan,
            })
        }
    }

    fn setup(signed_in: bool) -> (SubscriptionService, Arc<MockProfileRepository>) {
        let repo = Arc::new(MockProfileRepository {
            calls: AtomicUsize::new(0),
        });
        let identity = Arc::new(SessionIdentity::new());
        if signed_in {
            identity.sign_in(UserProfile {
                id: "user-1".to_string(),
                email: "a@example.com".to_string(),
                full_name: None,
                avatar_url: None,
                subscription_plan: SubscriptionPlan::Free,
            });
        }
        (SubscriptionService::new(repo.clone(), identity), repo)
    }

    #[tokio::test]
    async fn test_select_plan_updates_identity() {
        let (service, repo) = setup(true);
        let updated = service.select_plan(SubscriptionPlan::Premium1).await.unwrap();
        assert_eq!(updated.subscription_plan, SubscriptionPlan::Premium1);
        assert_eq!(service.current_plan().unwrap(), SubscriptionPlan::Premium1);
        assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_select_current_plan_is_noop() {
        let (service, repo) = setup(true);
        service.select_plan(SubscriptionPlan::Free).await.unwrap();
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_select_plan_requires_user() {
        let (service, _) = setup(false);
        let err = service
            .select_plan(SubscriptionPlan::Premium2)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }
}
