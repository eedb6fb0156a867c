use std::sync::Arc;

use log::debug;
use tokio::sync::broadcast;

use super::feed_model::{Admission, FeedError, FeedSnapshot, FeedUpdate, InitOutcome};
use super::reconciler::LiveFeedReconciler;
use crate::consumption::{ConsumptionEvent, ConsumptionStoreTrait};
use crate::identity::IdentityProviderTrait;

/// Binds the live feed to the session identity and the configured window size.
pub struct FeedService {
    reconciler: LiveFeedReconciler,
    identity: Arc<dyn IdentityProviderTrait>,
    limit: usize,
}

impl FeedService {
    pub fn new(
        store: Arc<dyn ConsumptionStoreTrait>,
        identity: Arc<dyn IdentityProviderTrait>,
        limit: usize,
    ) -> Self {
        Self {
            reconciler: LiveFeedReconciler::new(store),
            identity,
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// (Re)initializes the feed for whoever is signed in right now.
    pub async fn refresh(&self) -> Result<InitOutcome, FeedError> {
        let owner = self.identity.current_owner();
        debug!("Refreshing consumption feed for {:?}", owner);
        self.reconciler
            .initialize(owner.as_deref(), self.limit)
            .await
    }

    pub fn on_push_event(&self, event: ConsumptionEvent) -> Admission {
        self.reconciler.on_push_event(event)
    }

    pub fn current_view(&self) -> Vec<ConsumptionEvent> {
        self.reconciler.current_view()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        self.reconciler.snapshot()
    }

    pub fn updates(&self) -> broadcast::Receiver<FeedUpdate> {
        self.reconciler.updates()
    }

    pub fn teardown(&self) {
        self.reconciler.teardown();
    }

    /// Tears down and forgets the last view, used on sign-out.
    pub fn reset(&self) {
        self.reconciler.reset();
    }
}
