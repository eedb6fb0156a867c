use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use log::debug;

use super::consumption_model::{
    trend_start, weekly_trend, ConsumptionEvent, DailyConsumption, NewConsumptionEvent,
};
use super::consumption_traits::{ConsumptionServiceTrait, ConsumptionStoreTrait};
use crate::errors::{Error, Result};
use crate::identity::{require_user, IdentityProviderTrait};

pub struct ConsumptionService {
    store: Arc<dyn ConsumptionStoreTrait>,
    identity: Arc<dyn IdentityProviderTrait>,
}

impl ConsumptionService {
    pub fn new(
        store: Arc<dyn ConsumptionStoreTrait>,
        identity: Arc<dyn IdentityProviderTrait>,
    ) -> Self {
        Self { store, identity }
    }
}

#[async_trait]
impl ConsumptionServiceTrait for ConsumptionService {
    /// Writes a consumption event; the live feed observes it through the push channel
    async fn record_consumption(&self, new_event: NewConsumptionEvent) -> Result<ConsumptionEvent> {
        let user = require_user(self.identity.as_ref())?;
        let new_event = new_event.normalized(Utc::now())?;
        debug!(
            "Recording consumption of {} x '{}' for {}",
            new_event.quantity_used, new_event.product_name, user.id
        );
        self.store.insert_event(&user.id, new_event).await
    }

    async fn recent_consumption(&self, limit: usize) -> Result<Vec<ConsumptionEvent>> {
        let user = require_user(self.identity.as_ref())?;
        self.store.fetch_recent(&user.id, limit).await
    }

    async fn weekly_trend(&self, today: NaiveDate) -> Result<Vec<DailyConsumption>> {
        let user = require_user(self.identity.as_ref())?;
        let first_day = trend_start(today)?;
        let since = first_day
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight))
            .ok_or_else(|| Error::Unexpected(format!("Invalid trend start {}", first_day)))?;
        let events = self.store.fetch_since(&user.id, since).await?;
        weekly_trend(&events, today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumption::PushSubscription;
    use crate::identity::{SessionIdentity, UserProfile};
    use crate::plans::SubscriptionPlan;
    use chrono::DateTime;
    use std::sync::RwLock;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct MockConsumptionStore {
        events: RwLock<Vec<ConsumptionEvent>>,
    }

    #[async_trait]
    impl ConsumptionStoreTrait for MockConsumptionStore {
        async fn fetch_recent(&self, owner: &str, limit: usize) -> Result<Vec<ConsumptionEvent>> {
            let mut events: Vec<_> = self
                .events
                .read()
                .unwrap()
                .iter()
                .filter(|e| e.user_id == owner)
                .cloned()
                .collect();
            events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            events.truncate(limit);
            Ok(events)
        }

        async fn fetch_since(
            &self,
            owner: &str,
            since: DateTime<Utc>,
        ) -> Result<Vec<ConsumptionEvent>> {
            Ok(self
                .fetch_recent(owner, usize::MAX)
                .await?
                .into_iter()
                .filter(|e| e.timestamp >= since)
                .collect())
        }

        async fn insert_event(
            &self,
            owner: &str,
            new_event: NewConsumptionEvent,
        ) -> Result<ConsumptionEvent> {
            let mut events = self.events.write().unwrap();
            let event = ConsumptionEvent {
                id: format!("c{}", events.len() + 1),
                user_id: owner.to_string(),
                product_name: new_event.product_name,
                quantity_used: new_event.quantity_used,
                timestamp: new_event.timestamp.unwrap_or_else(Utc::now),
            };
            events.push(event.clone());
            Ok(event)
        }

        async fn subscribe_inserts(&self, _owner: &str) -> Result<PushSubscription> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(PushSubscription::new(rx))
        }
    }

    fn service(signed_in: bool) -> ConsumptionService {
        let identity = SessionIdentity::new();
        if signed_in {
            identity.sign_in(UserProfile {
                id: "user-1".to_string(),
                email: "a@example.com".to_string(),
                full_name: None,
                avatar_url: None,
                subscription_plan: SubscriptionPlan::Free,
            });
        }
        ConsumptionService::new(
            Arc::new(MockConsumptionStore::default()),
            Arc::new(identity),
        )
    }

    #[tokio::test]
    async fn test_record_and_read_back() {
        let service = service(true);
        let recorded = service
            .record_consumption(NewConsumptionEvent {
                product_name: "Café".to_string(),
                quantity_used: 2.0,
                timestamp: None,
            })
            .await
            .unwrap();
        assert_eq!(recorded.user_id, "user-1");

        let recent = service.recent_consumption(20).await.unwrap();
        assert_eq!(recent, vec![recorded]);
    }

    #[tokio::test]
    async fn test_weekly_trend_includes_today() {
        let service = service(true);
        service
            .record_consumption(NewConsumptionEvent {
                product_name: "Eau".to_string(),
                quantity_used: 3.0,
                timestamp: None,
            })
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let trend = service.weekly_trend(today).await.unwrap();
        assert_eq!(trend.len(), 7);
        assert_eq!(trend.last().unwrap().total, 3.0);
    }

    #[tokio::test]
    async fn test_record_requires_user() {
        let service = service(false);
        let err = service
            .record_consumption(NewConsumptionEvent {
                product_name: "Eau".to_string(),
                quantity_used: 1.0,
                timestamp: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_weekly_trend_rejects_out_of_range_date() {
        let service = service(true);
        let err = service.weekly_trend(NaiveDate::MIN).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
