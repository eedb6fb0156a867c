//! Live feed reconciler: merges a bulk read with a push subscription.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::consumption::{ConsumptionEvent, ConsumptionStoreTrait};

use super::feed_model::{Admission, FeedError, FeedSnapshot, FeedStatus, FeedUpdate, InitOutcome};
use super::feed_view::{EventOrigin, FeedView};
use super::subscription::PushSubscription;

/// Capacity of the update broadcast channel. Slow observers lag, producers never wait.
const UPDATE_CHANNEL_CAPACITY: usize = 256;

struct FeedState {
    owner: Option<String>,
    /// Bumped by every `initialize` and `teardown`; stale work compares against it.
    generation: u64,
    view: FeedView,
    fetch_in_flight: bool,
    /// Push deliveries seen while a bulk read is outstanding, replayed on top of it.
    replay: Vec<ConsumptionEvent>,
    channel_open: bool,
    status: FeedStatus,
}

struct Shared {
    state: Mutex<FeedState>,
    updates: broadcast::Sender<FeedUpdate>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, FeedState> {
        // Every critical section leaves the state consistent, so a poisoned lock is still usable.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, update: FeedUpdate) {
        // No receivers is fine.
        let _ = self.updates.send(update);
    }

    /// Single admission path for pushed events.
    ///
    /// `generation` is `Some` for deliveries from a pump task and is checked
    /// against the current generation so torn-down or replaced channels can
    /// no longer touch the view.
    fn admit_push(&self, generation: Option<u64>, event: ConsumptionEvent) -> Admission {
        let mut state = self.lock();
        if generation.is_some_and(|g| g != state.generation) {
            return Admission::Inactive;
        }
        let Some(owner) = state.owner.as_deref() else {
            return Admission::Inactive;
        };
        if event.user_id != owner {
            warn!(
                "Ignoring consumption event {} for owner {} on feed of {}",
                event.id, event.user_id, owner
            );
            return Admission::OwnerMismatch;
        }

        if state.fetch_in_flight {
            state.replay.push(event.clone());
        }
        let admission = state.view.admit(event.clone(), EventOrigin::Push);
        drop(state);

        if admission.is_admitted() {
            self.notify(FeedUpdate::Admitted { event });
        }
        admission
    }

    fn channel_closed(&self, generation: u64, owner: &str) {
        let mut state = self.lock();
        if state.generation != generation {
            return;
        }
        state.channel_open = false;
        if state.status == FeedStatus::Live {
            state.status = FeedStatus::Disconnected;
        }
        drop(state);

        warn!("Consumption push channel for {} dropped", owner);
        self.notify(FeedUpdate::SubscriptionDropped {
            owner: owner.to_string(),
        });
    }
}

/// Owner-scoped live view of recent consumption events.
///
/// All mutations of the view run under one lock and never across an await.
/// Observers get clones through `current_view` / `snapshot`, or change
/// notifications through `updates`.
pub struct LiveFeedReconciler {
    store: Arc<dyn ConsumptionStoreTrait>,
    shared: Arc<Shared>,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl LiveFeedReconciler {
    pub fn new(store: Arc<dyn ConsumptionStoreTrait>) -> Self {
        let (updates, _receiver) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            store,
            shared: Arc::new(Shared {
                state: Mutex::new(FeedState {
                    owner: None,
                    generation: 0,
                    view: FeedView::default(),
                    fetch_in_flight: false,
                    replay: Vec::new(),
                    channel_open: false,
                    status: FeedStatus::Idle,
                }),
                updates,
            }),
            pump: Mutex::new(None),
        }
    }

    /// Loads the owner's most recent events and starts following new ones.
    ///
    /// The push subscription is opened before the bulk read so no insert can
    /// fall between the two; overlap is removed by id. Pushes received while
    /// the read is outstanding are replayed on top of its result.
    ///
    /// A subscription failure still applies the bulk read and then returns
    /// `SubscriptionUnavailable`; the feed stays usable as a static snapshot.
    pub async fn initialize(
        &self,
        owner: Option<&str>,
        limit: usize,
    ) -> Result<InitOutcome, FeedError> {
        let owner = owner
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .ok_or(FeedError::NotAuthenticated)?
            .to_string();

        let generation = {
            let mut state = self.shared.lock();
            state.generation += 1;
            if state.owner.as_deref() == Some(owner.as_str()) {
                state.view.set_limit(limit);
            } else {
                state.view = FeedView::new(limit);
            }
            state.owner = Some(owner.clone());
            state.fetch_in_flight = true;
            state.replay.clear();
            state.channel_open = false;
            state.status = FeedStatus::Loading;
            state.generation
        };
        self.stop_pump();
        info!(
            "Initializing consumption feed for {} (limit {}, generation {})",
            owner, limit, generation
        );

        let subscription_error = match self.store.subscribe_inserts(&owner).await {
            Ok(subscription) => {
                if !self.start_pump(generation, owner.clone(), subscription) {
                    debug!(
                        "Feed generation {} superseded before subscribing",
                        generation
                    );
                    return Ok(InitOutcome::Superseded);
                }
                None
            }
            Err(err) => {
                warn!(
                    "Could not open consumption push channel for {}: {}",
                    owner, err
                );
                Some(FeedError::SubscriptionUnavailable(err.to_string()))
            }
        };

        let fetched = self.store.fetch_recent(&owner, limit).await;

        let mut state = self.shared.lock();
        if state.generation != generation {
            debug!(
                "Discarding bulk read of superseded feed generation {}",
                generation
            );
            return Ok(InitOutcome::Superseded);
        }
        state.fetch_in_flight = false;
        let replay = std::mem::take(&mut state.replay);

        let events = match fetched {
            Ok(events) => events,
            Err(err) => {
                state.status = FeedStatus::Failed;
                drop(state);
                warn!(
                    "Bulk read of consumption feed for {} failed: {}",
                    owner, err
                );
                let message = err.to_string();
                self.shared.notify(FeedUpdate::FetchFailed {
                    owner,
                    message: message.clone(),
                });
                return Err(FeedError::FetchFailed(message));
            }
        };

        let fetched_count = events.len();
        let mut view =
            FeedView::from_bulk(events.into_iter().filter(|e| e.user_id == owner), limit);
        for event in replay {
            view.admit(event, EventOrigin::Push);
        }
        let loaded = view.len();
        state.view = view;
        state.status = if subscription_error.is_some() {
            FeedStatus::Static
        } else if state.channel_open {
            FeedStatus::Live
        } else {
            FeedStatus::Disconnected
        };
        drop(state);

        debug!(
            "Consumption feed for {} loaded {} of {} fetched events",
            owner, loaded, fetched_count
        );
        self.shared.notify(FeedUpdate::Reloaded {
            owner,
            count: loaded,
        });

        match subscription_error {
            Some(err) => Err(err),
            None => Ok(InitOutcome::Applied { loaded }),
        }
    }

    /// Offers one pushed event to the view.
    ///
    /// Safe to call while an `initialize` is in flight: the event is admitted
    /// immediately and replayed on top of the bulk result once it lands.
    pub fn on_push_event(&self, event: ConsumptionEvent) -> Admission {
        self.shared.admit_push(None, event)
    }

    /// Present ordered sequence of events, newest first.
    pub fn current_view(&self) -> Vec<ConsumptionEvent> {
        self.shared.lock().view.events().to_vec()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.shared.lock();
        FeedSnapshot {
            owner: state.owner.clone(),
            status: state.status,
            limit: state.view.limit(),
            events: state.view.events().to_vec(),
        }
    }

    pub fn status(&self) -> FeedStatus {
        self.shared.lock().status
    }

    /// Receiver for change notifications.
    pub fn updates(&self) -> broadcast::Receiver<FeedUpdate> {
        self.shared.updates.subscribe()
    }

    /// Closes the push subscription and detaches the owner.
    ///
    /// Idempotent. Once this returns, neither the old channel nor an in-flight
    /// bulk read can change the view. The last view is kept for display.
    pub fn teardown(&self) {
        self.shutdown(false);
    }

    /// Tears down and empties the view under a single lock.
    pub fn reset(&self) {
        self.shutdown(true);
    }

    /// Empties the view without touching the subscription.
    pub fn clear(&self) {
        self.shared.lock().view.clear();
    }

    fn shutdown(&self, clear_view: bool) {
        let was_active = {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.fetch_in_flight = false;
            state.replay.clear();
            state.channel_open = false;
            if clear_view {
                state.view.clear();
            }
            let was_active = state.owner.take().is_some();
            if was_active {
                state.status = FeedStatus::Idle;
            }
            was_active
        };
        self.stop_pump();

        if was_active {
            info!("Consumption feed torn down");
            self.shared.notify(FeedUpdate::TornDown);
        }
    }

    /// Spawns the task forwarding the subscription into the admission path.
    ///
    /// Returns false (and closes the subscription) if `generation` is stale.
    fn start_pump(&self, generation: u64, owner: String, subscription: PushSubscription) -> bool {
        let mut pump = self.pump.lock().unwrap_or_else(|p| p.into_inner());
        {
            let mut state = self.shared.lock();
            if state.generation != generation {
                drop(state);
                subscription.close();
                return false;
            }
            state.channel_open = true;
        }

        let shared = self.shared.clone();
        let handle = tokio::spawn(run_pump(shared, generation, owner, subscription));
        if let Some(previous) = pump.replace(handle) {
            previous.abort();
        }
        true
    }

    fn stop_pump(&self) {
        let handle = self.pump.lock().unwrap_or_else(|p| p.into_inner()).take();
        if let Some(handle) = handle {
            // Aborting drops the task's PushSubscription, which closes it.
            handle.abort();
        }
    }
}

impl Drop for LiveFeedReconciler {
    fn drop(&mut self) {
        self.stop_pump();
    }
}

async fn run_pump(
    shared: Arc<Shared>,
    generation: u64,
    owner: String,
    mut subscription: PushSubscription,
) {
    while let Some(event) = subscription.next().await {
        if shared.admit_push(Some(generation), event) == Admission::Inactive {
            debug!(
                "Stopping stale consumption pump (generation {})",
                generation
            );
            return;
        }
    }
    shared.channel_closed(generation, &owner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumption::NewConsumptionEvent;
    use crate::errors::{Error, Result, StoreError};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot, Notify};

    // ============== Mock Store ==============

    enum FetchPlan {
        Ready(Result<Vec<ConsumptionEvent>>),
        Gated(oneshot::Receiver<Result<Vec<ConsumptionEvent>>>),
    }

    #[derive(Default)]
    struct MockStore {
        plans: Mutex<VecDeque<FetchPlan>>,
        fetch_started: Notify,
        senders: Mutex<Vec<(String, mpsc::Sender<ConsumptionEvent>)>>,
        fail_subscribe: AtomicBool,
        subscriptions_opened: AtomicUsize,
        subscriptions_closed: Arc<AtomicUsize>,
    }

    impl MockStore {
        fn plan_ready(&self, events: Vec<ConsumptionEvent>) {
            self.plans
                .lock()
                .unwrap()
                .push_back(FetchPlan::Ready(Ok(events)));
        }

        fn plan_failure(&self) {
            self.plans
                .lock()
                .unwrap()
                .push_back(FetchPlan::Ready(Err(Error::Store(
                    StoreError::Unavailable("connection reset".to_string()),
                ))));
        }

        fn plan_gated(&self) -> oneshot::Sender<Result<Vec<ConsumptionEvent>>> {
            let (tx, rx) = oneshot::channel();
            self.plans.lock().unwrap().push_back(FetchPlan::Gated(rx));
            tx
        }

        /// Delivers an event on every open channel, like a misrouting backend would.
        async fn push(&self, event: ConsumptionEvent) {
            let senders: Vec<_> = self
                .senders
                .lock()
                .unwrap()
                .iter()
                .map(|(_, tx)| tx.clone())
                .collect();
            for tx in senders {
                let _ = tx.send(event.clone()).await;
            }
        }

        fn drop_channels(&self) {
            self.senders.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl ConsumptionStoreTrait for MockStore {
        async fn fetch_recent(&self, _owner: &str, limit: usize) -> Result<Vec<ConsumptionEvent>> {
            let plan = self.plans.lock().unwrap().pop_front();
            self.fetch_started.notify_one();
            let result = match plan {
                Some(FetchPlan::Ready(result)) => result,
                Some(FetchPlan::Gated(rx)) => rx
                    .await
                    .unwrap_or_else(|_| Err(Error::Unexpected("gate dropped".to_string()))),
                None => Ok(Vec::new()),
            };
            result.map(|mut events| {
                events.truncate(limit);
                events
            })
        }

        async fn fetch_since(
            &self,
            _owner: &str,
            _since: DateTime<Utc>,
        ) -> Result<Vec<ConsumptionEvent>> {
            Ok(Vec::new())
        }

        async fn insert_event(
            &self,
            _owner: &str,
            _new_event: NewConsumptionEvent,
        ) -> Result<ConsumptionEvent> {
            unimplemented!()
        }

        async fn subscribe_inserts(&self, owner: &str) -> Result<PushSubscription> {
            if self.fail_subscribe.load(Ordering::SeqCst) {
                return Err(Error::Store(StoreError::Unavailable(
                    "realtime offline".to_string(),
                )));
            }
            let (tx, rx) = mpsc::channel(16);
            self.senders.lock().unwrap().push((owner.to_string(), tx));
            self.subscriptions_opened.fetch_add(1, Ordering::SeqCst);
            let closed = self.subscriptions_closed.clone();
            Ok(PushSubscription::new(rx).with_close_hook(move || {
                closed.fetch_add(1, Ordering::SeqCst);
            }))
        }
    }

    fn event(id: &str, owner: &str, t: i64) -> ConsumptionEvent {
        ConsumptionEvent {
            id: id.to_string(),
            user_id: owner.to_string(),
            product_name: format!("product-{}", id),
            quantity_used: 1.0,
            timestamp: Utc.timestamp_opt(t, 0).unwrap(),
        }
    }

    fn ids(events: &[ConsumptionEvent]) -> Vec<String> {
        events.iter().map(|e| e.id.clone()).collect()
    }

    async fn wait_for(reconciler: &LiveFeedReconciler, id: &str) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while !reconciler.current_view().iter().any(|e| e.id == id) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("event never reached the view");
    }

    fn setup() -> (Arc<MockStore>, Arc<LiveFeedReconciler>) {
        let store = Arc::new(MockStore::default());
        let reconciler = Arc::new(LiveFeedReconciler::new(store.clone()));
        (store, reconciler)
    }

    #[tokio::test]
    async fn test_initialize_without_owner_fails() {
        let (_, reconciler) = setup();
        assert_eq!(
            reconciler.initialize(None, 20).await,
            Err(FeedError::NotAuthenticated)
        );
        assert_eq!(
            reconciler.initialize(Some("  "), 20).await,
            Err(FeedError::NotAuthenticated)
        );
        assert_eq!(reconciler.status(), FeedStatus::Idle);
    }

    #[tokio::test]
    async fn test_initialize_loads_bulk_read() {
        let (store, reconciler) = setup();
        store.plan_ready(vec![event("X", "user-1", 5), event("Y", "user-1", 3)]);

        let outcome = reconciler.initialize(Some("user-1"), 20).await.unwrap();
        assert_eq!(outcome, InitOutcome::Applied { loaded: 2 });
        assert_eq!(ids(&reconciler.current_view()), vec!["X", "Y"]);
        assert_eq!(reconciler.status(), FeedStatus::Live);
    }

    #[tokio::test]
    async fn test_push_event_admitted_once() {
        let (store, reconciler) = setup();
        store.plan_ready(Vec::new());
        reconciler.initialize(Some("user-1"), 20).await.unwrap();

        let e = event("A", "user-1", 10);
        assert_eq!(reconciler.on_push_event(e.clone()), Admission::Admitted);
        assert_eq!(reconciler.on_push_event(e), Admission::DuplicateRejected);
        assert_eq!(ids(&reconciler.current_view()), vec!["A"]);
    }

    #[tokio::test]
    async fn test_foreign_owner_never_changes_view() {
        let (store, reconciler) = setup();
        store.plan_ready(vec![event("X", "user-1", 5)]);
        reconciler.initialize(Some("user-1"), 20).await.unwrap();
        let before = reconciler.current_view();

        assert_eq!(
            reconciler.on_push_event(event("B", "user-2", 9)),
            Admission::OwnerMismatch
        );
        store.push(event("C", "user-2", 10)).await;
        store.push(event("D", "user-1", 11)).await;
        wait_for(&reconciler, "D").await;

        let ids = ids(&reconciler.current_view());
        assert_eq!(ids, vec!["D", "X"]);
        assert!(before.iter().all(|e| ids.contains(&e.id)));
    }

    #[tokio::test]
    async fn test_eviction_example() {
        let (store, reconciler) = setup();
        store.plan_ready(Vec::new());
        reconciler.initialize(Some("user-1"), 3).await.unwrap();

        for (id, t) in [("A", 1), ("B", 2), ("C", 3), ("D", 4)] {
            reconciler.on_push_event(event(id, "user-1", t));
        }
        assert_eq!(ids(&reconciler.current_view()), vec!["D", "C", "B"]);
    }

    #[tokio::test]
    async fn test_push_during_fetch_is_not_lost() {
        let (store, reconciler) = setup();
        let gate = store.plan_gated();

        let init = {
            let reconciler = reconciler.clone();
            tokio::spawn(async move { reconciler.initialize(Some("user-1"), 20).await })
        };
        store.fetch_started.notified().await;

        assert_eq!(
            reconciler.on_push_event(event("N", "user-1", 100)),
            Admission::Admitted
        );
        gate.send(Ok(vec![event("H", "user-1", 50)])).unwrap();

        let outcome = init.await.unwrap().unwrap();
        assert_eq!(outcome, InitOutcome::Applied { loaded: 2 });
        assert_eq!(ids(&reconciler.current_view()), vec!["N", "H"]);
    }

    #[tokio::test]
    async fn test_initialize_replaces_then_merges() {
        let (store, reconciler) = setup();
        let gate = store.plan_gated();

        let init = {
            let reconciler = reconciler.clone();
            tokio::spawn(async move { reconciler.initialize(Some("user-1"), 20).await })
        };
        store.fetch_started.notified().await;

        // Delivered through the real push channel while the read is outstanding.
        store.push(event("Z", "user-1", 6)).await;
        wait_for(&reconciler, "Z").await;

        gate.send(Ok(vec![event("X", "user-1", 5), event("Y", "user-1", 3)]))
            .unwrap();
        init.await.unwrap().unwrap();

        assert_eq!(ids(&reconciler.current_view()), vec!["Z", "X", "Y"]);
    }

    #[tokio::test]
    async fn test_redelivered_event_present_in_bulk_is_kept_once() {
        let (store, reconciler) = setup();
        let gate = store.plan_gated();

        let init = {
            let reconciler = reconciler.clone();
            tokio::spawn(async move { reconciler.initialize(Some("user-1"), 20).await })
        };
        store.fetch_started.notified().await;
        reconciler.on_push_event(event("X", "user-1", 5));

        gate.send(Ok(vec![event("X", "user-1", 5), event("Y", "user-1", 3)]))
            .unwrap();
        init.await.unwrap().unwrap();

        assert_eq!(ids(&reconciler.current_view()), vec!["X", "Y"]);
    }

    #[tokio::test]
    async fn test_stale_fetch_does_not_clobber_newer_state() {
        let (store, reconciler) = setup();
        let slow_gate = store.plan_gated();
        store.plan_ready(vec![event("NEW", "user-2", 20)]);

        let first = {
            let reconciler = reconciler.clone();
            tokio::spawn(async move { reconciler.initialize(Some("user-1"), 20).await })
        };
        store.fetch_started.notified().await;

        let second = reconciler.initialize(Some("user-2"), 20).await.unwrap();
        assert_eq!(second, InitOutcome::Applied { loaded: 1 });

        slow_gate
            .send(Ok(vec![event("OLD", "user-1", 10)]))
            .unwrap();
        assert_eq!(first.await.unwrap().unwrap(), InitOutcome::Superseded);

        assert_eq!(ids(&reconciler.current_view()), vec!["NEW"]);
        assert_eq!(reconciler.snapshot().owner.as_deref(), Some("user-2"));
    }

    #[tokio::test]
    async fn test_owner_change_closes_previous_subscription() {
        let (store, reconciler) = setup();
        store.plan_ready(vec![event("A", "user-1", 1)]);
        store.plan_ready(vec![event("B", "user-2", 2)]);

        reconciler.initialize(Some("user-1"), 20).await.unwrap();
        reconciler.initialize(Some("user-2"), 20).await.unwrap();

        assert_eq!(store.subscriptions_opened.load(Ordering::SeqCst), 2);
        tokio::time::timeout(Duration::from_secs(2), async {
            while store.subscriptions_closed.load(Ordering::SeqCst) < 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(ids(&reconciler.current_view()), vec!["B"]);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_view() {
        let (store, reconciler) = setup();
        store.plan_ready(vec![event("X", "user-1", 5)]);
        store.plan_failure();

        reconciler.initialize(Some("user-1"), 20).await.unwrap();
        let mut updates = reconciler.updates();

        let err = reconciler.initialize(Some("user-1"), 20).await.unwrap_err();
        assert!(matches!(err, FeedError::FetchFailed(_)));
        assert_eq!(ids(&reconciler.current_view()), vec!["X"]);
        assert_eq!(reconciler.status(), FeedStatus::Failed);
        assert!(matches!(
            updates.recv().await.unwrap(),
            FeedUpdate::FetchFailed { .. }
        ));
    }

    #[tokio::test]
    async fn test_subscription_failure_degrades_to_static_snapshot() {
        let (store, reconciler) = setup();
        store.fail_subscribe.store(true, Ordering::SeqCst);
        store.plan_ready(vec![event("X", "user-1", 5)]);

        let err = reconciler.initialize(Some("user-1"), 20).await.unwrap_err();
        assert!(matches!(err, FeedError::SubscriptionUnavailable(_)));

        let snapshot = reconciler.snapshot();
        assert_eq!(snapshot.status, FeedStatus::Static);
        assert_eq!(ids(&snapshot.events), vec!["X"]);
    }

    #[tokio::test]
    async fn test_dropped_channel_is_surfaced() {
        let (store, reconciler) = setup();
        store.plan_ready(Vec::new());
        reconciler.initialize(Some("user-1"), 20).await.unwrap();
        let mut updates = reconciler.updates();

        store.drop_channels();

        let update = tokio::time::timeout(Duration::from_secs(2), updates.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            update,
            FeedUpdate::SubscriptionDropped {
                owner: "user-1".to_string()
            }
        );
        assert_eq!(reconciler.status(), FeedStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_teardown_is_idempotent_and_keeps_view() {
        let (store, reconciler) = setup();
        store.plan_ready(vec![event("X", "user-1", 5), event("Y", "user-1", 3)]);
        reconciler.initialize(Some("user-1"), 20).await.unwrap();
        let before = reconciler.current_view();

        reconciler.teardown();
        reconciler.teardown();

        assert_eq!(reconciler.current_view(), before);
        assert_eq!(
            reconciler.on_push_event(event("Z", "user-1", 9)),
            Admission::Inactive
        );
        store.push(event("W", "user-1", 10)).await;
        tokio::task::yield_now().await;
        assert_eq!(reconciler.current_view(), before);

        reconciler.clear();
        assert!(reconciler.current_view().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_before_initialize_is_harmless() {
        let (_, reconciler) = setup();
        reconciler.teardown();
        assert!(reconciler.current_view().is_empty());
        assert_eq!(reconciler.status(), FeedStatus::Idle);
    }

    #[tokio::test]
    async fn test_teardown_discards_in_flight_fetch() {
        let (store, reconciler) = setup();
        let gate = store.plan_gated();

        let init = {
            let reconciler = reconciler.clone();
            tokio::spawn(async move { reconciler.initialize(Some("user-1"), 20).await })
        };
        store.fetch_started.notified().await;
        reconciler.teardown();

        gate.send(Ok(vec![event("LATE", "user-1", 1)])).unwrap();
        assert_eq!(init.await.unwrap().unwrap(), InitOutcome::Superseded);
        assert!(reconciler.current_view().is_empty());
    }

    #[tokio::test]
    async fn test_reset_empties_view_and_allows_reload() {
        let (store, reconciler) = setup();
        store.plan_ready(vec![event("X", "user-1", 5), event("Y", "user-1", 3)]);
        reconciler.initialize(Some("user-1"), 20).await.unwrap();

        reconciler.reset();
        assert!(reconciler.current_view().is_empty());
        assert_eq!(reconciler.status(), FeedStatus::Idle);
        assert_eq!(
            reconciler.on_push_event(event("Z", "user-1", 9)),
            Admission::Inactive
        );

        store.plan_ready(vec![event("W", "user-1", 10)]);
        assert_eq!(
            reconciler.initialize(Some("user-1"), 20).await,
            Ok(InitOutcome::Applied { loaded: 1 })
        );
        assert_eq!(ids(&reconciler.current_view()), vec!["W"]);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_fetch() {
        let (store, reconciler) = setup();
        let gate = store.plan_gated();

        let init = {
            let reconciler = reconciler.clone();
            tokio::spawn(async move { reconciler.initialize(Some("user-1"), 20).await })
        };
        store.fetch_started.notified().await;
        reconciler.reset();

        gate.send(Ok(vec![event("LATE", "user-1", 1)])).unwrap();
        assert_eq!(init.await.unwrap().unwrap(), InitOutcome::Superseded);
        assert!(reconciler.current_view().is_empty());
    }
}
