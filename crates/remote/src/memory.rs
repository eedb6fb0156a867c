//! In-memory backend implementing every store trait.
//!
//! Used for local runs without a hosted project and for tests. Inserts fan
//! out to subscribers through a broadcast bus filtered per owner, like the
//! hosted realtime stream.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use givd_core::consumption::{
    ConsumptionEvent, ConsumptionStoreTrait, NewConsumptionEvent, PushSubscription,
};
use givd_core::errors::{Error, Result, StoreError};
use givd_core::identity::UserProfile;
use givd_core::plans::{ProfileRepositoryTrait, SubscriptionPlan};
use givd_core::products::{NewProduct, Product, ProductRepositoryTrait, ProductUpdate};
use givd_core::receipts::{NewReceipt, Receipt, ReceiptRepositoryTrait};
use log::{debug, info, warn};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::auth::{AuthProviderTrait, SignUpOutcome};
use crate::consumption::NewConsumptionRow;
use crate::products::NewProductRow;

const INSERT_BUS_CAPACITY: usize = 256;
const SUBSCRIPTION_BUFFER: usize = 64;

struct Account {
    password: String,
    profile: UserProfile,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|p| p.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|p| p.into_inner())
}

pub struct InMemoryBackend {
    /// Accounts keyed by lowercase email.
    accounts: RwLock<HashMap<String, Account>>,
    products: RwLock<HashMap<String, Product>>,
    receipts: RwLock<HashMap<String, Receipt>>,
    consumption: RwLock<Vec<ConsumptionEvent>>,
    inserts: broadcast::Sender<ConsumptionEvent>,
    forwarders: Mutex<Vec<JoinHandle<()>>>,
    fail_next_fetch: AtomicBool,
    fail_subscriptions: AtomicBool,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        let (inserts, _) = broadcast::channel(INSERT_BUS_CAPACITY);
        Self {
            accounts: RwLock::new(HashMap::new()),
            products: RwLock::new(HashMap::new()),
            receipts: RwLock::new(HashMap::new()),
            consumption: RwLock::new(Vec::new()),
            inserts,
            forwarders: Mutex::new(Vec::new()),
            fail_next_fetch: AtomicBool::new(false),
            fail_subscriptions: AtomicBool::new(false),
        }
    }

    /// Creates a confirmed account and returns its profile.
    pub fn register_user(&self, email: &str, password: &str) -> Result<UserProfile> {
        let key = email.trim().to_lowercase();
        if key.is_empty() || password.is_empty() {
            return Err(Error::invalid_input("Email and password are required"));
        }
        let mut accounts = write(&self.accounts);
        if accounts.contains_key(&key) {
            return Err(Error::Store(StoreError::Rejected(format!(
                "User already registered: {}",
                key
            ))));
        }
        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            email: key.clone(),
            full_name: None,
            avatar_url: None,
            subscription_plan: SubscriptionPlan::Free,
        };
        accounts.insert(
            key,
            Account {
                password: password.to_string(),
                profile: profile.clone(),
            },
        );
        Ok(profile)
    }

    /// Stores an event as-is, bypassing validation, and fans it out.
    pub fn seed_event(&self, event: ConsumptionEvent) {
        write(&self.consumption).push(event.clone());
        // No subscribers is fine.
        let _ = self.inserts.send(event);
    }

    /// Makes the next `fetch_recent` fail once.
    pub fn fail_next_fetch(&self) {
        self.fail_next_fetch.store(true, Ordering::SeqCst);
    }

    /// Makes every `subscribe_inserts` fail while set.
    pub fn fail_subscriptions(&self, fail: bool) {
        self.fail_subscriptions.store(fail, Ordering::SeqCst);
    }

    /// Drops every open push channel, as a lost realtime connection would.
    pub fn drop_subscriptions(&self) {
        let forwarders =
            std::mem::take(&mut *self.forwarders.lock().unwrap_or_else(|p| p.into_inner()));
        info!("Dropping {} in-memory push channels", forwarders.len());
        for forwarder in forwarders {
            forwarder.abort();
        }
    }

    fn owned_product(&self, owner: &str, product_id: &str) -> Result<Product> {
        read(&self.products)
            .get(product_id)
            .filter(|p| p.user_id == owner)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Product {}", product_id)))
    }
}

#[async_trait]
impl ProductRepositoryTrait for InMemoryBackend {
    async fn list_products(&self, owner: &str) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = read(&self.products)
            .values()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_product(&self, owner: &str, product_id: &str) -> Result<Product> {
        self.owned_product(owner, product_id)
    }

    async fn insert_product(&self, owner: &str, new_product: NewProduct) -> Result<Product> {
        let row = NewProductRow::new(owner, new_product);
        let product = Product {
            id: Uuid::new_v4().to_string(),
            user_id: row.user_id,
            name: row.name,
            category: row.category,
            quantity: row.quantity,
            min_threshold: row.min_threshold,
            unit: row.unit,
            created_at: Utc::now(),
        };
        write(&self.products).insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn update_product(&self, owner: &str, update: ProductUpdate) -> Result<Product> {
        let mut products = write(&self.products);
        let product = products
            .get_mut(&update.id)
            .filter(|p| p.user_id == owner)
            .ok_or_else(|| Error::NotFound(format!("Product {}", update.id)))?;
        product.name = update.name;
        product.category = update.category;
        product.quantity = update.quantity;
        product.min_threshold = update.min_threshold;
        product.unit = update.unit;
        Ok(product.clone())
    }

    async fn delete_product(&self, owner: &str, product_id: &str) -> Result<()> {
        self.owned_product(owner, product_id)?;
        write(&self.products).remove(product_id);
        Ok(())
    }
}

#[async_trait]
impl ReceiptRepositoryTrait for InMemoryBackend {
    async fn list_receipts(&self, owner: &str) -> Result<Vec<Receipt>> {
        let mut receipts: Vec<Receipt> = read(&self.receipts)
            .values()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect();
        receipts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(receipts)
    }

    async fn list_receipts_since(&self, owner: &str, since: DateTime<Utc>) -> Result<Vec<Receipt>> {
        let receipts = self.list_receipts(owner).await?;
        Ok(receipts
            .into_iter()
            .filter(|r| r.created_at >= since)
            .collect())
    }

    async fn insert_receipt(&self, owner: &str, new_receipt: NewReceipt) -> Result<Receipt> {
        let receipt = Receipt {
            id: Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            store_name: new_receipt.store_name,
            total_amount: new_receipt.total_amount,
            purchase_date: new_receipt.purchase_date,
            items: new_receipt.items,
            created_at: Utc::now(),
        };
        write(&self.receipts).insert(receipt.id.clone(), receipt.clone());
        Ok(receipt)
    }
}

#[async_trait]
impl ConsumptionStoreTrait for InMemoryBackend {
    async fn fetch_recent(&self, owner: &str, limit: usize) -> Result<Vec<ConsumptionEvent>> {
        if self.fail_next_fetch.swap(false, Ordering::SeqCst) {
            return Err(Error::Store(StoreError::Unavailable(
                "Simulated fetch failure".to_string(),
            )));
        }
        let mut events: Vec<ConsumptionEvent> = read(&self.consumption)
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
        let mut events: Vec<ConsumptionEvent> = read(&self.consumption)
            .iter()
            .filter(|e| e.user_id == owner && e.timestamp >= since)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(events)
    }

    async fn insert_event(
        &self,
        owner: &str,
        new_event: NewConsumptionEvent,
    ) -> Result<ConsumptionEvent> {
        let row = NewConsumptionRow::new(owner, new_event, Utc::now());
        let event = ConsumptionEvent {
            id: Uuid::now_v7().to_string(),
            user_id: row.user_id,
            product_name: row.product_name,
            quantity_used: row.quantity_used,
            timestamp: row.timestamp,
        };
        debug!("In-memory insert of consumption event {}", event.id);
        self.seed_event(event.clone());
        Ok(event)
    }

    async fn subscribe_inserts(&self, owner: &str) -> Result<PushSubscription> {
        if self.fail_subscriptions.load(Ordering::SeqCst) {
            return Err(Error::Store(StoreError::Unavailable(
                "Simulated realtime outage".to_string(),
            )));
        }

        let mut bus = self.inserts.subscribe();
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let owner = owner.to_string();
        let forwarder = tokio::spawn(async move {
            loop {
                match bus.recv().await {
                    Ok(event) if event.user_id == owner => {
                        if tx.send(event).await.is_err() {
                            return;
                        }
                    }
                    Ok(_) => {}
                    // Skipped inserts cannot be redelivered; closing lets the
                    // subscriber see the drop and reload.
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(
                            "In-memory push channel for {} lagged by {} events, closing",
                            owner, skipped
                        );
                        return;
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                }
            }
        });
        let abort = forwarder.abort_handle();
        let mut forwarders = self.forwarders.lock().unwrap_or_else(|p| p.into_inner());
        forwarders.retain(|f| !f.is_finished());
        forwarders.push(forwarder);
        drop(forwarders);

        Ok(PushSubscription::new(rx).with_close_hook(move || abort.abort()))
    }
}

#[async_trait]
impl ProfileRepositoryTrait for InMemoryBackend {
    async fn update_plan(&self, owner: &str, plan: SubscriptionPlan) -> Result<UserProfile> {
        let mut accounts = write(&self.accounts);
        let account = accounts
            .values_mut()
            .find(|a| a.profile.id == owner)
            .ok_or_else(|| Error::NotFound(format!("User {}", owner)))?;
        account.profile.subscription_plan = plan;
        Ok(account.profile.clone())
    }
}

#[async_trait]
impl AuthProviderTrait for InMemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile> {
        let key = email.trim().to_lowercase();
        let profile = read(&self.accounts)
            .get(&key)
            .filter(|a| a.password == password)
            .map(|a| a.profile.clone())
            .ok_or(Error::NotAuthenticated)?;
        Ok(profile)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let user = self.register_user(email, password)?;
        Ok(SignUpOutcome::SignedIn { user })
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}
