use std::sync::Arc;

use anyhow::anyhow;
use givd_core::{
    consumption::{ConsumptionService, ConsumptionServiceTrait, ConsumptionStoreTrait, FeedService},
    dashboard::{DashboardService, DashboardServiceTrait},
    identity::SessionIdentity,
    plans::{ProfileRepositoryTrait, SubscriptionService, SubscriptionServiceTrait},
    products::{ProductRepositoryTrait, ProductService, ProductServiceTrait},
    receipts::{ReceiptRepositoryTrait, ReceiptService, ReceiptServiceTrait},
};
use givd_remote::{AuthProviderTrait, InMemoryBackend, RemoteBackend, RemoteConfig};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{BackendKind, Config};

pub struct AppState {
    pub identity: Arc<SessionIdentity>,
    pub auth: Arc<dyn AuthProviderTrait>,
    pub product_service: Arc<dyn ProductServiceTrait>,
    pub receipt_service: Arc<dyn ReceiptServiceTrait>,
    pub consumption_service: Arc<dyn ConsumptionServiceTrait>,
    pub dashboard_service: Arc<dyn DashboardServiceTrait>,
    pub subscription_service: Arc<dyn SubscriptionServiceTrait>,
    pub feed: Arc<FeedService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("GIVD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Store adapters the services are wired to.
struct Stores {
    auth: Arc<dyn AuthProviderTrait>,
    products: Arc<dyn ProductRepositoryTrait>,
    receipts: Arc<dyn ReceiptRepositoryTrait>,
    consumption: Arc<dyn ConsumptionStoreTrait>,
    profiles: Arc<dyn ProfileRepositoryTrait>,
}

impl Stores {
    fn memory(backend: Arc<InMemoryBackend>) -> Self {
        Self {
            auth: backend.clone(),
            products: backend.clone(),
            receipts: backend.clone(),
            consumption: backend.clone(),
            profiles: backend,
        }
    }

    fn remote(config: &Config) -> anyhow::Result<Self> {
        let base_url = config
            .backend_url
            .as_deref()
            .ok_or_else(|| anyhow!("GIVD_BACKEND_URL is required for the remote backend"))?;
        let anon_key = config
            .backend_anon_key
            .as_deref()
            .ok_or_else(|| anyhow!("GIVD_BACKEND_ANON_KEY is required for the remote backend"))?;
        let backend = RemoteBackend::new(
            RemoteConfig::new(base_url, anon_key).with_timeout(config.request_timeout),
        );
        Ok(Self {
            auth: backend.auth.clone(),
            products: backend.products,
            receipts: backend.receipts,
            consumption: backend.consumption,
            profiles: backend.auth,
        })
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let stores = match config.backend {
        BackendKind::Memory => {
            tracing::warn!("Using the in-memory backend; nothing will be persisted");
            Stores::memory(Arc::new(InMemoryBackend::new()))
        }
        BackendKind::Remote => {
            let stores = Stores::remote(config)?;
            tracing::info!(
                "Using hosted backend at {}",
                config.backend_url.as_deref().unwrap_or_default()
            );
            stores
        }
    };
    Ok(wire_services(config, stores))
}

/// Builds the state around an existing in-memory backend, so callers can
/// seed data and flip its failure switches.
pub fn build_memory_state(config: &Config, backend: Arc<InMemoryBackend>) -> Arc<AppState> {
    wire_services(config, Stores::memory(backend))
}

fn wire_services(config: &Config, stores: Stores) -> Arc<AppState> {
    let identity = Arc::new(SessionIdentity::new());

    let product_service: Arc<dyn ProductServiceTrait> = Arc::new(ProductService::new(
        stores.products,
        identity.clone(),
    ));
    let receipt_service: Arc<dyn ReceiptServiceTrait> = Arc::new(ReceiptService::new(
        stores.receipts,
        identity.clone(),
    ));
    let consumption_service: Arc<dyn ConsumptionServiceTrait> = Arc::new(
        ConsumptionService::new(stores.consumption.clone(), identity.clone()),
    );
    let dashboard_service: Arc<dyn DashboardServiceTrait> = Arc::new(DashboardService::new(
        product_service.clone(),
        receipt_service.clone(),
    ));
    let subscription_service: Arc<dyn SubscriptionServiceTrait> = Arc::new(
        SubscriptionService::new(stores.profiles, identity.clone()),
    );
    let feed = Arc::new(FeedService::new(
        stores.consumption,
        identity.clone(),
        config.feed_limit,
    ));

    Arc::new(AppState {
        identity,
        auth: stores.auth,
        product_service,
        receipt_service,
        consumption_service,
        dashboard_service,
        subscription_service,
        feed,
    })
}
