//! GIVD Remote - hosted backend adapters.
//!
//! This crate implements the store traits defined in `givd-core` against a
//! hosted backend-as-a-service:
//! - `client`: table API over REST with filter/order/limit query strings
//! - `auth`: password sessions and profile metadata
//! - `consumption`: consumption log reads, inserts and the realtime stream
//! - `memory`: an in-memory backend with the same traits, for local runs and tests
//!
//! ```text
//!   givd-core (traits)
//!          │
//!          ▼
//!   givd-remote ──► hosted REST / auth / realtime
//!          │
//!          └──────► InMemoryBackend
//! ```

pub mod auth;
mod client;
mod config;
pub mod consumption;
mod errors;
pub mod memory;
pub mod products;
pub mod receipts;

use std::sync::Arc;

pub use auth::{AuthClient, AuthProviderTrait, SignUpOutcome};
pub use client::{Query, RestClient};
pub use config::{RemoteConfig, DEFAULT_TIMEOUT_MS};
pub use consumption::ConsumptionStore;
pub use errors::{RemoteError, Result};
pub use memory::InMemoryBackend;
pub use products::ProductRepository;
pub use receipts::ReceiptRepository;

/// Every adapter for one hosted project, sharing a single session.
pub struct RemoteBackend {
    pub client: Arc<RestClient>,
    pub auth: Arc<AuthClient>,
    pub products: Arc<ProductRepository>,
    pub receipts: Arc<ReceiptRepository>,
    pub consumption: Arc<ConsumptionStore>,
}

impl RemoteBackend {
    pub fn new(config: RemoteConfig) -> Self {
        let client = Arc::new(RestClient::new(config));
        Self {
            auth: Arc::new(AuthClient::new(client.clone())),
            products: Arc::new(ProductRepository::new(client.clone())),
            receipts: Arc::new(ReceiptRepository::new(client.clone())),
            consumption: Arc::new(ConsumptionStore::new(client.clone())),
            client,
        }
    }
}
