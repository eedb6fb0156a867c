//! Password authentication against the hosted backend.

mod client;
mod model;

use async_trait::async_trait;
use givd_core::identity::UserProfile;
use givd_core::Result;

pub use client::AuthClient;
pub use model::{AuthSession, AuthUser, SignUpOutcome, UserMetadata};

/// Email/password session management.
///
/// Implementations keep the session in memory only.
#[async_trait]
pub trait AuthProviderTrait: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome>;
    async fn sign_out(&self) -> Result<()>;
}
