//! In-memory identity context holding the signed-in user.

use std::sync::RwLock;

use log::debug;

use super::identity_model::UserProfile;
use super::identity_traits::IdentityProviderTrait;
use crate::errors::{Error, Result};
use crate::plans::SubscriptionPlan;

/// Identity context backed by a lock-protected slot.
///
/// Auth adapters call `sign_in` / `sign_out`; services only read it through
/// `IdentityProviderTrait`. Nothing here is persisted.
#[derive(Default)]
pub struct SessionIdentity {
    user: RwLock<Option<UserProfile>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: UserProfile) -> Self {
        Self {
            user: RwLock::new(Some(user)),
        }
    }

    pub fn sign_in(&self, user: UserProfile) {
        debug!("Identity context now holds user {}", user.id);
        *self.user.write().unwrap_or_else(|p| p.into_inner()) = Some(user);
    }

    pub fn sign_out(&self) {
        debug!("Identity context cleared");
        *self.user.write().unwrap_or_else(|p| p.into_inner()) = None;
    }

    /// Updates the plan of the signed-in user, if any.
    pub fn set_plan(&self, plan: SubscriptionPlan) {
        if let Some(user) = self.user.write().unwrap_or_else(|p| p.into_inner()).as_mut() {
            user.subscription_plan = plan;
        }
    }
}

impl IdentityProviderTrait for SessionIdentity {
    fn current_user(&self) -> Option<UserProfile> {
        self.user.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

/// Returns the current user or `Error::NotAuthenticated`.
pub fn require_user(identity: &dyn IdentityProviderTrait) -> Result<UserProfile> {
    identity.current_user().ok_or(Error::NotAuthenticated)
}
