//! Identity module - the current user and the context that supplies it.

mod identity_context;
mod identity_model;
mod identity_traits;

pub use identity_context::{require_user, SessionIdentity};
pub use identity_model::UserProfile;
pub use identity_traits::IdentityProviderTrait;
