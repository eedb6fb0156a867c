//! Auth API payloads.

use givd_core::identity::UserProfile;
use givd_core::plans::SubscriptionPlan;
use log::warn;
use serde::{Deserialize, Serialize};

/// Free-form metadata attached to an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub subscription_plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// Sign-up answers with a session when email confirmation is disabled and
/// with the bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SignUpResponse {
    Session(AuthSession),
    User(AuthUser),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignUpOutcome {
    /// Account created and signed in.
    SignedIn { user: UserProfile },
    /// Account created; the user must confirm their email before signing in.
    ConfirmationRequired { email: String },
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordCredentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateUserRequest<'a> {
    pub data: PlanMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PlanMetadata<'a> {
    pub subscription_plan: &'a str,
}

impl From<AuthUser> for UserProfile {
    fn from(user: AuthUser) -> Self {
        let subscription_plan = match user.user_metadata.subscription_plan.as_deref() {
            None => SubscriptionPlan::Free,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("{} on user {}, using the free plan", e, user.id);
                SubscriptionPlan::Free
            }),
        };
        Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
            full_name: user.user_metadata.full_name,
            avatar_url: user.user_metadata.avatar_url,
            subscription_plan,
        }
    }
}
