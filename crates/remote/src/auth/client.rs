use std::sync::Arc;

use async_trait::async_trait;
use givd_core::identity::UserProfile;
use givd_core::plans::{ProfileRepositoryTrait, SubscriptionPlan};
use givd_core::Result;
use log::{debug, info, warn};

use super::model::{
    AuthSession, AuthUser, PasswordCredentials, PlanMetadata, SignUpOutcome, SignUpResponse,
    UpdateUserRequest,
};
use super::AuthProviderTrait;
use crate::client::RestClient;
use crate::errors::RemoteError;

/// Auth API client. The session token lives in the shared `RestClient`, so
/// table requests made after sign-in run as the signed-in user.
pub struct AuthClient {
    client: Arc<RestClient>,
}

impl AuthClient {
    pub fn new(client: Arc<RestClient>) -> Self {
        AuthClient { client }
    }

    fn start_session(&self, session: AuthSession) -> UserProfile {
        self.client.set_access_token(Some(session.access_token));
        UserProfile::from(session.user)
    }
}

#[async_trait]
impl AuthProviderTrait for AuthClient {
    /// POST /auth/v1/token?grant_type=password
    async fn sign_in(&self, email: &str, password: &str) -> Result<UserProfile> {
        debug!("Signing in {}", email);
        let session: AuthSession = self
            .client
            .auth_post("token?grant_type=password", &PasswordCredentials { email, password })
            .await
            .map_err(|e| match e {
                RemoteError::Api { status: 400, message } => RemoteError::auth(message),
                other => other,
            })?;
        let user = self.start_session(session);
        info!("Signed in as {}", user.id);
        Ok(user)
    }

    /// POST /auth/v1/signup
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let response: SignUpResponse = self
            .client
            .auth_post("signup", &PasswordCredentials { email, password })
            .await?;
        Ok(match response {
            SignUpResponse::Session(session) => {
                let user = self.start_session(session);
                info!("Signed up and signed in as {}", user.id);
                SignUpOutcome::SignedIn { user }
            }
            SignUpResponse::User(user) => {
                info!("Signed up {}, confirmation pending", user.id);
                SignUpOutcome::ConfirmationRequired {
                    email: user.email.unwrap_or_else(|| email.to_string()),
                }
            }
        })
    }

    /// POST /auth/v1/logout, then forget the token whatever the answer.
    async fn sign_out(&self) -> Result<()> {
        if self.client.has_session() {
            let result: std::result::Result<serde_json::Value, RemoteError> =
                self.client.auth_post("logout", &serde_json::json!({})).await;
            if let Err(e) = result {
                // 204 has no body; anything else is logged and ignored.
                if !matches!(e, RemoteError::Json(_)) {
                    warn!("Remote sign-out failed: {}", e);
                }
            }
        }
        self.client.set_access_token(None);
        info!("Signed out");
        Ok(())
    }
}

#[async_trait]
impl ProfileRepositoryTrait for AuthClient {
    /// PUT /auth/v1/user with `{"data":{"subscription_plan":...}}`
    async fn update_plan(&self, owner: &str, plan: SubscriptionPlan) -> Result<UserProfile> {
        let request = UpdateUserRequest {
            data: PlanMetadata {
                subscription_plan: plan.as_str(),
            },
        };
        let user: AuthUser = self.client.auth_put("user", &request).await?;
        if user.id != owner {
            return Err(RemoteError::auth("Session does not belong to the current user").into());
        }
        Ok(UserProfile::from(user))
    }
}
