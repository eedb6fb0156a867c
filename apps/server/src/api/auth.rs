use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use givd_core::consumption::FeedSnapshot;
use givd_core::identity::{require_user, UserProfile};
use givd_remote::SignUpOutcome;
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    user: UserProfile,
    feed: FeedSnapshot,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpResponse {
    outcome: SignUpOutcome,
    feed: Option<FeedSnapshot>,
}

/// Starts the live feed for a freshly signed-in user.
///
/// Feed trouble never fails the sign-in: the snapshot carries the status.
async fn start_session(state: &AppState, user: UserProfile) -> FeedSnapshot {
    state.identity.sign_in(user);
    if let Err(err) = state.feed.refresh().await {
        tracing::warn!("Live feed could not start: {}", err);
    }
    state.feed.snapshot()
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let user = state.auth.sign_in(&req.email, &req.password).await?;
    let feed = start_session(&state, user.clone()).await;
    Ok(Json(SessionResponse { user, feed }))
}

async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CredentialsRequest>,
) -> ApiResult<Json<SignUpResponse>> {
    let outcome = state.auth.sign_up(&req.email, &req.password).await?;
    let feed = match &outcome {
        SignUpOutcome::SignedIn { user } => Some(start_session(&state, user.clone()).await),
        SignUpOutcome::ConfirmationRequired { .. } => None,
    };
    Ok(Json(SignUpResponse { outcome, feed }))
}

async fn sign_out(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.feed.reset();
    state.identity.sign_out();
    state.auth.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(State(state): State<Arc<AppState>>) -> ApiResult<Json<UserProfile>> {
    Ok(Json(require_user(state.identity.as_ref())?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-out", post(sign_out))
        .route("/me", get(me))
}
