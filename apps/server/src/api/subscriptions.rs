use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use givd_core::identity::UserProfile;
use givd_core::plans::{PlanDetails, SubscriptionPlan};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CurrentPlanResponse {
    plan: SubscriptionPlan,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectPlanRequest {
    plan: SubscriptionPlan,
}

async fn list_plans(State(state): State<Arc<AppState>>) -> Json<Vec<PlanDetails>> {
    Json(state.subscription_service.plans())
}

async fn current_plan(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CurrentPlanResponse>> {
    let plan = state.subscription_service.current_plan()?;
    Ok(Json(CurrentPlanResponse { plan }))
}

async fn select_plan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectPlanRequest>,
) -> ApiResult<Json<UserProfile>> {
    let user = state.subscription_service.select_plan(req.plan).await?;
    Ok(Json(user))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/subscriptions/plans", get(list_plans))
        .route("/subscriptions/plan", get(current_plan).put(select_plan))
}
