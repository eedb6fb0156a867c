use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use givd_core::dashboard::DashboardSummary;

use crate::{error::ApiResult, main_lib::AppState};

async fn get_dashboard(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardSummary>> {
    let summary = state.dashboard_service.summary(Utc::now()).await?;
    Ok(Json(summary))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(get_dashboard))
}
