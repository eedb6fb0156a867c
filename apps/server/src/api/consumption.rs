use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use futures_core::Stream;
use givd_core::consumption::{
    ConsumptionEvent, DailyConsumption, FeedError, FeedSnapshot, NewConsumptionEvent,
};
use serde::Deserialize;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::{error::ApiResult, main_lib::AppState};

const DEFAULT_RECENT_LIMIT: usize = 20;

#[derive(Deserialize)]
struct RecentQuery {
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct TrendQuery {
    today: Option<NaiveDate>,
}

async fn get_feed(State(state): State<Arc<AppState>>) -> Json<FeedSnapshot> {
    Json(state.feed.snapshot())
}

/// Re-runs the bulk load and resubscribes. A missing push channel still
/// returns the loaded snapshot; its status reports the condition.
async fn refresh_feed(State(state): State<Arc<AppState>>) -> ApiResult<Json<FeedSnapshot>> {
    match state.feed.refresh().await {
        Ok(_) => {}
        Err(FeedError::SubscriptionUnavailable(message)) => {
            tracing::warn!("Live feed running without push updates: {}", message);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(Json(state.feed.snapshot()))
}

async fn stream_feed(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(state.feed.updates());
    let stream = tokio_stream::StreamExt::filter_map(receiver, |update| match update {
        Ok(update) => match SseEvent::default().event(update.name()).json_data(&update) {
            Ok(ev) => Some(Ok(ev)),
            Err(err) => {
                tracing::error!(
                    "Failed to serialize SSE payload for {}: {}",
                    update.name(),
                    err
                );
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::debug!("Feed stream lagged, skipped {} updates", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

async fn record_consumption(
    State(state): State<Arc<AppState>>,
    Json(new_event): Json<NewConsumptionEvent>,
) -> ApiResult<(StatusCode, Json<ConsumptionEvent>)> {
    let event = state
        .consumption_service
        .record_consumption(new_event)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn recent_consumption(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<ConsumptionEvent>>> {
    let limit = query.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    let events = state.consumption_service.recent_consumption(limit).await?;
    Ok(Json(events))
}

async fn weekly_trend(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendQuery>,
) -> ApiResult<Json<Vec<DailyConsumption>>> {
    let today = query.today.unwrap_or_else(|| Utc::now().date_naive());
    let trend = state.consumption_service.weekly_trend(today).await?;
    Ok(Json(trend))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/consumption",
            get(recent_consumption).post(record_consumption),
        )
        .route("/consumption/trend", get(weekly_trend))
        .route("/consumption/feed", get(get_feed))
        .route("/consumption/feed/refresh", post(refresh_feed))
        .route("/consumption/feed/stream", get(stream_feed))
}
