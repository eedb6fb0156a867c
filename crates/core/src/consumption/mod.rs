//! Consumption module - consumption events, the live feed, and services.

mod consumption_model;
mod consumption_service;
mod consumption_traits;
pub mod feed;

pub use consumption_model::{
    trend_start, weekly_trend, ConsumptionEvent, DailyConsumption, NewConsumptionEvent,
};
pub use consumption_service::ConsumptionService;
pub use consumption_traits::{ConsumptionServiceTrait, ConsumptionStoreTrait};
pub use feed::{
    Admission, EventOrigin, FeedError, FeedService, FeedSnapshot, FeedStatus, FeedUpdate, FeedView,
    InitOutcome, LiveFeedReconciler, PushSubscription,
};
