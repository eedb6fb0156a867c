//! Live feed result, status, and notification types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consumption::ConsumptionEvent;

/// Conditions surfaced by the live feed. The feed never retries on its own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("No authenticated owner for the live feed")]
    NotAuthenticated,

    #[error("Bulk read failed: {0}")]
    FetchFailed(String),

    #[error("Push subscription unavailable: {0}")]
    SubscriptionUnavailable(String),
}

/// Result of offering one event to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Admission {
    /// The event is now part of the view.
    Admitted,
    /// An event with the same id is already held.
    DuplicateRejected,
    /// The event belongs to another owner.
    OwnerMismatch,
    /// The view is full and the event is older than everything it holds.
    OutsideWindow,
    /// No owner is live (never initialized, torn down, or a stale delivery).
    Inactive,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Outcome of a successful `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// The bulk read was applied; `loaded` is the resulting view length.
    Applied { loaded: usize },
    /// A newer initialize or a teardown started first; the result was discarded.
    Superseded,
}

/// Lifecycle state of the feed as seen by a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedStatus {
    #[default]
    Idle,
    Loading,
    Live,
    /// Historical data only; the push channel could not be opened.
    Static,
    /// The push channel dropped after opening.
    Disconnected,
    /// The last bulk read failed.
    Failed,
}

impl FeedStatus {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            FeedStatus::Static | FeedStatus::Disconnected | FeedStatus::Failed
        )
    }
}

/// Point-in-time copy of the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub owner: Option<String>,
    pub status: FeedStatus,
    pub limit: usize,
    pub events: Vec<ConsumptionEvent>,
}

impl FeedSnapshot {
    /// Empty and not in an error state: show a neutral "waiting for data" state.
    pub fn is_waiting(&self) -> bool {
        self.events.is_empty() && !self.status.is_error()
    }
}

/// Notifications broadcast to feed observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedUpdate {
    Reloaded { owner: String, count: usize },
    Admitted { event: ConsumptionEvent },
    SubscriptionDropped { owner: String },
    FetchFailed { owner: String, message: String },
    TornDown,
}

impl FeedUpdate {
    /// Short event name used by streaming transports.
    pub fn name(&self) -> &'static str {
        match self {
            FeedUpdate::Reloaded { .. } => "feed:reloaded",
            FeedUpdate::Admitted { .. } => "feed:admitted",
            FeedUpdate::SubscriptionDropped { .. } => "feed:subscription-dropped",
            FeedUpdate::FetchFailed { .. } => "feed:fetch-failed",
            FeedUpdate::TornDown => "feed:torn-down",
        }
    }
}
