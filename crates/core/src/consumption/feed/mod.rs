//! Live consumption feed.
//!
//! Maintains a bounded, newest-first, deduplicated view of one owner's recent
//! consumption events. The view is seeded by a bulk read and then kept current
//! by a push subscription; both paths go through the same admission logic.

mod feed_model;
mod feed_service;
mod feed_view;
mod reconciler;
mod subscription;

pub use feed_model::{Admission, FeedError, FeedSnapshot, FeedStatus, FeedUpdate, InitOutcome};
pub use feed_service::FeedService;
pub use feed_view::{EventOrigin, FeedView};
pub use reconciler::LiveFeedReconciler;
pub use subscription::PushSubscription;
