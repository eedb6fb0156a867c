//! Handle for an open push subscription.

use std::fmt;

use tokio::sync::mpsc;

use crate::consumption::ConsumptionEvent;

type CloseHook = Box<dyn FnOnce() + Send + 'static>;

/// Stream of newly inserted events matching an owner filter.
///
/// The store adapter owns the sending half. The subscription ends when the
/// adapter drops its sender (channel dropped) or when this handle is closed
/// or dropped, which runs the adapter's close hook.
pub struct PushSubscription {
    events: mpsc::Receiver<ConsumptionEvent>,
    on_close: Option<CloseHook>,
}

impl PushSubscription {
    pub fn new(events: mpsc::Receiver<ConsumptionEvent>) -> Self {
        Self {
            events,
            on_close: None,
        }
    }

    /// Registers a hook that releases the adapter's resources on close.
    pub fn with_close_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Next delivered event, or `None` once the channel has dropped.
    pub async fn next(&mut self) -> Option<ConsumptionEvent> {
        self.events.recv().await
    }

    /// Stops delivery and releases the channel.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for PushSubscription {
    fn drop(&mut self) {
        self.events.close();
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}

impl fmt::Debug for PushSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushSubscription")
            .field("has_close_hook", &self.on_close.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_close_runs_hook_once_and_stops_sender() {
        let (tx, rx) = mpsc::channel(4);
        let closed = Arc::new(AtomicBool::new(false));
        let flag = closed.clone();
        let subscription = PushSubscription::new(rx).with_close_hook(move || {
            assert!(!flag.swap(true, Ordering::SeqCst));
        });

        subscription.close();
        assert!(closed.load(Ordering::SeqCst));
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_next_returns_none_when_sender_dropped() {
        let (tx, rx) = mpsc::channel::<ConsumptionEvent>(1);
        let mut subscription = PushSubscription::new(rx);
        drop(tx);
        assert!(subscription.next().await.is_none());
    }
}
