//! Bounded, ordered, deduplicated event sequence.

use std::collections::HashSet;

use crate::consumption::ConsumptionEvent;

use super::feed_model::Admission;

/// Where an event entered the view from. Decides placement on timestamp ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOrigin {
    /// Historical batch: keeps the batch order among equal timestamps.
    Bulk,
    /// Live delivery: goes ahead of every entry with an equal timestamp.
    Push,
}

/// Events sorted by timestamp descending, capped at `limit` entries.
///
/// `seen` always holds exactly the ids present in `entries`.
#[derive(Debug, Clone, Default)]
pub struct FeedView {
    entries: Vec<ConsumptionEvent>,
    seen: HashSet<String>,
    limit: usize,
}

impl FeedView {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::with_capacity(limit.min(256)),
            seen: HashSet::new(),
            limit,
        }
    }

    /// Builds a view from a bulk read.
    pub fn from_bulk(events: impl IntoIterator<Item = ConsumptionEvent>, limit: usize) -> Self {
        let mut view = Self::new(limit);
        for event in events {
            view.admit(event, EventOrigin::Bulk);
        }
        view
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn events(&self) -> &[ConsumptionEvent] {
        &self.entries
    }

    /// Inserts `event` at its sorted position, evicting the oldest entry if
    /// the view grows past its limit.
    pub fn admit(&mut self, event: ConsumptionEvent, origin: EventOrigin) -> Admission {
        if self.seen.contains(&event.id) {
            return Admission::DuplicateRejected;
        }

        let position = match origin {
            EventOrigin::Push => self
                .entries
                .partition_point(|held| held.timestamp > event.timestamp),
            EventOrigin::Bulk => self
                .entries
                .partition_point(|held| held.timestamp >= event.timestamp),
        };

        let id = event.id.clone();
        self.seen.insert(id.clone());
        self.entries.insert(position, event);

        if self.entries.len() > self.limit {
            if let Some(evicted) = self.entries.pop() {
                self.seen.remove(&evicted.id);
                if evicted.id == id {
                    return Admission::OutsideWindow;
                }
            }
        }
        Admission::Admitted
    }

    /// Changes the capacity, dropping the oldest entries if it shrinks.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        while self.entries.len() > limit {
            if let Some(evicted) = self.entries.pop() {
                self.seen.remove(&evicted.id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(id: &str, t: i64) -> ConsumptionEvent {
        ConsumptionEvent {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            product_name: format!("product-{}", id),
            quantity_used: 1.0,
            timestamp: Utc.timestamp_opt(t, 0).unwrap(),
        }
    }

    fn ids(view: &FeedView) -> Vec<&str> {
        view.events().iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let mut view = FeedView::new(3);
        for (id, t) in [("A", 1), ("B", 2), ("C", 3), ("D", 4)] {
            assert_eq!(
                view.admit(event(id, t), EventOrigin::Push),
                Admission::Admitted
            );
        }
        assert_eq!(ids(&view), vec!["D", "C", "B"]);
        assert!(!view.contains("A"));
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut view = FeedView::new(5);
        assert!(view.admit(event("A", 1), EventOrigin::Bulk).is_admitted());
        assert_eq!(
            view.admit(event("A", 1), EventOrigin::Push),
            Admission::DuplicateRejected
        );
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_older_event_into_full_view_is_outside_window() {
        let mut view = FeedView::new(2);
        view.admit(event("B", 5), EventOrigin::Push);
        view.admit(event("C", 6), EventOrigin::Push);
        assert_eq!(
            view.admit(event("A", 1), EventOrigin::Push),
            Admission::OutsideWindow
        );
        assert_eq!(ids(&view), vec!["C", "B"]);
        assert!(!view.contains("A"));
    }

    #[test]
    fn test_late_push_is_inserted_in_time_order() {
        let mut view = FeedView::from_bulk(vec![event("X", 5), event("Y", 3)], 10);
        view.admit(event("W", 4), EventOrigin::Push);
        assert_eq!(ids(&view), vec!["X", "W", "Y"]);
    }

    #[test]
    fn test_push_wins_timestamp_ties() {
        let mut view = FeedView::from_bulk(vec![event("X", 5), event("Y", 5)], 10);
        assert_eq!(ids(&view), vec!["X", "Y"]);
        view.admit(event("P", 5), EventOrigin::Push);
        assert_eq!(ids(&view), vec!["P", "X", "Y"]);
    }

    #[test]
    fn test_bulk_tolerates_unsorted_input() {
        let view = FeedView::from_bulk(vec![event("Y", 3), event("X", 5), event("Z", 4)], 10);
        assert_eq!(ids(&view), vec!["X", "Z", "Y"]);
    }

    #[test]
    fn test_shrinking_limit_truncates_oldest() {
        let mut view = FeedView::from_bulk(vec![event("X", 5), event("Y", 3), event("Z", 1)], 10);
        view.set_limit(2);
        assert_eq!(ids(&view), vec!["X", "Y"]);
        assert!(!view.contains("Z"));
    }

    #[test]
    fn test_zero_limit_holds_nothing() {
        let mut view = FeedView::new(0);
        assert_eq!(
            view.admit(event("A", 1), EventOrigin::Push),
            Admission::OutsideWindow
        );
        assert!(view.is_empty());
    }
}
