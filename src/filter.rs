//! Tick filter: drops re-posts that would re-render an unchanged ticker.
//!
//! Keeps the last ticker text per notification key in a size-budgeted cache
//! (budgeted by text length, oldest entries evicted first). A re-post with
//! identical text is skipped, and alert-once notifications only tick on
//! their first post.

use std::collections::HashMap;
use std::collections::VecDeque;

use tracing::debug;

use crate::notify::NotificationPosted;

/// Total text length the cache may hold before evicting old entries.
const CACHE_BUDGET: usize = 1024;

/// Last-ticker-text cache with insertion-order eviction.
#[derive(Debug, Default)]
pub struct TickFilter {
    entries: HashMap<String, String>,
    order: VecDeque<String>,
    used: usize,
}

impl TickFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `event` should tick, updating the cache either way.
    pub fn should_tick(&mut self, event: &NotificationPosted) -> bool {
        let key = event.filter_key();
        let first_tick = !self.entries.contains_key(&key);

        if !first_tick && event.alert_once {
            debug!(target: "tickerlane::filter", %key, "alert-once re-post skipped");
            return false;
        }

        let previous = self.put(key.clone(), event.ticker_text.clone());
        if previous.as_deref() == Some(event.ticker_text.as_str()) {
            debug!(target: "tickerlane::filter", %key, "duplicate ticker content skipped");
            return false;
        }
        true
    }

    /// Forget a notification, so a later re-post ticks again.
    pub fn remove(&mut self, event_key: &str) {
        if let Some(text) = self.entries.remove(event_key) {
            self.used -= text.len();
            self.order.retain(|k| k != event_key);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn put(&mut self, key: String, text: String) -> Option<String> {
        let previous = self.entries.insert(key.clone(), text.clone());
        match &previous {
            Some(old) => self.used -= old.len(),
            None => self.order.push_back(key),
        }
        self.used += text.len();
        while self.used > CACHE_BUDGET {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if let Some(evicted) = self.entries.remove(&oldest) {
                self.used -= evicted.len();
            }
        }
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posted(id: i32, text: &str, alert_once: bool) -> NotificationPosted {
        NotificationPosted {
            id,
            package: "com.example.app".to_string(),
            user_id: 0,
            ticker_text: text.to_string(),
            icon: None,
            clearable: false,
            show_ticker: true,
            alert_once,
        }
    }

    #[test]
    fn first_post_always_ticks() {
        let mut filter = TickFilter::new();
        assert!(filter.should_tick(&posted(1, "hello", false)));
    }

    #[test]
    fn duplicate_content_is_skipped() {
        let mut filter = TickFilter::new();
        assert!(filter.should_tick(&posted(1, "hello", false)));
        assert!(!filter.should_tick(&posted(1, "hello", false)));
    }

    #[test]
    fn changed_content_ticks_again() {
        let mut filter = TickFilter::new();
        assert!(filter.should_tick(&posted(1, "hello", false)));
        assert!(filter.should_tick(&posted(1, "hello again", false)));
    }

    #[test]
    fn alert_once_only_ticks_on_first_post() {
        let mut filter = TickFilter::new();
        assert!(filter.should_tick(&posted(1, "song A", true)));
        assert!(!filter.should_tick(&posted(1, "song B", true)));
    }

    #[test]
    fn removal_lets_the_same_content_tick_again() {
        let mut filter = TickFilter::new();
        let event = posted(1, "hello", false);
        assert!(filter.should_tick(&event));
        filter.remove(&event.filter_key());
        assert!(filter.should_tick(&event));
    }

    #[test]
    fn cache_evicts_oldest_when_over_budget() {
        let mut filter = TickFilter::new();
        let chunk = "x".repeat(400);
        for id in 0..4 {
            assert!(filter.should_tick(&posted(id, &chunk, false)));
        }
        assert!(filter.len() < 4);
        // The evicted oldest entry ticks again as if never seen.
        assert!(filter.should_tick(&posted(0, &chunk, false)));
    }

    #[test]
    fn distinct_notifications_do_not_collide() {
        let mut filter = TickFilter::new();
        assert!(filter.should_tick(&posted(1, "hello", false)));
        assert!(filter.should_tick(&posted(2, "hello", false)));
    }
}
