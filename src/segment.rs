//! Segment queue: ordered ticker items with supersession and logical removal.
//!
//! The queue is owned by the presentation coordinator and only mutated from
//! the UI domain. The `removed` flag is the one piece of state the scroll
//! clock also reads, so it lives behind an atomic that only ever flips
//! false -> true.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::notify::SegmentId;

/// One queued ticker item. Immutable once created except for `removed`.
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: SegmentId,
    pub icon: Option<String>,
    pub text: String,
    pub user_id: u32,
    removed: Arc<AtomicBool>,
}

impl Segment {
    #[must_use]
    pub fn new(id: SegmentId, icon: Option<String>, text: String, user_id: u32) -> Self {
        Self {
            id,
            icon,
            text,
            user_id,
            removed: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    pub fn mark_removed(&self) {
        self.removed.store(true, Ordering::Release);
    }

    /// Shared handle for the scroll clock, which stops stepping a segment
    /// whose relevance window has closed.
    #[must_use]
    pub(crate) fn removed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.removed)
    }
}

/// Result of an enqueue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The live head already shows this exact (identity, icon, text) tuple.
    Ignored,
    /// The queue was empty; the new segment is head and display must start.
    NewHead,
    /// Appended behind the current head.
    Pending,
}

/// FIFO of pending/active segments. Head is the displayed (or
/// about-to-display) segment.
#[derive(Debug, Default)]
pub struct SegmentQueue {
    segments: VecDeque<Segment>,
}

impl SegmentQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn head(&self) -> Option<&Segment> {
        self.segments.front()
    }

    /// Add a segment, deduplicating against the live head and superseding
    /// any queued segment with the same identity.
    ///
    /// A live head with identical identity, icon, and text makes the call a
    /// no-op so repeated delivery never re-renders the lane. Otherwise an
    /// update replaces, never duplicates: pending matches are evicted, and a
    /// matching head (which may be mid-display) is logically removed so the
    /// advance path skips it.
    pub fn enqueue(&mut self, segment: Segment) -> EnqueueOutcome {
        if let Some(head) = self.segments.front() {
            if !head.is_removed()
                && head.id == segment.id
                && head.icon == segment.icon
                && head.text == segment.text
            {
                tracing::debug!(id = %segment.id, "duplicate head segment ignored");
                return EnqueueOutcome::Ignored;
            }
        }

        let mut superseded_head = false;
        let mut idx = 0;
        self.segments.retain(|seg| {
            let matches = seg.id == segment.id && !seg.is_removed();
            let at_head = idx == 0;
            idx += 1;
            if matches && at_head {
                seg.mark_removed();
                superseded_head = true;
                return true;
            }
            !matches
        });
        if superseded_head {
            tracing::debug!(id = %segment.id, "superseded displaying head");
        }

        let was_empty = self.segments.is_empty();
        self.segments.push_back(segment);
        if was_empty {
            EnqueueOutcome::NewHead
        } else {
            EnqueueOutcome::Pending
        }
    }

    /// Logically delete all live segments matching `id`. Returns `true`
    /// when the current head was among them, so the coordinator can decide
    /// whether an immediate halt is required.
    pub fn mark_removed(&mut self, id: &SegmentId) -> bool {
        let mut head_removed = false;
        for (idx, seg) in self.segments.iter().enumerate() {
            if &seg.id == id && !seg.is_removed() {
                seg.mark_removed();
                if idx == 0 {
                    head_removed = true;
                }
            }
        }
        head_removed
    }

    /// Pop the current head, then skip any logically-deleted entries.
    /// Returns the next live head, or `None` once the queue is drained.
    pub fn advance(&mut self) -> Option<&Segment> {
        self.segments.pop_front();
        while self.segments.front().is_some_and(Segment::is_removed) {
            self.segments.pop_front();
        }
        self.segments.front()
    }

    /// Whether any live segment waits behind the head.
    #[must_use]
    pub fn pending_live(&self) -> bool {
        self.segments.iter().skip(1).any(|seg| !seg.is_removed())
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: i32, package: &str, text: &str) -> Segment {
        Segment::new(
            SegmentId::new(id, package),
            Some("bell".to_string()),
            text.to_string(),
            0,
        )
    }

    #[test]
    fn first_enqueue_becomes_head() {
        let mut queue = SegmentQueue::new();
        let outcome = queue.enqueue(segment(1, "a", "Hello"));
        assert_eq!(outcome, EnqueueOutcome::NewHead);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.head().unwrap().text, "Hello");
    }

    #[test]
    fn duplicate_head_is_ignored() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "Hello"));
        let outcome = queue.enqueue(segment(1, "a", "Hello"));
        assert_eq!(outcome, EnqueueOutcome::Ignored);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.head().unwrap().id, SegmentId::new(1, "a"));
    }

    #[test]
    fn head_with_different_text_is_not_a_duplicate() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "Hello"));
        let outcome = queue.enqueue(segment(1, "a", "Hello again"));
        assert_eq!(outcome, EnqueueOutcome::Pending);
    }

    #[test]
    fn head_with_different_icon_is_not_a_duplicate() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "Hello"));
        let mut other_icon = segment(1, "a", "Hello");
        other_icon.icon = Some("mail".to_string());
        assert_eq!(queue.enqueue(other_icon), EnqueueOutcome::Pending);
    }

    #[test]
    fn supersession_keeps_exactly_one_live_segment_per_identity() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "first"));
        queue.enqueue(segment(2, "b", "other"));
        queue.enqueue(segment(2, "b", "newer"));

        let matching: Vec<&Segment> = queue
            .segments
            .iter()
            .filter(|seg| !seg.is_removed() && seg.id == SegmentId::new(2, "b"))
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].text, "newer");
    }

    #[test]
    fn superseding_the_displaying_head_marks_it_removed_in_place() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "old"));
        let outcome = queue.enqueue(segment(1, "a", "new"));
        assert_eq!(outcome, EnqueueOutcome::Pending);
        // Head keeps displaying until the coordinator advances past it.
        assert!(queue.head().unwrap().is_removed());
        assert_eq!(queue.head().unwrap().text, "old");
        assert_eq!(queue.advance().unwrap().text, "new");
    }

    #[test]
    fn mark_removed_flags_all_matches_and_reports_head() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "one"));
        queue.enqueue(segment(2, "b", "two"));
        assert!(queue.mark_removed(&SegmentId::new(1, "a")));
        assert!(queue.head().unwrap().is_removed());
    }

    #[test]
    fn mark_removed_for_pending_segment_does_not_report_head() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "one"));
        queue.enqueue(segment(2, "b", "two"));
        assert!(!queue.mark_removed(&SegmentId::new(2, "b")));
    }

    #[test]
    fn advance_skips_removed_entries() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "one"));
        queue.enqueue(segment(2, "b", "two"));
        queue.enqueue(segment(3, "c", "three"));
        queue.mark_removed(&SegmentId::new(2, "b"));

        let next = queue.advance().unwrap();
        assert_eq!(next.id, SegmentId::new(3, "c"));
        assert!(!next.is_removed());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn advance_on_all_removed_queue_drains_to_empty() {
        let mut queue = SegmentQueue::new();
        queue.enqueue(segment(1, "a", "one"));
        queue.enqueue(segment(2, "b", "two"));
        queue.mark_removed(&SegmentId::new(1, "a"));
        queue.mark_removed(&SegmentId::new(2, "b"));

        assert!(queue.advance().is_none());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn removed_flag_is_visible_through_clones() {
        let seg = segment(1, "a", "one");
        let cloned = seg.clone();
        seg.mark_removed();
        assert!(cloned.is_removed());
    }
}
