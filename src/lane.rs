//! Lane switcher: decides which content occupies the shared slot.
//!
//! Wraps the coordinator with the pipeline-facing policy: per-user event
//! filtering, the duplicate-content tick filter, the enable toggle, and the
//! media-ticker hand-off. The slot itself flips between the ticker lane and
//! the ordinary leading-icon content.

use std::time::Instant;

use tracing::debug;

use crate::coordinator::Coordinator;
use crate::filter::TickFilter;
use crate::notify::{NotificationPosted, SegmentId};

/// The two mutually exclusive occupants of the shared presentation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOccupant {
    LeadingIcons,
    Ticker,
}

/// Per-surface switcher owning the coordinator and the slot state.
#[derive(Debug)]
pub struct LaneSwitcher {
    coordinator: Coordinator,
    filter: TickFilter,
    occupant: SlotOccupant,
    should_show: bool,
    user_id: u32,
}

impl LaneSwitcher {
    #[must_use]
    pub fn new(coordinator: Coordinator, user_id: u32) -> Self {
        Self {
            coordinator,
            filter: TickFilter::new(),
            occupant: SlotOccupant::LeadingIcons,
            should_show: true,
            user_id,
        }
    }

    #[must_use]
    pub fn occupant(&self) -> SlotOccupant {
        self.occupant
    }

    /// Whether the ticker both holds the slot and has something to show.
    #[must_use]
    pub fn is_showing(&self) -> bool {
        self.occupant == SlotOccupant::Ticker
            && self.should_show
            && self.coordinator.is_lane_showing()
    }

    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    #[must_use]
    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.coordinator
    }

    /// Run the coordinator's due deadlines.
    pub fn tick(&mut self, now: Instant) {
        self.coordinator.tick(now);
        self.sync_occupant();
    }

    /// Switch the slot occupant. Redundant toggles with the same value are
    /// no-ops.
    pub fn present(&mut self, segment_active: bool) {
        let desired = if segment_active {
            SlotOccupant::Ticker
        } else {
            SlotOccupant::LeadingIcons
        };
        if self.occupant == desired {
            return;
        }
        debug!(target: "tickerlane::lane", ?desired, "slot occupant switched");
        self.occupant = desired;
    }

    /// Enable/disable presenting the ticker. The coordinator keeps running
    /// underneath so re-enabling picks the live segment back up.
    pub fn set_should_show(&mut self, visible: bool) {
        if self.should_show == visible {
            return;
        }
        self.should_show = visible;
        if self.coordinator.is_lane_showing() {
            self.present(visible);
        }
    }

    /// Feed a posted notification. Events for a non-current user are
    /// dropped before they reach the queue. Returns whether the event was
    /// accepted.
    pub fn notification_posted(&mut self, event: &NotificationPosted, now: Instant) -> bool {
        if event.user_id != self.user_id {
            debug!(
                target: "tickerlane::lane",
                event_user = event.user_id,
                current_user = self.user_id,
                "dropping event for non-current user"
            );
            return false;
        }
        if !event.postable() {
            return false;
        }
        if !self.filter.should_tick(event) {
            return false;
        }
        self.coordinator.post(event, now);
        self.sync_occupant();
        true
    }

    /// Feed a removal event.
    pub fn notification_removed(&mut self, id: &SegmentId, now: Instant) {
        self.filter.remove(&self.filter_key_for(id));
        self.coordinator.remove(id, now);
        self.sync_occupant();
    }

    /// React to a user switch: a displayed segment belonging to the old
    /// user is torn down immediately; one belonging to the new user is
    /// kept.
    pub fn user_switched(&mut self, new_user: u32, now: Instant) {
        if self.user_id == new_user {
            return;
        }
        debug!(target: "tickerlane::lane", new_user, "user switched");
        self.user_id = new_user;
        let Some(current_user) = self.coordinator.current_user() else {
            return;
        };
        if current_user != new_user {
            self.coordinator.halt(now);
            self.present(false);
        }
    }

    /// Media-ticker hand-off: while an ongoing media session owns the slot
    /// for `package`, the lane steps aside; once it ends, the notification
    /// is treated as removed.
    pub fn media_ticker_changed(&mut self, package: &str, ongoing: bool, now: Instant) {
        if self.coordinator.current_package() != Some(package) {
            return;
        }
        self.set_should_show(ongoing);
        if !ongoing {
            if let Some(id) = self.coordinator.current_id() {
                self.notification_removed(&id, now);
            }
        }
    }

    fn sync_occupant(&mut self) {
        let lane_active = self.coordinator.is_lane_showing();
        if lane_active && self.should_show {
            self.present(true);
        } else if !lane_active {
            self.present(false);
        }
    }

    fn filter_key_for(&self, id: &SegmentId) -> String {
        format!("{}|{}|{}", self.user_id, id.package, id.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::TickerState;
    use crate::geometry::CutoutGeometry;
    use crate::surface::{AnimationKind, ClockSurface, LaneSurface, StatusSurface, Tintable};

    struct NullLane;
    struct NullStatus {
        visible: bool,
    }
    struct NullClock;

    impl Tintable for NullLane {
        fn set_tint(&mut self, _tint: u32) {}
    }
    impl LaneSurface for NullLane {
        fn set_icon(&mut self, _icon: Option<&str>) {}
        fn set_text(&mut self, _text: &str) {}
        fn set_scroll_offset(&mut self, _offset: usize) {}
        fn show(&mut self, _animation: AnimationKind) {}
        fn hide(&mut self, _animation: AnimationKind) {}
        fn view_width(&self) -> Option<usize> {
            Some(30)
        }
        fn icon_width(&self) -> usize {
            2
        }
    }
    impl StatusSurface for NullStatus {
        fn show(&mut self, _animation: AnimationKind) {
            self.visible = true;
        }
        fn hide(&mut self, _animation: AnimationKind) {
            self.visible = false;
        }
        fn is_visible(&self) -> bool {
            self.visible
        }
    }
    impl ClockSurface for NullClock {
        fn is_centered(&self) -> bool {
            false
        }
        fn show(&mut self, _animation: AnimationKind) {}
        fn hide(&mut self, _animation: AnimationKind) {}
        fn lock_visibility(&mut self, _locked: bool) {}
    }

    fn switcher(user_id: u32) -> LaneSwitcher {
        let coordinator = Coordinator::new(
            Box::new(NullLane),
            Box::new(NullStatus { visible: true }),
            Box::new(NullClock),
            CutoutGeometry::flat(30),
        );
        LaneSwitcher::new(coordinator, user_id)
    }

    fn posted_for_user(id: i32, user_id: u32, text: &str) -> NotificationPosted {
        NotificationPosted {
            id,
            package: "com.example.app".to_string(),
            user_id,
            ticker_text: text.to_string(),
            icon: None,
            clearable: false,
            show_ticker: true,
            alert_once: false,
        }
    }

    #[test]
    fn accepted_event_takes_the_slot() {
        let mut switcher = switcher(0);
        let now = Instant::now();
        assert!(switcher.notification_posted(&posted_for_user(1, 0, "hi"), now));
        assert_eq!(switcher.occupant(), SlotOccupant::Ticker);
        assert!(switcher.is_showing());
    }

    #[test]
    fn foreign_user_events_are_dropped() {
        let mut switcher = switcher(0);
        let now = Instant::now();
        assert!(!switcher.notification_posted(&posted_for_user(1, 10, "hi"), now));
        assert_eq!(switcher.occupant(), SlotOccupant::LeadingIcons);
        assert_eq!(switcher.coordinator().queued(), 0);
    }

    #[test]
    fn duplicate_content_does_not_requeue() {
        let mut switcher = switcher(0);
        let now = Instant::now();
        assert!(switcher.notification_posted(&posted_for_user(1, 0, "hi"), now));
        assert!(!switcher.notification_posted(&posted_for_user(1, 0, "hi"), now));
        assert_eq!(switcher.coordinator().queued(), 1);
    }

    #[test]
    fn present_is_idempotent() {
        let mut switcher = switcher(0);
        switcher.present(true);
        switcher.present(true);
        assert_eq!(switcher.occupant(), SlotOccupant::Ticker);
        switcher.present(false);
        switcher.present(false);
        assert_eq!(switcher.occupant(), SlotOccupant::LeadingIcons);
    }

    #[test]
    fn user_switch_tears_down_foreign_segment() {
        let mut switcher = switcher(0);
        let now = Instant::now();
        switcher.notification_posted(&posted_for_user(1, 0, "hi"), now);
        assert!(switcher.is_showing());

        switcher.user_switched(10, now);
        assert_eq!(switcher.coordinator().state(), TickerState::Halting);
        assert!(!switcher.is_showing());
        assert_eq!(switcher.occupant(), SlotOccupant::LeadingIcons);
    }

    #[test]
    fn user_switch_keeps_matching_segment() {
        let mut switcher = switcher(0);
        let now = Instant::now();
        switcher.notification_posted(&posted_for_user(1, 0, "hi"), now);
        switcher.user_switched(0, now);
        assert!(switcher.is_showing());
    }

    #[test]
    fn disabling_hides_while_coordinator_keeps_running() {
        let mut switcher = switcher(0);
        let now = Instant::now();
        switcher.notification_posted(&posted_for_user(1, 0, "hi"), now);
        switcher.set_should_show(false);
        assert!(!switcher.is_showing());
        assert!(switcher.coordinator().is_lane_showing());

        switcher.set_should_show(true);
        assert!(switcher.is_showing());
    }

    #[test]
    fn media_ticker_end_removes_the_notification() {
        let mut switcher = switcher(0);
        let now = Instant::now();
        switcher.notification_posted(&posted_for_user(1, 0, "now playing"), now);
        switcher.media_ticker_changed("com.example.app", false, now);
        assert!(!switcher.is_showing());
        // The filter entry was evicted, so the same content ticks again.
        assert!(switcher.notification_posted(&posted_for_user(1, 0, "now playing"), now));
    }

    #[test]
    fn media_ticker_for_other_package_is_ignored() {
        let mut switcher = switcher(0);
        let now = Instant::now();
        switcher.notification_posted(&posted_for_user(1, 0, "hi"), now);
        switcher.media_ticker_changed("com.other.app", false, now);
        assert!(switcher.is_showing());
    }
}
