//! Presentation coordinator: the ticker's visible/hidden state machine.
//!
//! Owns the segment queue and all widget mutations, strictly from the UI
//! domain. Timing is deadline-driven: the host calls [`Coordinator::tick`]
//! with the current instant and due deadlines fire there, the same way the
//! event loop runs its periodic tasks. The only background party is the
//! scroll clock, which posts offset frames through a channel drained here.

use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use tracing::debug;

use crate::fitter;
use crate::geometry::CutoutGeometry;
use crate::notify::{NotificationPosted, SegmentId};
use crate::scroll::{ScrollFrame, ScrollMetrics, ScrollSession, SCROLL_START_DELAY};
use crate::segment::{EnqueueOutcome, Segment, SegmentQueue};
use crate::surface::{AnimationKind, ClockSurface, LaneSurface, StatusSurface, TextRepeatGate};

/// How long a completed fragment stays visible before the next action.
pub(crate) const FRAGMENT_DWELL: Duration = Duration::from_millis(5000);

/// Delay between a scroll finishing and advancing the queue, so a ticker is
/// not yanked the instant its motion stops.
pub(crate) const ADVANCE_END_DELAY: Duration = Duration::from_millis(1500);

/// Cadence of the liveness check over the active scroll session.
pub(crate) const LIVENESS_CHECK_DELAY: Duration = Duration::from_millis(100);

/// Nominal duration of the show/hide transition animations.
pub(crate) const TRANSITION_SETTLE: Duration = Duration::from_millis(360);

/// Presentation states of the ticker lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerState {
    /// Nothing queued; normal status content visible.
    Idle,
    /// First segment transitioning in.
    Starting,
    /// A segment is visible, scrolling or paginating.
    Active,
    /// Swapping to the next queued segment in place.
    Advancing,
    /// Forced early teardown.
    Halting,
    /// Graceful teardown after queue exhaustion.
    Done,
}

/// The ticker's presentation coordinator. One per status-bar surface,
/// constructed by the host and torn down with it.
pub struct Coordinator {
    queue: SegmentQueue,
    geometry: CutoutGeometry,
    state: TickerState,
    current: Option<Segment>,
    lane: Box<dyn LaneSurface>,
    status: Box<dyn StatusSurface>,
    clock: Box<dyn ClockSurface>,
    scroll: Option<ScrollSession>,
    frames: Option<Receiver<ScrollFrame>>,
    continuation: Option<String>,
    icon_hidden: bool,
    awaiting_layout: bool,
    next_liveness_at: Option<Instant>,
    advance_at: Option<Instant>,
    dwell_until: Option<Instant>,
    settle_at: Option<Instant>,
    repeat_gate: TextRepeatGate,
    competing_occupant: bool,
    tint: Option<u32>,
}

impl Coordinator {
    #[must_use]
    pub fn new(
        lane: Box<dyn LaneSurface>,
        status: Box<dyn StatusSurface>,
        clock: Box<dyn ClockSurface>,
        geometry: CutoutGeometry,
    ) -> Self {
        Self {
            queue: SegmentQueue::new(),
            geometry,
            state: TickerState::Idle,
            current: None,
            lane,
            status,
            clock,
            scroll: None,
            frames: None,
            continuation: None,
            icon_hidden: false,
            awaiting_layout: false,
            next_liveness_at: None,
            advance_at: None,
            dwell_until: None,
            settle_at: None,
            repeat_gate: TextRepeatGate::new(),
            competing_occupant: false,
            tint: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> TickerState {
        self.state
    }

    /// Whether the ticker lane currently occupies the presentation slot.
    #[must_use]
    pub fn is_lane_showing(&self) -> bool {
        matches!(
            self.state,
            TickerState::Starting | TickerState::Active | TickerState::Advancing
        )
    }

    /// Package of the displayed segment, if any.
    #[must_use]
    pub fn current_package(&self) -> Option<&str> {
        self.current.as_ref().map(|seg| seg.id.package.as_str())
    }

    /// User the displayed segment belongs to, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<u32> {
        self.current.as_ref().map(|seg| seg.user_id)
    }

    #[must_use]
    pub fn current_id(&self) -> Option<SegmentId> {
        self.current.as_ref().map(|seg| seg.id.clone())
    }

    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Told by the lane switcher whether another occupant holds the shared
    /// slot, which suppresses re-showing the centered clock on teardown.
    pub fn set_competing_occupant(&mut self, occupied: bool) {
        self.competing_occupant = occupied;
    }

    /// Forward a tint change to the lane. Computing the tint is external.
    pub fn set_tint(&mut self, tint: u32) {
        self.tint = Some(tint);
        self.lane.set_tint(tint);
    }

    /// Swap in a new geometry snapshot on rotation/configuration change.
    /// In non-paginated mode the current text is re-applied so the lane
    /// re-measures against the new strip.
    pub fn geometry_changed(&mut self, geometry: CutoutGeometry, _now: Instant) {
        self.geometry = geometry;
        if !self.geometry.paginates() && self.is_lane_showing() {
            if let Some(seg) = &self.current {
                let text = seg.text.clone();
                self.repeat_gate.reset();
                self.lane.set_text(&text);
            }
        }
    }

    /// Feed a posted notification. Only postable events (ticker flag set,
    /// non-empty text, non-clearable) can start a segment; everything else
    /// silently drops.
    pub fn post(&mut self, event: &NotificationPosted, now: Instant) -> EnqueueOutcome {
        if !event.postable() {
            debug!(target: "tickerlane::coordinator", id = %event.segment_id(), "event not postable");
            return EnqueueOutcome::Ignored;
        }
        let segment = Segment::new(
            event.segment_id(),
            event.icon.clone(),
            event.ticker_text.clone(),
            event.user_id,
        );
        let outcome = self.queue.enqueue(segment);
        if outcome == EnqueueOutcome::NewHead {
            self.start_ticking(now);
        }
        outcome
    }

    /// Feed a removal. The matching segments are logically deleted; a
    /// removed head in paginated mode halts immediately rather than letting
    /// stale content sit out its dwell.
    pub fn remove(&mut self, id: &SegmentId, now: Instant) {
        let head_removed = self.queue.mark_removed(id);
        if let Some(seg) = &self.current {
            if &seg.id == id {
                seg.mark_removed();
            }
        }
        if head_removed && self.geometry.paginates() && self.is_lane_showing() {
            self.halt(now);
        }
    }

    /// Forced teardown: cancel every pending step and restore the normal
    /// content with a plain fade. Also the host's teardown entry point.
    pub fn halt(&mut self, now: Instant) {
        debug!(target: "tickerlane::coordinator", "ticker halting");
        self.stop_session();
        self.clear_deadlines();
        self.queue.clear();
        self.current = None;
        self.continuation = None;
        self.state = TickerState::Halting;
        self.settle_at = Some(now + TRANSITION_SETTLE);
        if !self.status.is_visible() {
            self.lane.hide(AnimationKind::Fade);
            self.status.show(AnimationKind::Fade);
            self.clock.lock_visibility(false);
            if !self.competing_occupant && self.clock.is_centered() {
                self.clock.show(AnimationKind::Fade);
            }
        }
    }

    /// Run due deadlines. Call this from the UI loop with the current
    /// instant; it is cheap when nothing is due.
    pub fn tick(&mut self, now: Instant) {
        self.drain_scroll_frames();

        if self.awaiting_layout && self.lane.view_width().is_some() {
            self.awaiting_layout = false;
            self.ensure_motion(now);
        }

        if self.settle_at.is_some_and(|at| now >= at) {
            self.settle_at = None;
            match self.state {
                TickerState::Starting | TickerState::Advancing => {
                    self.state = TickerState::Active;
                }
                TickerState::Done | TickerState::Halting => {
                    self.state = TickerState::Idle;
                }
                _ => {}
            }
        }

        if self.dwell_until.is_some_and(|at| now >= at) {
            self.dwell_until = None;
            match self.continuation.take() {
                Some(rest) => self.show_continuation(&rest, now),
                None => self.advance_to_next(now),
            }
        }

        if self.advance_at.is_some_and(|at| now >= at) {
            self.advance_at = None;
            self.advance_to_next(now);
        }

        if self.next_liveness_at.is_some_and(|at| now >= at) {
            self.next_liveness_at = Some(now + LIVENESS_CHECK_DELAY);
            self.run_liveness_check(now);
        }
    }

    fn drain_scroll_frames(&mut self) {
        let Some(rx) = &self.frames else {
            return;
        };
        let mut latest = None;
        while let Ok(frame) = rx.try_recv() {
            latest = Some(frame.offset);
        }
        if let Some(offset) = latest {
            self.lane.set_scroll_offset(offset);
        }
    }

    fn run_liveness_check(&mut self, now: Instant) {
        if !self.is_lane_showing() || self.geometry.paginates() {
            return;
        }
        let Some(seg) = &self.current else {
            return;
        };
        let removed = seg.is_removed();
        let running = self.scroll.as_ref().is_some_and(ScrollSession::is_running);
        if removed {
            if running || self.queue.pending_live() {
                // Stale head with motion or successors: swap it out now.
                self.advance_to_next(now);
            } else {
                self.halt(now);
            }
        } else if !running && self.advance_at.is_none() {
            self.advance_at = Some(now + ADVANCE_END_DELAY);
        }
    }

    fn start_ticking(&mut self, now: Instant) {
        debug!(target: "tickerlane::coordinator", "ticker starting");
        self.state = TickerState::Starting;
        self.settle_at = Some(now + TRANSITION_SETTLE);
        self.status.hide(AnimationKind::Fade);
        self.clock.lock_visibility(true);
        if self.clock.is_centered() {
            self.clock.hide(AnimationKind::Fade);
        }
        self.lane.show(AnimationKind::Push);
        self.repeat_gate.reset();
        self.current = self.queue.head().cloned();
        self.begin_display(now);
    }

    /// Swap to the next live queue entry in place, or tear down gracefully
    /// once the queue is drained.
    fn advance_to_next(&mut self, now: Instant) {
        self.state = TickerState::Advancing;
        self.stop_session();
        self.advance_at = None;
        self.dwell_until = None;
        self.continuation = None;
        match self.queue.advance().cloned() {
            Some(next) => {
                debug!(target: "tickerlane::coordinator", id = %next.id, "advancing to next segment");
                self.current = Some(next);
                self.begin_display(now);
                self.state = TickerState::Active;
            }
            None => self.ticker_done(now),
        }
    }

    fn ticker_done(&mut self, now: Instant) {
        debug!(target: "tickerlane::coordinator", "ticker done");
        self.stop_session();
        self.clear_deadlines();
        self.current = None;
        self.state = TickerState::Done;
        self.settle_at = Some(now + TRANSITION_SETTLE);
        self.lane.hide(AnimationKind::Push);
        self.status.show(AnimationKind::Fade);
        self.clock.lock_visibility(false);
        if !self.competing_occupant && self.clock.is_centered() {
            self.clock.show(AnimationKind::Fade);
        }
    }

    /// Apply the current head to the lane and start whatever motion the
    /// geometry calls for.
    fn begin_display(&mut self, now: Instant) {
        let Some(seg) = self.current.clone() else {
            return;
        };
        if let Some(tint) = self.tint {
            self.lane.set_tint(tint);
        }
        self.icon_hidden = seg.icon.is_none();
        self.lane.set_icon(seg.icon.as_deref());
        self.ensure_motion(now);
    }

    /// Start pagination or scrolling for the current head. Deferred until
    /// the lane reports a measured viewport in marquee mode.
    fn ensure_motion(&mut self, now: Instant) {
        let Some(seg) = self.current.clone() else {
            return;
        };
        if self.geometry.paginates() {
            let icon_width = if self.icon_hidden {
                0
            } else {
                self.lane.icon_width()
            };
            self.apply_fragment(&seg.text, icon_width, now);
            return;
        }

        if self.repeat_gate.admit(&seg.text, now) {
            self.lane.set_text(&seg.text);
        }
        let Some(view_width) = self.lane.view_width() else {
            // One-shot gate: picked back up on the first tick after layout.
            self.awaiting_layout = true;
            return;
        };
        let metrics = ScrollMetrics {
            text_width: fitter::text_width(&seg.text),
            view_width,
        };
        self.stop_session();
        if metrics.scrollable() {
            let (tx, rx) = unbounded();
            self.frames = Some(rx);
            self.scroll = Some(ScrollSession::start(
                metrics,
                seg.removed_flag(),
                tx,
                SCROLL_START_DELAY,
            ));
        }
        self.advance_at = None;
        self.next_liveness_at = Some(now + LIVENESS_CHECK_DELAY);
    }

    fn apply_fragment(&mut self, text: &str, icon_width: usize, now: Instant) {
        let fit = fitter::fit_content(text, icon_width, &self.geometry);
        if self.repeat_gate.admit(&fit.display, now) {
            self.lane.set_text(&fit.display);
        }
        // A fragment that consumed nothing would continue forever; emit it
        // as final instead.
        self.continuation = match fit.remainder {
            Some(rest) if fit.consumed > 0 => Some(rest),
            _ => None,
        };
        self.dwell_until = Some(now + FRAGMENT_DWELL);
        self.next_liveness_at = None;
    }

    /// Show the unconsumed suffix of an overflowing fragment, icon hidden to
    /// widen both spans.
    fn show_continuation(&mut self, rest: &str, now: Instant) {
        debug!(target: "tickerlane::coordinator", "showing ticker continuation");
        self.icon_hidden = true;
        self.lane.set_icon(None);
        self.apply_fragment(rest, 0, now);
    }

    fn stop_session(&mut self) {
        if let Some(session) = self.scroll.take() {
            session.cancel();
        }
        self.frames = None;
    }

    fn clear_deadlines(&mut self) {
        self.next_liveness_at = None;
        self.advance_at = None;
        self.dwell_until = None;
        self.awaiting_layout = false;
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("state", &self.state)
            .field("queued", &self.queue.len())
            .field("current", &self.current)
            .field("paginates", &self.geometry.paginates())
            .finish_non_exhaustive()
    }
}
