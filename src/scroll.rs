//! Marquee scroll engine.
//!
//! A per-segment background clock steps the horizontal offset and posts
//! frames to the UI domain over a channel; the UI applies them to the lane.
//! Lifecycle signals flow the other way only through the cancellation flag.
//! The step cadence eases in near the start, cruises, and eases out near the
//! end of the span.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use tracing::debug;

/// Delay between a segment becoming head and the first scroll step, so the
/// reader sees the icon and the start of the text before motion begins.
pub(crate) const SCROLL_START_DELAY: Duration = Duration::from_millis(1500);

/// Offset span over which the cadence accelerates after the start.
const START_PHASE: usize = 8;

/// Offset span over which the cadence decelerates before the end.
const END_PHASE: usize = 8;

/// Step interval at rest, before any easing.
const INITIAL_INTERVAL_MS: u64 = 120;

/// Step interval at cruise, the maximum scroll speed.
const CRUISE_INTERVAL_MS: u64 = 40;

/// Linear interval ramp inside the easing phases.
const RAMP_MS_PER_CELL: u64 = 10;

/// Granularity of cancellable waits inside the clock thread.
const WAIT_SLICE: Duration = Duration::from_millis(15);

/// One offset update posted to the UI domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollFrame {
    pub offset: usize,
}

/// Widths measured on the UI side before the clock starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollMetrics {
    pub text_width: usize,
    pub view_width: usize,
}

impl ScrollMetrics {
    /// Final offset of the scroll span.
    #[must_use]
    pub fn end_position(&self) -> usize {
        self.text_width.saturating_sub(self.view_width)
    }

    /// Whether there is anything to scroll at all.
    #[must_use]
    pub fn scrollable(&self) -> bool {
        self.end_position() >= 1
    }
}

/// Step interval for the given offset within a span ending at
/// `end_position`. Spans shorter than both easing phases combined skip
/// easing and keep the initial interval throughout.
#[must_use]
pub fn step_interval(offset: usize, end_position: usize) -> Duration {
    let ms = if end_position < START_PHASE + END_PHASE {
        INITIAL_INTERVAL_MS
    } else if offset < START_PHASE {
        (INITIAL_INTERVAL_MS - offset as u64 * RAMP_MS_PER_CELL).max(CRUISE_INTERVAL_MS)
    } else if offset > end_position - END_PHASE {
        (offset - (end_position - END_PHASE)) as u64 * RAMP_MS_PER_CELL + CRUISE_INTERVAL_MS
    } else {
        CRUISE_INTERVAL_MS
    };
    Duration::from_millis(ms)
}

/// Handle to one background scroll clock. Created when a segment's text is
/// assigned to an attached lane; must be cancelled (or dropped) before the
/// lane goes away so no late step touches a torn-down surface.
#[derive(Debug)]
pub struct ScrollSession {
    running: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    clock: Option<JoinHandle<()>>,
}

impl ScrollSession {
    /// Spawn the clock. After `start_delay` it steps the offset from 0 to
    /// the end position, posting each step on `frames`. The clock exits
    /// early when cancelled, when the segment is removed, or when the
    /// receiving side is gone.
    #[must_use]
    pub fn start(
        metrics: ScrollMetrics,
        removed: Arc<AtomicBool>,
        frames: Sender<ScrollFrame>,
        start_delay: Duration,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let cancelled = Arc::new(AtomicBool::new(false));
        let clock = {
            let running = Arc::clone(&running);
            let cancelled = Arc::clone(&cancelled);
            thread::spawn(move || {
                run_clock(metrics, &removed, &cancelled, &frames, start_delay);
                running.store(false, Ordering::Release);
            })
        };
        Self {
            running,
            cancelled,
            clock: Some(clock),
        }
    }

    /// Whether the clock is still stepping (or waiting out the start delay).
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask the clock to stop. The flag is the source of truth: an in-flight
    /// step that observes it becomes a no-op.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Drop for ScrollSession {
    fn drop(&mut self) {
        self.cancel();
        if let Some(clock) = self.clock.take() {
            let _ = clock.join();
        }
    }
}

fn run_clock(
    metrics: ScrollMetrics,
    removed: &AtomicBool,
    cancelled: &AtomicBool,
    frames: &Sender<ScrollFrame>,
    start_delay: Duration,
) {
    if !wait_while_live(start_delay, removed, cancelled) {
        return;
    }
    if !metrics.scrollable() {
        debug!(target: "tickerlane::scroll", ?metrics, "text fits, nothing to scroll");
        return;
    }
    let end_position = metrics.end_position();
    let mut offset = 0usize;
    while offset < end_position {
        if cancelled.load(Ordering::Acquire) || removed.load(Ordering::Acquire) {
            return;
        }
        offset += 1;
        if frames.send(ScrollFrame { offset }).is_err() {
            return;
        }
        if !wait_while_live(step_interval(offset, end_position), removed, cancelled) {
            return;
        }
    }
    debug!(target: "tickerlane::scroll", end_position, "scroll span complete");
}

/// Sleep in slices so cancellation and removal interrupt promptly. Returns
/// `false` when interrupted.
fn wait_while_live(total: Duration, removed: &AtomicBool, cancelled: &AtomicBool) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if cancelled.load(Ordering::Acquire) || removed.load(Ordering::Acquire) {
            return false;
        }
        let slice = remaining.min(WAIT_SLICE);
        thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
    !(cancelled.load(Ordering::Acquire) || removed.load(Ordering::Acquire))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use std::time::Instant;

    fn metrics(text_width: usize, view_width: usize) -> ScrollMetrics {
        ScrollMetrics {
            text_width,
            view_width,
        }
    }

    #[test]
    fn short_span_skips_easing() {
        let interval = step_interval(0, START_PHASE + END_PHASE - 1);
        assert_eq!(interval, Duration::from_millis(INITIAL_INTERVAL_MS));
        let later = step_interval(5, START_PHASE + END_PHASE - 1);
        assert_eq!(later, Duration::from_millis(INITIAL_INTERVAL_MS));
    }

    #[test]
    fn start_phase_accelerates_toward_cruise() {
        let end = 100;
        let mut last = Duration::from_millis(u64::MAX);
        for offset in 0..START_PHASE {
            let interval = step_interval(offset, end);
            assert!(interval <= last, "interval must shrink while accelerating");
            last = interval;
        }
        assert_eq!(step_interval(START_PHASE, end), step_interval(50, end));
    }

    #[test]
    fn cruise_interval_is_the_floor() {
        let end = 100;
        for offset in START_PHASE..=(end - END_PHASE) {
            assert_eq!(
                step_interval(offset, end),
                Duration::from_millis(CRUISE_INTERVAL_MS)
            );
        }
    }

    #[test]
    fn end_phase_decelerates() {
        let end = 100;
        let mut last = Duration::ZERO;
        for offset in (end - END_PHASE + 1)..=end {
            let interval = step_interval(offset, end);
            assert!(interval >= last, "interval must grow while decelerating");
            last = interval;
        }
        assert!(last > Duration::from_millis(CRUISE_INTERVAL_MS));
    }

    #[test]
    fn metrics_end_position_saturates() {
        assert_eq!(metrics(10, 30).end_position(), 0);
        assert!(!metrics(10, 30).scrollable());
        assert!(metrics(31, 30).scrollable());
    }

    #[test]
    fn clock_posts_monotonic_bounded_offsets() {
        let (tx, rx) = unbounded();
        let removed = Arc::new(AtomicBool::new(false));
        let m = metrics(14, 10);
        let session = ScrollSession::start(m, removed, tx, Duration::ZERO);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut offsets = Vec::new();
        while session.is_running() && Instant::now() < deadline {
            while let Ok(frame) = rx.try_recv() {
                offsets.push(frame.offset);
            }
            thread::sleep(Duration::from_millis(5));
        }
        while let Ok(frame) = rx.try_recv() {
            offsets.push(frame.offset);
        }

        assert!(!session.is_running(), "clock must finish its span");
        assert!(!offsets.is_empty());
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(*offsets.last().unwrap(), m.end_position());
    }

    #[test]
    fn fitting_text_never_scrolls() {
        let (tx, rx) = unbounded();
        let removed = Arc::new(AtomicBool::new(false));
        let session = ScrollSession::start(metrics(10, 10), removed, tx, Duration::ZERO);

        let deadline = Instant::now() + Duration::from_secs(2);
        while session.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!session.is_running());
        assert!(rx.try_recv().is_err(), "no frames for fitting text");
    }

    #[test]
    fn cancellation_stops_the_clock_mid_span() {
        let (tx, rx) = unbounded();
        let removed = Arc::new(AtomicBool::new(false));
        let session = ScrollSession::start(metrics(500, 10), removed, tx, Duration::ZERO);

        // Let a few frames through, then cancel.
        let deadline = Instant::now() + Duration::from_secs(2);
        while rx.try_recv().is_err() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        session.cancel();

        let stop_deadline = Instant::now() + Duration::from_secs(2);
        while session.is_running() && Instant::now() < stop_deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!session.is_running(), "cancel must stop the clock promptly");
    }

    #[test]
    fn removed_segment_stops_the_clock() {
        let (tx, rx) = unbounded();
        let removed = Arc::new(AtomicBool::new(false));
        let session = ScrollSession::start(metrics(500, 10), Arc::clone(&removed), tx, Duration::ZERO);

        let deadline = Instant::now() + Duration::from_secs(2);
        while rx.try_recv().is_err() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        removed.store(true, Ordering::Release);

        let stop_deadline = Instant::now() + Duration::from_secs(2);
        while session.is_running() && Instant::now() < stop_deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!session.is_running());
    }

    #[test]
    fn dropping_the_session_joins_the_clock() {
        let (tx, _rx) = unbounded();
        let removed = Arc::new(AtomicBool::new(false));
        let session = ScrollSession::start(metrics(500, 10), removed, tx, Duration::ZERO);
        // Drop must not hang even while the clock is mid-span.
        drop(session);
    }
}
