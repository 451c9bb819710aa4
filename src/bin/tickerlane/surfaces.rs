//! Terminal-cell implementations of the widget capability traits.
//!
//! All three widgets draw into one shared bar-line model; the main loop
//! renders it to a single status row.

use std::cell::RefCell;
use std::rc::Rc;

use unicode_width::UnicodeWidthChar;

use tickerlane::{AnimationKind, ClockSurface, LaneSurface, StatusSurface, Tintable};

/// Cells reserved for the icon glyph and its trailing space.
const ICON_SLOT: usize = 2;

/// Cells reserved for the clock, including its leading space.
const CLOCK_SLOT: usize = 6;

const LEADING_ICONS: &str = "[=] [#] [~]";
const CLOCK_TEXT: &str = "12:00";

/// Shared one-line status bar model.
#[derive(Debug)]
pub(crate) struct BarState {
    pub(crate) width: usize,
    pub(crate) lane_visible: bool,
    pub(crate) status_visible: bool,
    pub(crate) clock_visible: bool,
    pub(crate) clock_locked: bool,
    pub(crate) icon: Option<char>,
    pub(crate) text: String,
    pub(crate) offset: usize,
}

pub(crate) type SharedBar = Rc<RefCell<BarState>>;

impl BarState {
    pub(crate) fn new(width: usize) -> SharedBar {
        Rc::new(RefCell::new(Self {
            width,
            lane_visible: false,
            status_visible: true,
            clock_visible: true,
            clock_locked: false,
            icon: None,
            text: String::new(),
            offset: 0,
        }))
    }

    pub(crate) fn view_width(&self) -> usize {
        self.width.saturating_sub(ICON_SLOT + CLOCK_SLOT)
    }

    /// Render the bar into exactly `width` cells.
    pub(crate) fn render(&self) -> String {
        let mut left = String::new();
        if self.lane_visible {
            left.push(self.icon.unwrap_or(' '));
            left.push(' ');
            left.push_str(&window(&self.text, self.offset, self.view_width()));
        } else if self.status_visible {
            left.push_str(LEADING_ICONS);
        }

        let clock_cells = if self.clock_visible { CLOCK_TEXT.len() + 1 } else { 0 };
        let body = self.width.saturating_sub(clock_cells);
        let mut line = clip(&left, body);
        while cell_width(&line) < body {
            line.push(' ');
        }
        if self.clock_visible {
            line.push(' ');
            line.push_str(CLOCK_TEXT);
        }
        line
    }
}

fn cell_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

fn clip(text: &str, cells: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > cells {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

/// The `cells`-wide window of `text` starting `offset` cells in.
fn window(text: &str, offset: usize, cells: usize) -> String {
    let mut skipped = 0;
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if skipped < offset {
            skipped += w;
            continue;
        }
        if used + w > cells {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

pub(crate) struct DemoLane(pub(crate) SharedBar);
pub(crate) struct DemoStatus(pub(crate) SharedBar);
pub(crate) struct DemoClock(pub(crate) SharedBar);

impl Tintable for DemoLane {
    fn set_tint(&mut self, tint: u32) {
        tracing::debug!(target: "tickerlane::demo", tint, "lane tint applied");
    }
}

impl LaneSurface for DemoLane {
    fn set_icon(&mut self, icon: Option<&str>) {
        self.0.borrow_mut().icon = icon
            .and_then(|name| name.chars().next())
            .map(|ch| ch.to_ascii_uppercase());
    }

    fn set_text(&mut self, text: &str) {
        let mut bar = self.0.borrow_mut();
        bar.text = text.to_string();
        bar.offset = 0;
    }

    fn set_scroll_offset(&mut self, offset: usize) {
        self.0.borrow_mut().offset = offset;
    }

    fn show(&mut self, _animation: AnimationKind) {
        self.0.borrow_mut().lane_visible = true;
    }

    fn hide(&mut self, _animation: AnimationKind) {
        self.0.borrow_mut().lane_visible = false;
    }

    fn view_width(&self) -> Option<usize> {
        Some(self.0.borrow().view_width())
    }

    fn icon_width(&self) -> usize {
        if self.0.borrow().icon.is_some() {
            ICON_SLOT
        } else {
            0
        }
    }
}

impl StatusSurface for DemoStatus {
    fn show(&mut self, _animation: AnimationKind) {
        self.0.borrow_mut().status_visible = true;
    }

    fn hide(&mut self, _animation: AnimationKind) {
        self.0.borrow_mut().status_visible = false;
    }

    fn is_visible(&self) -> bool {
        self.0.borrow().status_visible
    }
}

impl ClockSurface for DemoClock {
    fn is_centered(&self) -> bool {
        true
    }

    fn show(&mut self, _animation: AnimationKind) {
        self.0.borrow_mut().clock_visible = true;
    }

    fn hide(&mut self, _animation: AnimationKind) {
        self.0.borrow_mut().clock_visible = false;
    }

    fn lock_visibility(&mut self, locked: bool) {
        self.0.borrow_mut().clock_locked = locked;
    }
}
