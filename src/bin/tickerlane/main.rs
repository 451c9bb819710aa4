//! Demo binary: drives the ticker lane against a one-line terminal status bar.
//!
//! Feeds scripted notification events (JSON file or the built-in feed) into
//! the lane switcher and renders the shared bar each frame. Headless mode
//! prints frames to stdout so smoke tests can lock the behavior.

mod feed;
mod surfaces;

use std::io::{self, Write};
use std::iter::Peekable;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use std::vec;

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{cursor, execute};

use tickerlane::{
    init_tracing, load_user_config, Coordinator, CutoutGeometry, LaneSwitcher, SegmentId,
    TickerSettings,
};

use feed::{demo_feed, load_script, FeedEvent, FeedKind};
use surfaces::{BarState, DemoClock, DemoLane, DemoStatus, SharedBar};

#[derive(Debug, Parser)]
#[command(name = "tickerlane", about = "Status-bar ticker lane demo")]
struct Args {
    /// Print frames to stdout instead of drawing a live status bar.
    #[arg(long)]
    headless: bool,

    /// Number of frames to render in headless mode.
    #[arg(long, default_value_t = 100)]
    frames: u32,

    /// Milliseconds between headless frames.
    #[arg(long, default_value_t = 30)]
    step_ms: u64,

    /// JSON feed script; falls back to the built-in demo feed.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Strip width in cells.
    #[arg(long, default_value_t = 48)]
    width: usize,

    /// Curved strip with a centered cutout at these columns, e.g. "20,26".
    #[arg(long, value_name = "LEFT,RIGHT")]
    cutout: Option<String>,

    /// Write a JSON trace log (TICKERLANE_TRACE_LOG overrides the path).
    #[arg(long)]
    trace: bool,
}

fn parse_cutout(raw: &str) -> Result<(usize, usize)> {
    let Some((left, right)) = raw.split_once(',') else {
        bail!("cutout must be LEFT,RIGHT");
    };
    let left: usize = left.trim().parse()?;
    let right: usize = right.trim().parse()?;
    if right < left {
        bail!("cutout right edge must not be left of its left edge");
    }
    Ok((left, right))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.trace);

    let geometry = match &args.cutout {
        Some(raw) => {
            let (left, right) = parse_cutout(raw)?;
            CutoutGeometry::curved_portrait(args.width, left, right)
        }
        None => CutoutGeometry::flat(args.width),
    };

    let bar = BarState::new(args.width);
    let coordinator = Coordinator::new(
        Box::new(DemoLane(bar.clone())),
        Box::new(DemoStatus(bar.clone())),
        Box::new(DemoClock(bar.clone())),
        geometry,
    );
    let mut switcher = LaneSwitcher::new(coordinator, 0);

    let mut settings = TickerSettings::new(load_user_config(), 0);
    settings.add_callback(|enabled| tracing::debug!(enabled, "ticker toggle changed"));

    let events = match &args.script {
        Some(path) => load_script(path)?,
        None => demo_feed(),
    };

    if args.headless {
        run_headless(&args, &mut switcher, &mut settings, &bar, events)
    } else {
        run_interactive(&mut switcher, &mut settings, &bar, events)
    }
}

type PendingFeed = Peekable<vec::IntoIter<FeedEvent>>;

fn apply_feed_event(
    event: FeedEvent,
    switcher: &mut LaneSwitcher,
    settings: &mut TickerSettings,
    now: Instant,
) {
    match event.kind {
        FeedKind::Post { event } => {
            switcher.notification_posted(&event, now);
        }
        FeedKind::Remove { id, package } => {
            switcher.notification_removed(&SegmentId::new(id, package), now);
        }
        FeedKind::UserSwitch { user_id } => {
            settings.user_switched(user_id);
            switcher.user_switched(user_id, now);
        }
    }
}

fn dispatch_due(
    pending: &mut PendingFeed,
    elapsed_ms: u64,
    switcher: &mut LaneSwitcher,
    settings: &mut TickerSettings,
    now: Instant,
) {
    while pending.peek().is_some_and(|event| event.at_ms <= elapsed_ms) {
        let Some(event) = pending.next() else {
            break;
        };
        apply_feed_event(event, switcher, settings, now);
    }
}

fn run_headless(
    args: &Args,
    switcher: &mut LaneSwitcher,
    settings: &mut TickerSettings,
    bar: &SharedBar,
    events: Vec<FeedEvent>,
) -> Result<()> {
    let start = Instant::now();
    let mut pending = events.into_iter().peekable();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for _ in 0..args.frames {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(start).as_millis() as u64;
        dispatch_due(&mut pending, elapsed_ms, switcher, settings, now);
        switcher.set_should_show(settings.is_enabled());
        switcher.tick(now);
        writeln!(out, "{elapsed_ms:>6}ms |{}|", bar.borrow().render())?;
        thread::sleep(Duration::from_millis(args.step_ms));
    }
    Ok(())
}

fn run_interactive(
    switcher: &mut LaneSwitcher,
    settings: &mut TickerSettings,
    bar: &SharedBar,
    events: Vec<FeedEvent>,
) -> Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
    let result = interactive_loop(switcher, settings, bar, events, &mut stdout);
    execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn interactive_loop(
    switcher: &mut LaneSwitcher,
    settings: &mut TickerSettings,
    bar: &SharedBar,
    events: Vec<FeedEvent>,
    stdout: &mut io::Stdout,
) -> Result<()> {
    let start = Instant::now();
    let mut pending = events.into_iter().peekable();
    loop {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(start).as_millis() as u64;
        dispatch_due(&mut pending, elapsed_ms, switcher, settings, now);
        switcher.set_should_show(settings.is_enabled());
        switcher.tick(now);

        let (line, footer) = {
            let state = bar.borrow();
            let footer = format!(
                "q quit | t toggle ticker | state: {:?} | clock locked: {}",
                switcher.coordinator().state(),
                state.clock_locked,
            );
            (state.render(), footer)
        };
        execute!(stdout, cursor::MoveTo(0, 0), Clear(ClearType::CurrentLine))?;
        write!(stdout, "{line}")?;
        execute!(stdout, cursor::MoveTo(0, 2), Clear(ClearType::CurrentLine))?;
        write!(stdout, "{footer}")?;
        stdout.flush()?;

        if event::poll(Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('t') => {
                        let enabled = !settings.is_enabled();
                        settings.set_enabled(enabled);
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}
