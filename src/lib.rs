//! Status-bar ticker lane engine.
//!
//! A stream of notification events renders at most one scrolling (marquee)
//! text+icon lane in a narrow display strip, cooperatively hiding and
//! restoring the normal status-bar content and the center clock. The engine
//! splits into the segment queue, the cutout-aware content fitter, the
//! background scroll clock, the presentation coordinator, and the lane
//! switcher; rendering stays behind the capability traits in [`surface`].

pub mod coordinator;
pub mod filter;
pub mod fitter;
pub mod geometry;
pub mod lane;
pub mod notify;
pub mod scroll;
pub mod segment;
pub mod settings;
pub mod surface;
mod telemetry;

pub use coordinator::{Coordinator, TickerState};
pub use geometry::{CutoutGeometry, Orientation};
pub use lane::{LaneSwitcher, SlotOccupant};
pub use notify::{NotificationPosted, SegmentId};
pub use scroll::{ScrollFrame, ScrollMetrics, ScrollSession};
pub use segment::{EnqueueOutcome, Segment, SegmentQueue};
pub use settings::{load_user_config, TickerSettings, UserConfig};
pub use surface::{
    AnimationKind, ClockSurface, LaneSurface, StatusSurface, TextRepeatGate, Tintable,
};
pub use telemetry::{init_tracing, tracing_log_path};
