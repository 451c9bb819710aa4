//! Notification events consumed from the delivery pipeline.

use serde::{Deserialize, Serialize};

/// Composite identity of a notification: id within its owning package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId {
    pub id: i32,
    pub package: String,
}

impl SegmentId {
    #[must_use]
    pub fn new(id: i32, package: impl Into<String>) -> Self {
        Self {
            id,
            package: package.into(),
        }
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.package, self.id)
    }
}

/// A posted notification as seen by the ticker. Only the fields the lane
/// cares about; everything else stays in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPosted {
    pub id: i32,
    pub package: String,
    #[serde(default)]
    pub user_id: u32,
    /// Ticker text. May be empty, in which case the event never ticks.
    #[serde(default)]
    pub ticker_text: String,
    /// Small-icon handle. `None` renders the lane without an icon.
    #[serde(default)]
    pub icon: Option<String>,
    /// Dismissible notifications never start a ticker segment.
    #[serde(default)]
    pub clearable: bool,
    /// The always-show-ticker flag from the posting app.
    #[serde(default)]
    pub show_ticker: bool,
    /// Alert-once notifications only tick on their first post.
    #[serde(default)]
    pub alert_once: bool,
}

impl NotificationPosted {
    #[must_use]
    pub fn segment_id(&self) -> SegmentId {
        SegmentId::new(self.id, self.package.clone())
    }

    /// Cache key for the tick filter, unique per notification per user.
    #[must_use]
    pub(crate) fn filter_key(&self) -> String {
        format!("{}|{}|{}", self.user_id, self.package, self.id)
    }

    /// Whether this event may start a ticker segment: the ticker flag is
    /// set, the text is non-empty, and the notification is non-clearable.
    #[must_use]
    pub fn postable(&self) -> bool {
        self.show_ticker && !self.ticker_text.is_empty() && !self.clearable
    }
}
