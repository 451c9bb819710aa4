//! Scripted notification feed so the demo runs without a real pipeline.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use tickerlane::NotificationPosted;

/// One timed event in the feed, relative to demo start.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FeedEvent {
    pub(crate) at_ms: u64,
    #[serde(flatten)]
    pub(crate) kind: FeedKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum FeedKind {
    Post { event: NotificationPosted },
    Remove { id: i32, package: String },
    UserSwitch { user_id: u32 },
}

/// Load a JSON feed script, sorted by fire time.
pub(crate) fn load_script(path: &Path) -> anyhow::Result<Vec<FeedEvent>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read feed script {}", path.display()))?;
    let mut events: Vec<FeedEvent> =
        serde_json::from_str(&contents).context("parse feed script")?;
    events.sort_by_key(|event| event.at_ms);
    Ok(events)
}

fn post(at_ms: u64, id: i32, package: &str, icon: &str, text: &str) -> FeedEvent {
    FeedEvent {
        at_ms,
        kind: FeedKind::Post {
            event: NotificationPosted {
                id,
                package: package.to_string(),
                user_id: 0,
                ticker_text: text.to_string(),
                icon: Some(icon.to_string()),
                clearable: false,
                show_ticker: true,
                alert_once: false,
            },
        },
    }
}

/// Built-in feed used when no script is given.
pub(crate) fn demo_feed() -> Vec<FeedEvent> {
    vec![
        post(200, 1, "com.example.mail", "mail", "New mail from Ava: lunch at noon?"),
        post(600, 2, "com.example.chat", "chat", "Bo: the build is green again"),
        FeedEvent {
            at_ms: 1500,
            kind: FeedKind::Remove {
                id: 1,
                package: "com.example.mail".to_string(),
            },
        },
    ]
}
