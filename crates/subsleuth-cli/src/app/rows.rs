//! Folding the subscription snapshot into one table row per broadcaster.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use subsleuth_core::models::{STREAM_OFFLINE, STREAM_ONLINE};
use subsleuth_core::{Subscription, SubscriptionSnapshot};

pub const MARK_SET: &str = "\u{2713}";
pub const MARK_UNSET: &str = "x";

/// Column titles and widths of the subscriptions table.
pub const COLUMNS: [(&str, u16); 6] = [
    ("User", 12),
    ("Status", 10),
    ("Online", 7),
    ("Offline", 7),
    ("URL", 30),
    ("Created", 30),
];

/// One broadcaster in the subscriptions table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub broadcaster_id: String,
    pub name: String,
    pub status: String,
    pub online: bool,
    pub offline: bool,
    pub callback: String,
    pub created: String,
}

impl DisplayRow {
    /// Start a row from the broadcaster's first (representative) subscription.
    fn from_representative(sub: &Subscription, name: String) -> Self {
        let mut row = Self {
            broadcaster_id: sub.broadcaster_id().to_string(),
            name,
            status: sub.status.clone(),
            online: false,
            offline: false,
            callback: sub.transport.callback.clone(),
            created: format_created(sub.created_at),
        };
        row.record_event(&sub.kind);
        row
    }

    fn record_event(&mut self, kind: &str) {
        match kind {
            STREAM_ONLINE => self.online = true,
            STREAM_OFFLINE => self.offline = true,
            _ => {}
        }
    }

    /// Cell text in [`COLUMNS`] order.
    pub fn cells(&self) -> [String; 6] {
        [
            self.name.clone(),
            self.status.clone(),
            mark(self.online).to_string(),
            mark(self.offline).to_string(),
            self.callback.clone(),
            self.created.clone(),
        ]
    }
}

const fn mark(set: bool) -> &'static str {
    if set { MARK_SET } else { MARK_UNSET }
}

/// Local-time `YYYY-MM-DD HH:MM`, empty when the timestamp is missing.
pub fn format_created(created_at: Option<DateTime<Utc>>) -> String {
    created_at
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Build display rows from a snapshot, sorted by display name.
///
/// `resolve` maps a broadcaster id to a display name and is called once per
/// distinct broadcaster, in snapshot order.
pub fn build_rows<F>(snapshot: &SubscriptionSnapshot, mut resolve: F) -> Vec<DisplayRow>
where
    F: FnMut(&str) -> String,
{
    let mut rows: Vec<DisplayRow> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sub in &snapshot.data {
        if let Some(&i) = index.get(sub.broadcaster_id()) {
            rows[i].record_event(&sub.kind);
        } else {
            let name = resolve(sub.broadcaster_id());
            index.insert(sub.broadcaster_id(), rows.len());
            rows.push(DisplayRow::from_representative(sub, name));
        }
    }

    rows.sort_by(|a, b| a.name.cmp(&b.name));
    rows
}
