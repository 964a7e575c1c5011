//! Bucketed event feed payloads.

use serde::Serialize;

use super::event::EventSummary;

/// Events visible to one user, partitioned into visibility buckets.
///
/// An event appears in exactly one bucket; `public` is only populated when
/// the caller asked for the discoverable feed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventFeed {
    pub hosting: Vec<EventSummary>,
    pub attending: Vec<EventSummary>,
    pub invited: Vec<EventSummary>,
    pub auto_matched: Vec<EventSummary>,
    pub public: Vec<EventSummary>,
}

impl EventFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// "My events" as surfaced by the app: hosting plus attending.
    pub fn my_events_count(&self) -> usize {
        self.hosting.len() + self.attending.len()
    }

    pub fn total(&self) -> usize {
        self.hosting.len()
            + self.attending.len()
            + self.invited.len()
            + self.auto_matched.len()
            + self.public.len()
    }
}
