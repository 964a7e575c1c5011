//! Visibility resolution.
//!
//! Answers "which bucket does this event land in for this user?". An event
//! appears in the first matching bucket, in the fixed order Hosting >
//! Attending > Invited > AutoMatched > Public. Ended-event filtering happens
//! in the queries that feed this module.

use serde::Serialize;
use std::fmt;

use crate::models::event::EventSummary;
use crate::models::feed::EventFeed;
use crate::models::invitation::InvitationKind;

/// Visibility bucket for one (event, user) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventBucket {
    Hosting,
    Attending,
    Invited,
    AutoMatched,
    Public,
}

impl EventBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventBucket::Hosting => "hosting",
            EventBucket::Attending => "attending",
            EventBucket::Invited => "invited",
            EventBucket::AutoMatched => "auto_matched",
            EventBucket::Public => "public",
        }
    }
}

impl fmt::Display for EventBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's relationship to one event, as the visibility query returns it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventRelation {
    pub is_host: bool,
    pub is_attendee: bool,
    pub invitation: Option<InvitationKind>,
    pub is_public: bool,
}

/// Classify one event for one user. `None` means the event is not visible
/// (private and unrelated).
pub fn classify(relation: &EventRelation) -> Option<EventBucket> {
    if relation.is_host {
        Some(EventBucket::Hosting)
    } else if relation.is_attendee {
        Some(EventBucket::Attending)
    } else if relation.invitation == Some(InvitationKind::Manual) {
        Some(EventBucket::Invited)
    } else if relation.invitation == Some(InvitationKind::AutoMatched) {
        Some(EventBucket::AutoMatched)
    } else if relation.is_public {
        Some(EventBucket::Public)
    } else {
        None
    }
}

/// Partition events into a feed. The `public` bucket is only filled when the
/// caller requested the discoverable feed.
pub fn bucketize(
    items: Vec<(EventSummary, EventRelation)>,
    include_public: bool,
) -> EventFeed {
    let mut feed = EventFeed::new();
    for (event, relation) in items {
        match classify(&relation) {
            Some(EventBucket::Hosting) => feed.hosting.push(event),
            Some(EventBucket::Attending) => feed.attending.push(event),
            Some(EventBucket::Invited) => feed.invited.push(event),
            Some(EventBucket::AutoMatched) => feed.auto_matched.push(event),
            Some(EventBucket::Public) if include_public => feed.public.push(event),
            Some(EventBucket::Public) | None => {}
        }
    }
    feed
}
