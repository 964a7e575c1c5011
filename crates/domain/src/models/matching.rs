//! Matching result payloads.

use serde::Serialize;
use uuid::Uuid;

/// One accepted (user, score) match produced for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MatchResult {
    pub username: String,
    pub score: i32,
}

/// Outcome of running matching for a single event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventMatchOutcome {
    pub event_id: Uuid,
    pub matches_created: usize,
    pub matches: Vec<MatchResult>,
}

impl EventMatchOutcome {
    /// The zero-match outcome used for disabled or tagless events.
    pub fn empty(event_id: Uuid) -> Self {
        Self {
            event_id,
            matches_created: 0,
            matches: Vec::new(),
        }
    }
}

/// Outcome of running matching for a single user across events.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UserMatchOutcome {
    pub username: String,
    pub matches_created: usize,
    pub event_ids: Vec<Uuid>,
}

/// Outcome of a bulk matching run.
///
/// Per-event failures never abort the run; the ids of events that failed are
/// carried so an operator can re-run them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BulkMatchOutcome {
    pub events_processed: usize,
    pub matches_created: usize,
    pub failed_event_ids: Vec<Uuid>,
}

impl BulkMatchOutcome {
    pub fn new() -> Self {
        Self {
            events_processed: 0,
            matches_created: 0,
            failed_event_ids: Vec::new(),
        }
    }
}

impl Default for BulkMatchOutcome {
    fn default() -> Self {
        Self::new()
    }
}
