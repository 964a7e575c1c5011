//! Event domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A study event posted by a host.
///
/// `interest_tags` is stored normalized. `max_participants` of `None` means
/// unbounded. The host is always an attendee of their own event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    pub id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub interest_tags: Vec<String>,
    pub auto_matching_enabled: bool,
    pub is_public: bool,
    pub max_participants: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// An event is matchable while it has not started yet.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.starts_at > now
    }

    /// Ended events drop out of default visibility queries.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.ends_at <= now
    }
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateEventRequest {
    /// Username of the hosting user.
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub host_username: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 50, message = "Event type must be at most 50 characters"))]
    pub event_type: Option<String>,

    /// Interest tags; normalized before storage.
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_interest_tags"))]
    pub interest_tags: Vec<String>,

    #[serde(default = "default_true")]
    pub auto_matching_enabled: bool,

    #[serde(default = "default_true")]
    pub is_public: bool,

    #[validate(range(min = 1, message = "max_participants must be positive"))]
    pub max_participants: Option<i32>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl CreateEventRequest {
    /// Field-level validation plus the start-before-end window rule.
    pub fn validate_full(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()?;
        if let Err(err) = shared::validation::validate_time_window(self.starts_at, self.ends_at) {
            let mut errors = validator::ValidationErrors::new();
            errors.add("starts_at", err);
            return Err(errors);
        }
        Ok(())
    }
}

/// Request payload for updating an event (host-only).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateEventRequest {
    /// Username of the caller; must be the event host.
    #[validate(custom(function = "shared::validation::validate_username"))]
    pub host_username: String,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_interest_tags"))]
    pub interest_tags: Option<Vec<String>>,

    pub auto_matching_enabled: Option<bool>,

    pub is_public: Option<bool>,

    #[validate(range(min = 1, message = "max_participants must be positive"))]
    pub max_participants: Option<i32>,
}

/// Event representation returned by feed and lookup endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventSummary {
    pub id: Uuid,
    pub host_username: String,
    pub title: String,
    pub event_type: Option<String>,
    pub interest_tags: Vec<String>,
    pub is_public: bool,
    pub max_participants: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}
