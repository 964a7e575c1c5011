//! Event entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::event::EventSummary;
use domain::models::invitation::InvitationKind;
use domain::models::Event;
use domain::services::visibility::EventRelation;

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
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

impl From<EventEntity> for Event {
    fn from(entity: EventEntity) -> Self {
        Event {
            id: entity.id,
            host_id: entity.host_id,
            title: entity.title,
            description: entity.description,
            event_type: entity.event_type,
            interest_tags: entity.interest_tags,
            auto_matching_enabled: entity.auto_matching_enabled,
            is_public: entity.is_public,
            max_participants: entity.max_participants,
            latitude: entity.latitude,
            longitude: entity.longitude,
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Event row joined with the host's username.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithHostEntity {
    pub id: Uuid,
    pub host_id: Uuid,
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

impl From<EventWithHostEntity> for EventSummary {
    fn from(entity: EventWithHostEntity) -> Self {
        EventSummary {
            id: entity.id,
            host_username: entity.host_username,
            title: entity.title,
            event_type: entity.event_type,
            interest_tags: entity.interest_tags,
            is_public: entity.is_public,
            max_participants: entity.max_participants,
            latitude: entity.latitude,
            longitude: entity.longitude,
            starts_at: entity.starts_at,
            ends_at: entity.ends_at,
        }
    }
}

/// Event row joined with one user's relationship to it, for the feed query.
///
/// `invitation_is_auto` carries the `is_auto_matched` flag of the caller's
/// invitation row, or null when no row exists.
#[derive(Debug, Clone, FromRow)]
pub struct VisibleEventEntity {
    pub id: Uuid,
    pub host_id: Uuid,
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
    pub is_host: bool,
    pub is_attendee: bool,
    pub invitation_is_auto: Option<bool>,
}

impl VisibleEventEntity {
    /// Split into the summary payload and the relation the visibility
    /// resolver classifies on.
    pub fn into_parts(self) -> (EventSummary, EventRelation) {
        let relation = EventRelation {
            is_host: self.is_host,
            is_attendee: self.is_attendee,
            invitation: self.invitation_is_auto.map(|auto| {
                if auto {
                    InvitationKind::AutoMatched
                } else {
                    InvitationKind::Manual
                }
            }),
            is_public: self.is_public,
        };
        let summary = EventSummary {
            id: self.id,
            host_username: self.host_username,
            title: self.title,
            event_type: self.event_type,
            interest_tags: self.interest_tags,
            is_public: self.is_public,
            max_participants: self.max_participants,
            latitude: self.latitude,
            longitude: self.longitude,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        };
        (summary, relation)
    }
}
