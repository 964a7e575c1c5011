//! Invitation entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Invitation;
use domain::services::matching::MatchCandidate;

/// Database row mapping for the invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub is_auto_matched: bool,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<InvitationEntity> for Invitation {
    fn from(entity: InvitationEntity) -> Self {
        Invitation {
            id: entity.id,
            event_id: entity.event_id,
            user_id: entity.user_id,
            is_auto_matched: entity.is_auto_matched,
            score: entity.score,
            created_at: entity.created_at,
        }
    }
}

/// Auto-matched invitation joined with the invited user, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct AutoMatchEntity {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Candidate row returned by the interest index query: a user profile with
/// tag overlap against one event, plus the flags the scorer excludes on.
#[derive(Debug, Clone, FromRow)]
pub struct CandidateEntity {
    pub user_id: Uuid,
    pub username: String,
    pub interests: Vec<String>,
    pub auto_invite_opt_in: bool,
    pub preferred_radius_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub already_invited: bool,
    pub already_attending: bool,
}

impl From<CandidateEntity> for MatchCandidate {
    fn from(entity: CandidateEntity) -> Self {
        MatchCandidate {
            user_id: entity.user_id,
            username: entity.username,
            interests: entity.interests,
            auto_invite_opt_in: entity.auto_invite_opt_in,
            preferred_radius_km: entity.preferred_radius_km,
            latitude: entity.latitude,
            longitude: entity.longitude,
            already_invited: entity.already_invited,
            already_attending: entity.already_attending,
        }
    }
}
