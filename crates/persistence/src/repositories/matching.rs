//! Interest index queries.
//!
//! Candidate discovery runs on Postgres array overlap (`&&`) between the
//! normalized `profiles.interests` and `events.interest_tags` columns, both
//! GIN-indexed. Overlap with an empty array is false, so an untagged event or
//! an empty profile never yields candidates.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CandidateEntity, EventEntity};
use crate::metrics::QueryTimer;

/// Repository for the matching engine's candidate lookups.
#[derive(Clone)]
pub struct MatchingRepository {
    pool: PgPool,
}

impl MatchingRepository {
    /// Creates a new MatchingRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Users whose interests overlap an event's tags.
    ///
    /// Opted-out users and the host never leave the index. The
    /// already-invited / already-attending flags are carried so the scorer
    /// can apply its exclusion rules without further queries.
    pub async fn candidates_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<CandidateEntity>, sqlx::Error> {
        let timer = QueryTimer::new("candidates_for_event");
        let result = sqlx::query_as::<_, CandidateEntity>(
            r#"
            SELECT u.id AS user_id, u.username, p.interests, p.auto_invite_opt_in,
                   p.preferred_radius_km, p.latitude, p.longitude,
                   EXISTS(
                       SELECT 1 FROM invitations i
                       WHERE i.event_id = e.id AND i.user_id = u.id
                   ) AS already_invited,
                   EXISTS(
                       SELECT 1 FROM event_attendees a
                       WHERE a.event_id = e.id AND a.user_id = u.id
                   ) AS already_attending
            FROM events e
            JOIN profiles p ON p.interests && e.interest_tags
            JOIN users u ON u.id = p.user_id
            WHERE e.id = $1
              AND p.auto_invite_opt_in = true
              AND u.id <> e.host_id
            ORDER BY u.username ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Upcoming public auto-matching events whose tags overlap a user's
    /// interests.
    pub async fn events_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("events_for_user");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT e.id, e.host_id, e.title, e.description, e.event_type, e.interest_tags,
                   e.auto_matching_enabled, e.is_public, e.max_participants,
                   e.latitude, e.longitude, e.starts_at, e.ends_at, e.created_at, e.updated_at
            FROM events e
            JOIN profiles p ON p.user_id = $1
            WHERE e.is_public = true
              AND e.auto_matching_enabled = true
              AND e.starts_at > NOW()
              AND e.host_id <> $1
              AND e.interest_tags && p.interests
            ORDER BY e.starts_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
