//! Event repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{EventEntity, EventWithHostEntity, VisibleEventEntity};
use crate::metrics::QueryTimer;

/// Input for creating an event. Tags must already be normalized.
#[derive(Debug, Clone)]
pub struct CreateEventInput {
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
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub ends_at: chrono::DateTime<chrono::Utc>,
}

/// Partial event update (host-only surface). Tags must be normalized.
#[derive(Debug, Clone, Default)]
pub struct UpdateEventInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub interest_tags: Option<Vec<String>>,
    pub auto_matching_enabled: Option<bool>,
    pub is_public: Option<bool>,
    pub max_participants: Option<i32>,
}

/// Repository for event-related database operations.
#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Creates a new EventRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create an event and seed the host as its first attendee, in one
    /// transaction. The host is an attendee of their own event by invariant.
    pub async fn create_event(
        &self,
        input: CreateEventInput,
    ) -> Result<EventEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_event");
        let mut tx = self.pool.begin().await?;

        let event = sqlx::query_as::<_, EventEntity>(
            r#"
            INSERT INTO events (
                host_id, title, description, event_type, interest_tags,
                auto_matching_enabled, is_public, max_participants,
                latitude, longitude, starts_at, ends_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id, host_id, title, description, event_type, interest_tags,
                      auto_matching_enabled, is_public, max_participants,
                      latitude, longitude, starts_at, ends_at, created_at, updated_at
            "#,
        )
        .bind(input.host_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.event_type)
        .bind(&input.interest_tags)
        .bind(input.auto_matching_enabled)
        .bind(input.is_public)
        .bind(input.max_participants)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO event_attendees (event_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(event.id)
        .bind(input.host_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(event)
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_by_id");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT id, host_id, title, description, event_type, interest_tags,
                   auto_matching_enabled, is_public, max_participants,
                   latitude, longitude, starts_at, ends_at, created_at, updated_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an event by ID, joined with the host's username.
    pub async fn find_with_host(
        &self,
        id: Uuid,
    ) -> Result<Option<EventWithHostEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_event_with_host");
        let result = sqlx::query_as::<_, EventWithHostEntity>(
            r#"
            SELECT e.id, e.host_id, u.username AS host_username, e.title, e.event_type,
                   e.interest_tags, e.is_public, e.max_participants,
                   e.latitude, e.longitude, e.starts_at, e.ends_at
            FROM events e
            JOIN users u ON u.id = e.host_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a partial update, returning the updated row.
    pub async fn update_event(
        &self,
        id: Uuid,
        input: UpdateEventInput,
    ) -> Result<Option<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_event");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            UPDATE events
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                interest_tags = COALESCE($4, interest_tags),
                auto_matching_enabled = COALESCE($5, auto_matching_enabled),
                is_public = COALESCE($6, is_public),
                max_participants = COALESCE($7, max_participants),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, host_id, title, description, event_type, interest_tags,
                      auto_matching_enabled, is_public, max_participants,
                      latitude, longitude, starts_at, ends_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.title)
        .bind(input.description)
        .bind(input.interest_tags)
        .bind(input.auto_matching_enabled)
        .bind(input.is_public)
        .bind(input.max_participants)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an event. Invitation rows and relation memberships cascade.
    pub async fn delete_event(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_event");
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Events eligible for a bulk matching run: auto-matching enabled,
    /// public, tagged, and not yet started.
    pub async fn matchable_events(&self) -> Result<Vec<EventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_matchable_events");
        let result = sqlx::query_as::<_, EventEntity>(
            r#"
            SELECT id, host_id, title, description, event_type, interest_tags,
                   auto_matching_enabled, is_public, max_participants,
                   latitude, longitude, starts_at, ends_at, created_at, updated_at
            FROM events
            WHERE auto_matching_enabled = true
              AND is_public = true
              AND starts_at > NOW()
              AND interest_tags <> '{}'
            ORDER BY starts_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Ids of every event with auto-matching enabled, regardless of start
    /// time or visibility. Used by administrative rebuilds, which clear
    /// stale auto-matches even on events that no longer match.
    pub async fn auto_matching_event_ids(&self) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("list_auto_matching_event_ids");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM events
            WHERE auto_matching_enabled = true
            ORDER BY starts_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Events related to one user for feed resolution: hosted, attended, or
    /// invited events, plus (optionally) public discoverable events. Ended
    /// events are excluded.
    pub async fn events_visible_to(
        &self,
        user_id: Uuid,
        include_public: bool,
    ) -> Result<Vec<VisibleEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_events_visible_to");
        let result = sqlx::query_as::<_, VisibleEventEntity>(
            r#"
            SELECT e.id, e.host_id, u.username AS host_username, e.title, e.event_type,
                   e.interest_tags, e.is_public, e.max_participants,
                   e.latitude, e.longitude, e.starts_at, e.ends_at,
                   (e.host_id = $1) AS is_host,
                   EXISTS(
                       SELECT 1 FROM event_attendees a
                       WHERE a.event_id = e.id AND a.user_id = $1
                   ) AS is_attendee,
                   (
                       SELECT i.is_auto_matched FROM invitations i
                       WHERE i.event_id = e.id AND i.user_id = $1
                   ) AS invitation_is_auto
            FROM events e
            JOIN users u ON u.id = e.host_id
            WHERE e.ends_at > NOW()
              AND (
                  e.host_id = $1
                  OR EXISTS(
                      SELECT 1 FROM event_attendees a
                      WHERE a.event_id = e.id AND a.user_id = $1
                  )
                  OR EXISTS(
                      SELECT 1 FROM invitations i
                      WHERE i.event_id = e.id AND i.user_id = $1
                  )
                  OR ($2 AND e.is_public)
              )
            ORDER BY e.starts_at ASC
            "#,
        )
        .bind(user_id)
        .bind(include_public)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
