//! Invitation repository: the system of record for invitations.
//!
//! Invitation rows and the event_invited_users relation represent one
//! conceptual fact, so every write here touches both inside a single
//! transaction. Nothing else in the codebase writes either table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{AutoMatchEntity, InvitationEntity};
use crate::metrics::QueryTimer;

/// Result of an auto-match upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new auto-matched invitation row was written.
    Created,
    /// An invitation row (of either kind) already covered the pair; the
    /// InvitedUsers membership was still ensured.
    Existed,
}

/// Result of adding an attendee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendOutcome {
    Joined,
    AlreadyAttending,
    /// The event is at max_participants capacity.
    Full,
}

/// Repository for invitation-related database operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    /// Creates a new InvitationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Idempotently record an auto-match for (event, user).
    ///
    /// Inserts the invitation row with `is_auto_matched = true` unless a row
    /// for the pair already exists (manual rows are left untouched), and
    /// ensures the InvitedUsers membership either way. A concurrent insert
    /// racing on the unique key is absorbed as `Existed`.
    pub async fn upsert_auto_match(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        score: i32,
    ) -> Result<UpsertOutcome, sqlx::Error> {
        let timer = QueryTimer::new("upsert_auto_match");
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO invitations (event_id, user_id, is_auto_matched, score)
            VALUES ($1, $2, true, $3)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(score)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO event_invited_users (event_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();

        if inserted.rows_affected() > 0 {
            Ok(UpsertOutcome::Created)
        } else {
            Ok(UpsertOutcome::Existed)
        }
    }

    /// Delete every auto-matched invitation for an event, removing the
    /// affected users from InvitedUsers in the same transaction. Manual
    /// invitations are never touched. Returns the number of invitation rows
    /// removed.
    pub async fn clear_auto_matches(&self, event_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("clear_auto_matches");
        let mut tx = self.pool.begin().await?;

        // Membership rows first, while the invitation rows still identify
        // which users the matching system added.
        sqlx::query(
            r#"
            DELETE FROM event_invited_users
            WHERE event_id = $1
              AND user_id IN (
                  SELECT user_id FROM invitations
                  WHERE event_id = $1 AND is_auto_matched = true
              )
            "#,
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM invitations
            WHERE event_id = $1 AND is_auto_matched = true
            "#,
        )
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(deleted.rows_affected())
    }

    /// Write a manual invitation and its InvitedUsers membership in one
    /// transaction. A duplicate (event, user) pair surfaces as a unique
    /// violation for the caller to map.
    pub async fn create_manual(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_manual_invitation");
        let mut tx = self.pool.begin().await?;

        let invitation = sqlx::query_as::<_, InvitationEntity>(
            r#"
            INSERT INTO invitations (event_id, user_id, is_auto_matched, score)
            VALUES ($1, $2, false, NULL)
            RETURNING id, event_id, user_id, is_auto_matched, score, created_at
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO event_invited_users (event_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(invitation)
    }

    /// Delete one invitation and its InvitedUsers membership (decline flow).
    /// Returns true when an invitation row was removed.
    pub async fn delete_invitation(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_invitation");
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM invitations
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            DELETE FROM event_invited_users
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(deleted.rows_affected() > 0)
    }

    /// Find one invitation row.
    pub async fn find_invitation(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(
            r#"
            SELECT id, event_id, user_id, is_auto_matched, score, created_at
            FROM invitations
            WHERE event_id = $1 AND user_id = $2
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether any invitation row exists for (event, user).
    pub async fn has_invitation(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("has_invitation");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM invitations
                WHERE event_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Auto-matched users for an event, best score first.
    pub async fn list_auto_matches(
        &self,
        event_id: Uuid,
    ) -> Result<Vec<AutoMatchEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_auto_matches");
        let result = sqlx::query_as::<_, AutoMatchEntity>(
            r#"
            SELECT i.event_id, i.user_id, u.username, i.score, i.created_at
            FROM invitations i
            JOIN users u ON u.id = i.user_id
            WHERE i.event_id = $1 AND i.is_auto_matched = true
            ORDER BY i.score DESC NULLS LAST, u.username ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Events a user was auto-matched to.
    pub async fn list_auto_matched_event_ids(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("list_auto_matched_event_ids");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT event_id FROM invitations
            WHERE user_id = $1 AND is_auto_matched = true
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Number of auto-matched invitations an event currently carries.
    pub async fn count_auto_matches(&self, event_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_auto_matches");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM invitations
            WHERE event_id = $1 AND is_auto_matched = true
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Add a user to an event's attendees, honoring max_participants.
    ///
    /// The event row is locked so a concurrent accept cannot overshoot the
    /// capacity check.
    pub async fn add_attendee(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<AttendOutcome, sqlx::Error> {
        let timer = QueryTimer::new("add_attendee");
        let mut tx = self.pool.begin().await?;

        let capacity = sqlx::query_as::<_, (Option<i32>, i64)>(
            r#"
            SELECT e.max_participants,
                   (SELECT COUNT(*) FROM event_attendees a WHERE a.event_id = e.id)
            FROM events e
            WHERE e.id = $1
            FOR UPDATE
            "#,
        )
        .bind(event_id)
        .fetch_one(&mut *tx)
        .await?;

        if let (Some(max), count) = capacity {
            if count >= max as i64 {
                tx.rollback().await?;
                timer.record();
                return Ok(AttendOutcome::Full);
            }
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO event_attendees (event_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();

        if inserted.rows_affected() > 0 {
            Ok(AttendOutcome::Joined)
        } else {
            Ok(AttendOutcome::AlreadyAttending)
        }
    }

}
