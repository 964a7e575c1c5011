//! Profile repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ProfileEntity;
use crate::metrics::QueryTimer;

/// Partial profile update. `None` keeps the stored value; `interests`
/// replaces the whole set and must already be normalized.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub interests: Option<Vec<String>>,
    pub auto_invite_opt_in: Option<bool>,
    pub preferred_radius_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skills: Option<serde_json::Value>,
}

/// Repository for profile-related database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the profile owned by a user.
    pub async fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_profile_by_user_id");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            SELECT user_id, interests, auto_invite_opt_in, preferred_radius_km,
                   latitude, longitude, skills, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a partial update, returning the updated row.
    pub async fn update(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<Option<ProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_profile");
        let result = sqlx::query_as::<_, ProfileEntity>(
            r#"
            UPDATE profiles
            SET interests = COALESCE($2, interests),
                auto_invite_opt_in = COALESCE($3, auto_invite_opt_in),
                preferred_radius_km = COALESCE($4, preferred_radius_km),
                latitude = COALESCE($5, latitude),
                longitude = COALESCE($6, longitude),
                skills = COALESCE($7, skills),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, interests, auto_invite_opt_in, preferred_radius_km,
                      latitude, longitude, skills, updated_at
            "#,
        )
        .bind(user_id)
        .bind(input.interests)
        .bind(input.auto_invite_opt_in)
        .bind(input.preferred_radius_km)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.skills)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Flip the auto-invite opt-in flag. Returns affected row count.
    ///
    /// Replaces the operational scripts that toggled opt-in out of band.
    pub async fn set_auto_invite(
        &self,
        user_id: Uuid,
        opt_in: bool,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_profile_auto_invite");
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET auto_invite_opt_in = $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(opt_in)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
