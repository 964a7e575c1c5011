//! User repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ProfileEntity, UserEntity};
use crate::metrics::QueryTimer;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create a user together with their profile in one transaction.
    ///
    /// `interests` must already be normalized. A duplicate username surfaces
    /// as a unique violation.
    pub async fn create_with_profile(
        &self,
        username: &str,
        display_name: Option<&str>,
        interests: &[String],
        auto_invite_opt_in: bool,
    ) -> Result<(UserEntity, ProfileEntity), sqlx::Error> {
        let timer = QueryTimer::new("create_user_with_profile");
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (username, display_name)
            VALUES ($1, $2)
            RETURNING id, username, display_name, created_at
            "#,
        )
        .bind(username)
        .bind(display_name)
        .fetch_one(&mut *tx)
        .await?;

        let profile = sqlx::query_as::<_, ProfileEntity>(
            r#"
            INSERT INTO profiles (user_id, interests, auto_invite_opt_in)
            VALUES ($1, $2, $3)
            RETURNING user_id, interests, auto_invite_opt_in, preferred_radius_km,
                      latitude, longitude, skills, updated_at
            "#,
        )
        .bind(user.id)
        .bind(interests)
        .bind(auto_invite_opt_in)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok((user, profile))
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, display_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by their unique username.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_username");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, display_name, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
