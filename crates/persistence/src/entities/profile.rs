//! Profile entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::Profile;

/// Database row mapping for the profiles table.
///
/// `interests` maps to a `text[]` column and is stored normalized.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileEntity {
    pub user_id: Uuid,
    pub interests: Vec<String>,
    pub auto_invite_opt_in: bool,
    pub preferred_radius_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skills: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileEntity> for Profile {
    fn from(entity: ProfileEntity) -> Self {
        Profile {
            user_id: entity.user_id,
            interests: entity.interests,
            auto_invite_opt_in: entity.auto_invite_opt_in,
            preferred_radius_km: entity.preferred_radius_km,
            latitude: entity.latitude,
            longitude: entity.longitude,
            skills: entity.skills,
            updated_at: entity.updated_at,
        }
    }
}
