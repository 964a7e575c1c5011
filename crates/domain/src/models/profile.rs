//! Profile domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A user's matching profile. Owned one-to-one by the user.
///
/// `interests` is stored normalized (trimmed, lowercased, deduplicated).
/// `skills` maps an interest token to a proficiency level; the matching
/// engine carries it through but does not score on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Profile {
    pub user_id: Uuid,
    pub interests: Vec<String>,
    pub auto_invite_opt_in: bool,
    pub preferred_radius_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skills: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for updating a profile.
///
/// Absent fields keep their stored value; `interests` replaces the whole set.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "shared::validation::validate_interest_tags"))]
    pub interests: Option<Vec<String>>,

    pub auto_invite_opt_in: Option<bool>,

    #[validate(custom(function = "shared::validation::validate_radius_km"))]
    pub preferred_radius_km: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: Option<f64>,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: Option<f64>,

    pub skills: Option<serde_json::Value>,
}

/// Request payload for flipping the auto-invite opt-in flag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AutoInviteRequest {
    pub opt_in: bool,
}

/// Profile representation returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ProfileResponse {
    pub username: String,
    pub interests: Vec<String>,
    pub auto_invite_opt_in: bool,
    pub preferred_radius_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skills: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_profile_request_validation() {
        let valid = UpdateProfileRequest {
            interests: Some(vec!["Photography".into(), "Travel".into()]),
            auto_invite_opt_in: Some(true),
            preferred_radius_km: Some(10.0),
            latitude: Some(52.52),
            longitude: Some(13.405),
            skills: None,
        };
        assert!(valid.validate().is_ok());

        let bad_radius = UpdateProfileRequest {
            interests: None,
            auto_invite_opt_in: None,
            preferred_radius_km: Some(-3.0),
            latitude: None,
            longitude: None,
            skills: None,
        };
        assert!(bad_radius.validate().is_err());

        let bad_latitude = UpdateProfileRequest {
            interests: None,
            auto_invite_opt_in: None,
            preferred_radius_km: None,
            latitude: Some(91.0),
            longitude: None,
            skills: None,
        };
        assert!(bad_latitude.validate().is_err());
    }
}
