//! User domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_username;

/// Represents a user account. Authentication lives outside this system;
/// users are identified by their stable unique username.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request payload for registering a user with their profile.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(max = 100, message = "Display name must be at most 100 characters"))]
    pub display_name: Option<String>,

    /// Initial interest tokens; normalized before storage.
    #[serde(default)]
    #[validate(custom(function = "shared::validation::validate_interest_tags"))]
    pub interests: Vec<String>,

    #[serde(default)]
    pub auto_invite_opt_in: bool,
}

/// Response after creating a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateUserResponse {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub interests: Vec<String>,
    pub auto_invite_opt_in: bool,
    pub created_at: DateTime<Utc>,
}
