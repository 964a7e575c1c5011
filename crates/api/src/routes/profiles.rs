//! Profile routes.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::profile::{AutoInviteRequest, ProfileResponse, UpdateProfileRequest};
use domain::models::Profile;
use persistence::repositories::{ProfileRepository, UpdateProfileInput, UserRepository};
use shared::tags::normalize_tags;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Fetch a user's profile.
///
/// GET /api/v1/profiles/:username
pub async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = find_user(&state, &username).await?;

    let profile = ProfileRepository::new(state.pool.clone())
        .find_by_user_id(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile for '{}' not found", username)))?;

    Ok(Json(profile_response(user.username, profile)))
}

/// Update a user's profile. Interests replace the stored set and are
/// normalized before storage.
///
/// PUT /api/v1/profiles/:username
pub async fn update_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    request.validate()?;

    let user = find_user(&state, &username).await?;

    let input = UpdateProfileInput {
        interests: request.interests.map(normalize_tags),
        auto_invite_opt_in: request.auto_invite_opt_in,
        preferred_radius_km: request.preferred_radius_km,
        latitude: request.latitude,
        longitude: request.longitude,
        skills: request.skills,
    };

    let profile = ProfileRepository::new(state.pool.clone())
        .update(user.id, input)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile for '{}' not found", username)))?;

    info!(user_id = %user.id, username = %username, "Profile updated");

    Ok(Json(profile_response(user.username, profile)))
}

/// Flip the auto-invite opt-in flag.
///
/// PUT /api/v1/profiles/:username/auto-invite
pub async fn set_auto_invite(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(request): Json<AutoInviteRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = find_user(&state, &username).await?;

    let profile_repo = ProfileRepository::new(state.pool.clone());
    let updated = profile_repo.set_auto_invite(user.id, request.opt_in).await?;
    if updated == 0 {
        return Err(ApiError::NotFound(format!(
            "Profile for '{}' not found",
            username
        )));
    }

    info!(user_id = %user.id, username = %username, opt_in = request.opt_in, "Auto-invite flag updated");

    let profile = profile_repo
        .find_by_user_id(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile for '{}' not found", username)))?;

    Ok(Json(profile_response(user.username, profile)))
}

async fn find_user(
    state: &AppState,
    username: &str,
) -> Result<persistence::entities::UserEntity, ApiError> {
    UserRepository::new(state.pool.clone())
        .find_by_username(username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", username)))
}

fn profile_response(
    username: String,
    profile: persistence::entities::ProfileEntity,
) -> ProfileResponse {
    let profile: Profile = profile.into();
    ProfileResponse {
        username,
        interests: profile.interests,
        auto_invite_opt_in: profile.auto_invite_opt_in,
        preferred_radius_km: profile.preferred_radius_km,
        latitude: profile.latitude,
        longitude: profile.longitude,
        skills: profile.skills,
        updated_at: profile.updated_at,
    }
}
