//! User registration routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{CreateUserRequest, CreateUserResponse};
use domain::models::{Profile, User};
use persistence::repositories::UserRepository;
use shared::tags::normalize_tags;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Register a user together with their matching profile.
///
/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    request.validate()?;

    let interests = normalize_tags(&request.interests);
    let user_repo = UserRepository::new(state.pool.clone());

    let (user, profile) = user_repo
        .create_with_profile(
            &request.username,
            request.display_name.as_deref(),
            &interests,
            request.auto_invite_opt_in,
        )
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                ApiError::Conflict(format!("Username '{}' is taken", request.username))
            }
            _ => err.into(),
        })?;

    let user: User = user.into();
    let profile: Profile = profile.into();
    info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            interests: profile.interests,
            auto_invite_opt_in: profile.auto_invite_opt_in,
            created_at: user.created_at,
        }),
    ))
}
