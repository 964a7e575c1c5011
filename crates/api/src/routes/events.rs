//! Event routes: creation, lookup, and the bucketed feed.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use domain::models::event::{CreateEventRequest, EventSummary, UpdateEventRequest};
use domain::models::feed::EventFeed;
use domain::services::visibility::bucketize;
use persistence::repositories::event::{CreateEventInput, UpdateEventInput};
use persistence::repositories::{EventRepository, UserRepository};
use shared::tags::normalize_tags;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Create an event. The host becomes its first attendee.
///
/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventSummary>), ApiError> {
    request
        .validate_full()
        .map_err(ApiError::from)?;

    let host = UserRepository::new(state.pool.clone())
        .find_by_username(&request.host_username)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("User '{}' not found", request.host_username))
        })?;

    let event_repo = EventRepository::new(state.pool.clone());
    let event = event_repo
        .create_event(CreateEventInput {
            host_id: host.id,
            title: request.title,
            description: request.description,
            event_type: request.event_type,
            interest_tags: normalize_tags(&request.interest_tags),
            auto_matching_enabled: request.auto_matching_enabled,
            is_public: request.is_public,
            max_participants: request.max_participants,
            latitude: request.latitude,
            longitude: request.longitude,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
        })
        .await?;

    info!(event_id = %event.id, host = %host.username, "Event created");

    let summary = event_repo
        .find_with_host(event.id)
        .await?
        .map(EventSummary::from)
        .ok_or_else(|| ApiError::Internal("Event vanished after creation".into()))?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Fetch one event.
///
/// GET /api/v1/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventSummary>, ApiError> {
    let summary = EventRepository::new(state.pool.clone())
        .find_with_host(event_id)
        .await?
        .map(EventSummary::from)
        .ok_or_else(|| ApiError::NotFound(format!("Event '{}' not found", event_id)))?;

    Ok(Json(summary))
}

/// Update an event. Host-only; tag changes do not re-run matching on their
/// own (callers use the rebuild endpoint for that).
///
/// PUT /api/v1/events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventSummary>, ApiError> {
    request.validate()?;

    let event_repo = EventRepository::new(state.pool.clone());
    let event = event_repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event '{}' not found", event_id)))?;

    let caller = UserRepository::new(state.pool.clone())
        .find_by_username(&request.host_username)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("User '{}' not found", request.host_username))
        })?;

    if caller.id != event.host_id {
        return Err(ApiError::Forbidden(
            "Only the host can update an event".into(),
        ));
    }

    event_repo
        .update_event(
            event_id,
            UpdateEventInput {
                title: request.title,
                description: request.description,
                interest_tags: request.interest_tags.map(normalize_tags),
                auto_matching_enabled: request.auto_matching_enabled,
                is_public: request.is_public,
                max_participants: request.max_participants,
            },
        )
        .await?;

    info!(event_id = %event_id, host = %caller.username, "Event updated");

    let summary = event_repo
        .find_with_host(event_id)
        .await?
        .map(EventSummary::from)
        .ok_or_else(|| ApiError::NotFound(format!("Event '{}' not found", event_id)))?;

    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct DeleteEventQuery {
    /// Username of the caller; must be the event host.
    pub requested_by: String,
}

/// Delete an event. Host-only; invitations and relation memberships cascade.
///
/// DELETE /api/v1/events/:event_id?requested_by=:username
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<DeleteEventQuery>,
) -> Result<StatusCode, ApiError> {
    let event_repo = EventRepository::new(state.pool.clone());
    let event = event_repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event '{}' not found", event_id)))?;

    let caller = UserRepository::new(state.pool.clone())
        .find_by_username(&query.requested_by)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("User '{}' not found", query.requested_by))
        })?;

    if caller.id != event.host_id {
        return Err(ApiError::Forbidden(
            "Only the host can delete an event".into(),
        ));
    }

    event_repo.delete_event(event_id).await?;
    info!(event_id = %event_id, host = %caller.username, "Event deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Include the public discoverable bucket.
    #[serde(default)]
    pub include_public: bool,
}

/// Bucketed event feed for one user: hosting, attending, invited,
/// auto-matched, and (on request) public discoverable events.
///
/// GET /api/v1/users/:username/events
pub async fn get_events_for_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<EventFeed>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", username)))?;

    let visible = EventRepository::new(state.pool.clone())
        .events_visible_to(user.id, query.include_public)
        .await?;

    let items = visible.into_iter().map(|row| row.into_parts()).collect();
    Ok(Json(bucketize(items, query.include_public)))
}
