//! Matching trigger routes.
//!
//! One surface replaces the operational scripts of old: per-event, per-user,
//! and global runs, plus explicit rebuilds.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain::models::matching::{BulkMatchOutcome, EventMatchOutcome, UserMatchOutcome};
use persistence::repositories::{EventRepository, InvitationRepository, UserRepository};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::MatchingError;

impl From<MatchingError> for ApiError {
    fn from(err: MatchingError) -> Self {
        match err {
            MatchingError::EventNotFound(id) => {
                ApiError::NotFound(format!("Event '{}' not found", id))
            }
            MatchingError::Store(db_err) => db_err.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    /// Per-event cap override for this run.
    pub limit: Option<usize>,
}

/// Run matching for one event.
///
/// POST /api/v1/matching/events/:event_id
pub async fn run_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(query): Query<MatchQuery>,
) -> Result<Json<EventMatchOutcome>, ApiError> {
    let outcome = match query.limit {
        Some(limit) => {
            state
                .matching
                .match_event_with_limit(event_id, limit)
                .await?
        }
        None => state.matching.match_event(event_id).await?,
    };
    Ok(Json(outcome))
}

/// Clear an event's auto-matches and recompute them.
///
/// POST /api/v1/matching/events/:event_id/rebuild
pub async fn rebuild_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventMatchOutcome>, ApiError> {
    let outcome = state.matching.rebuild_for_event(event_id).await?;
    Ok(Json(outcome))
}

/// Run matching for one user across upcoming events.
///
/// POST /api/v1/matching/users/:username
pub async fn run_for_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserMatchOutcome>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", username)))?;

    let outcome = state.matching.match_user(user.id, &user.username).await?;
    Ok(Json(outcome))
}

/// Run matching for every eligible event.
///
/// POST /api/v1/matching/run
pub async fn run_all(
    State(state): State<AppState>,
) -> Result<Json<BulkMatchOutcome>, ApiError> {
    let outcome = state.matching.match_all_events().await?;
    Ok(Json(outcome))
}

/// Administrative full rebuild: clear and recompute all auto-matches.
///
/// POST /api/v1/matching/rebuild
pub async fn rebuild_all(
    State(state): State<AppState>,
) -> Result<Json<BulkMatchOutcome>, ApiError> {
    let outcome = state.matching.rebuild_all().await?;
    Ok(Json(outcome))
}

/// One stored auto-match, as listed back to callers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AutoMatchEntry {
    pub username: String,
    pub score: Option<i32>,
}

/// Stored auto-matches for an event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EventAutoMatches {
    pub event_id: Uuid,
    pub matches: Vec<AutoMatchEntry>,
}

/// Current auto-matches for an event, best score first.
///
/// GET /api/v1/matching/events/:event_id
pub async fn list_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventAutoMatches>, ApiError> {
    EventRepository::new(state.pool.clone())
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event '{}' not found", event_id)))?;

    let matches = InvitationRepository::new(state.pool.clone())
        .list_auto_matches(event_id)
        .await?
        .into_iter()
        .map(|row| AutoMatchEntry {
            username: row.username,
            score: row.score,
        })
        .collect();

    Ok(Json(EventAutoMatches { event_id, matches }))
}

/// Events a user is currently auto-matched to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UserAutoMatches {
    pub username: String,
    pub event_ids: Vec<Uuid>,
}

/// GET /api/v1/matching/users/:username
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserAutoMatches>, ApiError> {
    let user = UserRepository::new(state.pool.clone())
        .find_by_username(&username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", username)))?;

    let event_ids = InvitationRepository::new(state.pool.clone())
        .list_auto_matched_event_ids(user.id)
        .await?;

    Ok(Json(UserAutoMatches {
        username: user.username,
        event_ids,
    }))
}
