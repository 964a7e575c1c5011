//! Invitation routes: direct invites and accept/decline responses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use domain::models::invitation::{
    InviteUserRequest, InviteUserResponse, RespondInvitationRequest, RespondInvitationResponse,
};
use domain::models::Invitation;
use persistence::repositories::{
    AttendOutcome, EventRepository, InvitationRepository, UserRepository,
};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// Directly invite a user to an event. Host-only; writes a manual
/// invitation and syncs the invited-users relation.
///
/// POST /api/v1/events/:event_id/invitations
pub async fn invite_user(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<InviteUserRequest>,
) -> Result<(StatusCode, Json<InviteUserResponse>), ApiError> {
    request.validate()?;

    let event = EventRepository::new(state.pool.clone())
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event '{}' not found", event_id)))?;

    let user_repo = UserRepository::new(state.pool.clone());
    let caller = user_repo
        .find_by_username(&request.invited_by)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", request.invited_by)))?;

    if caller.id != event.host_id {
        return Err(ApiError::Forbidden(
            "Only the host can invite users directly".into(),
        ));
    }

    let invitee = user_repo
        .find_by_username(&request.username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", request.username)))?;

    if invitee.id == event.host_id {
        return Err(ApiError::Validation(
            "The host cannot invite themselves".into(),
        ));
    }

    let invitation_repo = InvitationRepository::new(state.pool.clone());
    if invitation_repo.has_invitation(event_id, invitee.id).await? {
        return Err(ApiError::Conflict(format!(
            "'{}' is already invited to this event",
            request.username
        )));
    }

    let invitation: Invitation = invitation_repo
        .create_manual(event_id, invitee.id)
        .await
        .map_err(|err| match &err {
            // A concurrent invite can still race past the pre-check.
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                ApiError::Conflict(format!(
                    "'{}' is already invited to this event",
                    request.username
                ))
            }
            _ => err.into(),
        })?
        .into();

    info!(
        event_id = %event_id,
        username = %invitee.username,
        invited_by = %caller.username,
        "Manual invitation created"
    );

    Ok((
        StatusCode::CREATED,
        Json(InviteUserResponse {
            event_id,
            username: invitee.username,
            kind: invitation.kind(),
            created_at: invitation.created_at,
        }),
    ))
}

/// Accept or decline an invitation.
///
/// On accept the user joins the attendees (capacity permitting); on decline
/// the invitation row and the invited-users membership are removed.
///
/// POST /api/v1/events/:event_id/invitations/respond
pub async fn respond_to_invitation(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(request): Json<RespondInvitationRequest>,
) -> Result<Json<RespondInvitationResponse>, ApiError> {
    request.validate()?;

    let user = UserRepository::new(state.pool.clone())
        .find_by_username(&request.username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found", request.username)))?;

    let invitation_repo = InvitationRepository::new(state.pool.clone());
    invitation_repo
        .find_invitation(event_id, user.id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "No invitation for '{}' on this event",
                request.username
            ))
        })?;

    if request.accept {
        match invitation_repo.add_attendee(event_id, user.id).await? {
            AttendOutcome::Joined | AttendOutcome::AlreadyAttending => {}
            AttendOutcome::Full => {
                return Err(ApiError::Conflict("Event is at capacity".into()));
            }
        }
        info!(event_id = %event_id, username = %user.username, "Invitation accepted");
    } else {
        invitation_repo.delete_invitation(event_id, user.id).await?;
        info!(event_id = %event_id, username = %user.username, "Invitation declined");
    }

    Ok(Json(RespondInvitationResponse {
        event_id,
        username: user.username,
        accepted: request.accept,
    }))
}
