//! Invitation domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use shared::validation::validate_username;

/// How an invitation came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationKind {
    /// Written by a host through the direct-invite flow.
    Manual,
    /// Written by the matching engine.
    AutoMatched,
}

impl InvitationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationKind::Manual => "manual",
            InvitationKind::AutoMatched => "auto_matched",
        }
    }

    pub fn is_auto_matched(&self) -> bool {
        matches!(self, InvitationKind::AutoMatched)
    }
}

impl FromStr for InvitationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(InvitationKind::Manual),
            "auto_matched" => Ok(InvitationKind::AutoMatched),
            _ => Err(format!("Invalid invitation kind: {}", s)),
        }
    }
}

impl fmt::Display for InvitationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invitation of one user to one event. Unique per (event, user).
///
/// `score` records the match score that admitted an auto-matched row; it is
/// `None` for manual invitations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invitation {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub is_auto_matched: bool,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    pub fn kind(&self) -> InvitationKind {
        if self.is_auto_matched {
            InvitationKind::AutoMatched
        } else {
            InvitationKind::Manual
        }
    }
}

/// Request payload for a host inviting a user directly.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InviteUserRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    /// Username of the caller; must be the event host.
    #[validate(custom(function = "validate_username"))]
    pub invited_by: String,
}

/// Request payload for accepting or declining an invitation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RespondInvitationRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    pub accept: bool,
}

/// Response after a host invited a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InviteUserResponse {
    pub event_id: Uuid,
    pub username: String,
    pub kind: InvitationKind,
    pub created_at: DateTime<Utc>,
}

/// Response after responding to an invitation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RespondInvitationResponse {
    pub event_id: Uuid,
    pub username: String,
    pub accepted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invitation_kind_round_trip() {
        assert_eq!(
            InvitationKind::from_str("manual").unwrap(),
            InvitationKind::Manual
        );
        assert_eq!(
            InvitationKind::from_str("AUTO_MATCHED").unwrap(),
            InvitationKind::AutoMatched
        );
        assert!(InvitationKind::from_str("other").is_err());
        assert_eq!(InvitationKind::AutoMatched.to_string(), "auto_matched");
    }

    #[test]
    fn test_invitation_kind_from_row_flag() {
        let invitation = Invitation {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            is_auto_matched: true,
            score: Some(20),
            created_at: Utc::now(),
        };
        assert_eq!(invitation.kind(), InvitationKind::AutoMatched);
        assert!(invitation.kind().is_auto_matched());
    }

    #[test]
    fn test_invite_user_request_validation() {
        let valid = InviteUserRequest {
            username: "bob".into(),
            invited_by: "alice".into(),
        };
        assert!(valid.validate().is_ok());

        let invalid = InviteUserRequest {
            username: "no spaces allowed".into(),
            invited_by: "alice".into(),
        };
        assert!(invalid.validate().is_err());
    }
}
