//! Match scoring.
//!
//! Maps a candidate (user, event) pair to an integer score or rejects the
//! pair. The scorer is a pure function over its inputs; candidate retrieval
//! and invitation writes live in the persistence layer.
//!
//! Score is `10 × |interests ∩ tags|` over normalized token sets, and a pair
//! is accepted once it reaches the configured threshold (default 10, i.e. at
//! least one shared interest). Ties are broken by descending score, then
//! ascending username.

use geo::{point, HaversineDistance};
use thiserror::Error;
use uuid::Uuid;

use shared::tags::overlap_count;

/// Score contributed by each shared interest token.
pub const SCORE_PER_SHARED_INTEREST: i32 = 10;

/// View of a candidate user as the interest index returns it.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub user_id: Uuid,
    pub username: String,
    /// Normalized interest tokens.
    pub interests: Vec<String>,
    pub auto_invite_opt_in: bool,
    pub preferred_radius_km: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// An invitation row of any kind already exists for this pair.
    pub already_invited: bool,
    pub already_attending: bool,
}

/// View of the event being matched.
#[derive(Debug, Clone)]
pub struct MatchTarget {
    pub event_id: Uuid,
    pub host_id: Uuid,
    /// Normalized interest tags.
    pub interest_tags: Vec<String>,
    pub auto_matching_enabled: bool,
    pub latitude: f64,
    pub longitude: f64,
}

/// Matching knobs, sourced from the `[matching]` config section.
#[derive(Debug, Clone, Copy)]
pub struct MatchPolicy {
    /// Minimum score a pair must reach to be accepted.
    pub score_threshold: i32,
    /// Radius applied when a profile has coordinates but no preferred radius.
    pub default_radius_km: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            score_threshold: SCORE_PER_SHARED_INTEREST,
            default_radius_km: 25.0,
        }
    }
}

/// Why a candidate was rejected before or during scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchRejection {
    #[error("candidate hosts the event")]
    IsHost,
    #[error("candidate is already invited to the event")]
    AlreadyInvited,
    #[error("candidate is already attending the event")]
    AlreadyAttending,
    #[error("candidate has not opted in to auto-invites")]
    OptedOut,
    #[error("event has auto-matching disabled")]
    MatchingDisabled,
    #[error("event is outside the candidate's radius")]
    OutsideRadius,
    #[error("score is below the acceptance threshold")]
    BelowThreshold,
}

/// A candidate that passed evaluation, with its score.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: MatchCandidate,
    pub score: i32,
}

/// `10 × |interests ∩ tags|` over already-normalized sets.
pub fn score_interests(interests: &[String], tags: &[String]) -> i32 {
    SCORE_PER_SHARED_INTEREST * overlap_count(interests, tags) as i32
}

/// Apply the exclusion rules, the radius rule, and the score threshold.
///
/// Exclusions are checked before scoring. The radius rule only applies when
/// the profile carries coordinates; the per-profile radius wins over the
/// configured default.
pub fn evaluate_candidate(
    candidate: &MatchCandidate,
    target: &MatchTarget,
    policy: &MatchPolicy,
) -> Result<i32, MatchRejection> {
    if candidate.user_id == target.host_id {
        return Err(MatchRejection::IsHost);
    }
    if candidate.already_invited {
        return Err(MatchRejection::AlreadyInvited);
    }
    if candidate.already_attending {
        return Err(MatchRejection::AlreadyAttending);
    }
    if !candidate.auto_invite_opt_in {
        return Err(MatchRejection::OptedOut);
    }
    if !target.auto_matching_enabled {
        return Err(MatchRejection::MatchingDisabled);
    }

    if let (Some(lat), Some(lon)) = (candidate.latitude, candidate.longitude) {
        let radius_km = candidate
            .preferred_radius_km
            .unwrap_or(policy.default_radius_km);
        let meters = point!(x: lon, y: lat)
            .haversine_distance(&point!(x: target.longitude, y: target.latitude));
        if meters > radius_km * 1000.0 {
            return Err(MatchRejection::OutsideRadius);
        }
    }

    let score = score_interests(&candidate.interests, &target.interest_tags);
    if score < policy.score_threshold {
        return Err(MatchRejection::BelowThreshold);
    }
    Ok(score)
}

/// Order accepted candidates by descending score, then ascending username.
///
/// The ordering is total, so repeated runs over the same population pick the
/// same prefix when a per-event limit applies.
pub fn rank_candidates(mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.candidate.username.cmp(&b.candidate.username))
    });
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::tags::normalize_tags;

    fn candidate(username: &str, interests: &[&str]) -> MatchCandidate {
        MatchCandidate {
            user_id: Uuid::new_v4(),
            username: username.into(),
            interests: normalize_tags(interests.iter().copied()),
            auto_invite_opt_in: true,
            preferred_radius_km: None,
            latitude: None,
            longitude: None,
            already_invited: false,
            already_attending: false,
        }
    }

    fn target(tags: &[&str]) -> MatchTarget {
        MatchTarget {
            event_id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            interest_tags: normalize_tags(tags.iter().copied()),
            auto_matching_enabled: true,
            latitude: 48.137,
            longitude: 11.575,
        }
    }

    #[test]
    fn test_score_interests() {
        let interests = normalize_tags(["Spanish", "Photography"]);
        let tags = normalize_tags(["photography", "travel"]);
        assert_eq!(score_interests(&interests, &tags), 10);
        assert_eq!(score_interests(&interests, &interests), 20);
        assert_eq!(score_interests(&interests, &normalize_tags(["cooking"])), 0);
    }

    #[test]
    fn test_one_shared_interest_is_accepted() {
        let event = target(&["Spanish", "Photography"]);
        let policy = MatchPolicy::default();

        let a = candidate("anna", &["Spanish"]);
        assert_eq!(evaluate_candidate(&a, &event, &policy), Ok(10));

        let b = candidate("ben", &["Photography", "Travel"]);
        assert_eq!(evaluate_candidate(&b, &event, &policy), Ok(10));

        let c = candidate("cora", &["Cooking"]);
        assert_eq!(
            evaluate_candidate(&c, &event, &policy),
            Err(MatchRejection::BelowThreshold)
        );
    }

    #[test]
    fn test_case_and_whitespace_insensitive_overlap() {
        let event = target(&["  SPANISH "]);
        let a = candidate("anna", &["spanish"]);
        assert_eq!(
            evaluate_candidate(&a, &event, &MatchPolicy::default()),
            Ok(10)
        );
    }

    #[test]
    fn test_host_is_rejected_before_scoring() {
        let event = target(&["Spanish"]);
        let mut host = candidate("hanna", &["Spanish"]);
        host.user_id = event.host_id;
        assert_eq!(
            evaluate_candidate(&host, &event, &MatchPolicy::default()),
            Err(MatchRejection::IsHost)
        );
    }

    #[test]
    fn test_opt_out_is_rejected() {
        let event = target(&["Spanish"]);
        let mut a = candidate("anna", &["Spanish"]);
        a.auto_invite_opt_in = false;
        assert_eq!(
            evaluate_candidate(&a, &event, &MatchPolicy::default()),
            Err(MatchRejection::OptedOut)
        );
    }

    #[test]
    fn test_existing_invitation_and_attendance_are_rejected() {
        let event = target(&["Spanish"]);
        let policy = MatchPolicy::default();

        let mut invited = candidate("anna", &["Spanish"]);
        invited.already_invited = true;
        assert_eq!(
            evaluate_candidate(&invited, &event, &policy),
            Err(MatchRejection::AlreadyInvited)
        );

        let mut attending = candidate("ben", &["Spanish"]);
        attending.already_attending = true;
        assert_eq!(
            evaluate_candidate(&attending, &event, &policy),
            Err(MatchRejection::AlreadyAttending)
        );
    }

    #[test]
    fn test_disabled_event_is_rejected() {
        let mut event = target(&["Spanish"]);
        event.auto_matching_enabled = false;
        let a = candidate("anna", &["Spanish"]);
        assert_eq!(
            evaluate_candidate(&a, &event, &MatchPolicy::default()),
            Err(MatchRejection::MatchingDisabled)
        );
    }

    #[test]
    fn test_empty_tag_set_never_matches() {
        let event = target(&[]);
        let a = candidate("anna", &["Spanish"]);
        assert_eq!(
            evaluate_candidate(&a, &event, &MatchPolicy::default()),
            Err(MatchRejection::BelowThreshold)
        );
    }

    #[test]
    fn test_radius_rule_applies_only_with_coordinates() {
        let event = target(&["Spanish"]);
        let policy = MatchPolicy::default();

        // Roughly 500 km from the event location, radius 10 km.
        let mut far = candidate("anna", &["Spanish"]);
        far.latitude = Some(52.52);
        far.longitude = Some(13.405);
        far.preferred_radius_km = Some(10.0);
        assert_eq!(
            evaluate_candidate(&far, &event, &policy),
            Err(MatchRejection::OutsideRadius)
        );

        // Same profile with a generous radius passes.
        far.preferred_radius_km = Some(500.0);
        assert_eq!(evaluate_candidate(&far, &event, &policy), Ok(10));

        // No stored coordinates: the distance check is skipped entirely.
        let no_coords = candidate("ben", &["Spanish"]);
        assert_eq!(evaluate_candidate(&no_coords, &event, &policy), Ok(10));
    }

    #[test]
    fn test_rank_orders_by_score_then_username() {
        let ranked = rank_candidates(vec![
            ScoredCandidate {
                candidate: candidate("zoe", &["a"]),
                score: 10,
            },
            ScoredCandidate {
                candidate: candidate("anna", &["a"]),
                score: 10,
            },
            ScoredCandidate {
                candidate: candidate("mia", &["a", "b"]),
                score: 20,
            },
        ]);
        let order: Vec<&str> = ranked
            .iter()
            .map(|s| s.candidate.username.as_str())
            .collect();
        assert_eq!(order, vec!["mia", "anna", "zoe"]);
    }

    #[test]
    fn test_rank_is_stable_across_runs() {
        let build = || {
            vec![
                ScoredCandidate {
                    candidate: candidate("ben", &["a"]),
                    score: 10,
                },
                ScoredCandidate {
                    candidate: candidate("anna", &["a"]),
                    score: 10,
                },
            ]
        };
        let first: Vec<String> = rank_candidates(build())
            .into_iter()
            .map(|s| s.candidate.username)
            .collect();
        let second: Vec<String> = rank_candidates(build())
            .into_iter()
            .map(|s| s.candidate.username)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["anna".to_string(), "ben".to_string()]);
    }
}
