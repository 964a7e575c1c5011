//! Matching orchestration.
//!
//! Drives the matching engine at three granularities: one event, one user,
//! or the whole population. Candidate retrieval and invitation writes go
//! through the repositories; scoring and ranking are pure calls into the
//! domain layer.
//!
//! Mis-configured events (auto-matching disabled, no tags, private, already
//! started) produce an empty result rather than an error, so bulk runs never
//! fail because of a single event. Per-event failures in a bulk run are
//! recorded and skipped; per-user upsert failures abort only that upsert.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use domain::models::matching::{
    BulkMatchOutcome, EventMatchOutcome, MatchResult, UserMatchOutcome,
};
use domain::models::Event;
use domain::services::matching::{
    evaluate_candidate, rank_candidates, MatchCandidate, MatchPolicy, MatchTarget,
    ScoredCandidate,
};
use persistence::repositories::{
    EventRepository, InvitationRepository, MatchingRepository, UpsertOutcome,
};

use crate::config::MatchingConfig;
use crate::middleware::metrics::{record_auto_matches_created, record_candidates_scored};

/// Errors surfaced by matching operations.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("event not found: {0}")]
    EventNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

/// Orchestrates matching runs over the invitation store.
#[derive(Clone)]
pub struct MatchingService {
    events: EventRepository,
    invitations: InvitationRepository,
    index: MatchingRepository,
    policy: MatchPolicy,
    limit_per_event: usize,
}

impl MatchingService {
    pub fn new(pool: PgPool, config: &MatchingConfig) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            invitations: InvitationRepository::new(pool.clone()),
            index: MatchingRepository::new(pool),
            policy: MatchPolicy {
                score_threshold: config.score_threshold,
                default_radius_km: config.default_radius_km,
            },
            limit_per_event: config.limit_per_event,
        }
    }

    /// Run matching for one event with the configured per-event limit.
    pub async fn match_event(&self, event_id: Uuid) -> Result<EventMatchOutcome, MatchingError> {
        self.match_event_with_limit(event_id, self.limit_per_event)
            .await
    }

    /// Run matching for one event, creating at most `limit` new matches.
    pub async fn match_event_with_limit(
        &self,
        event_id: Uuid,
        limit: usize,
    ) -> Result<EventMatchOutcome, MatchingError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .map(Event::from)
            .ok_or(MatchingError::EventNotFound(event_id))?;
        self.match_loaded_event(&event, limit).await
    }

    /// Run matching for every upcoming public auto-matching event.
    pub async fn match_all_events(&self) -> Result<BulkMatchOutcome, MatchingError> {
        let events = self.events.matchable_events().await?;
        let mut outcome = BulkMatchOutcome::new();

        for event in events.into_iter().map(Event::from) {
            outcome.events_processed += 1;
            match self.match_loaded_event(&event, self.limit_per_event).await {
                Ok(event_outcome) => {
                    outcome.matches_created += event_outcome.matches_created;
                }
                Err(err) => {
                    warn!(event_id = %event.id, error = %err, "Matching failed for event, continuing");
                    outcome.failed_event_ids.push(event.id);
                }
            }
        }

        info!(
            events_processed = outcome.events_processed,
            matches_created = outcome.matches_created,
            failed = outcome.failed_event_ids.len(),
            "Bulk matching run completed"
        );
        Ok(outcome)
    }

    /// Run matching for one user across all overlapping upcoming events.
    ///
    /// Events already at the per-event match limit are skipped so a single
    /// user cannot push an event past the bound. The caller resolves the
    /// username to a user id.
    pub async fn match_user(
        &self,
        user_id: Uuid,
        username: &str,
    ) -> Result<UserMatchOutcome, MatchingError> {
        let candidates = self.index.events_for_user(user_id).await?;
        let mut matched_events = Vec::new();

        for event in candidates.into_iter().map(Event::from) {
            let existing = self.invitations.count_auto_matches(event.id).await?;
            if existing >= self.limit_per_event as i64 {
                continue;
            }

            let event_candidates = self.index.candidates_for_event(event.id).await?;
            let Some(candidate) = event_candidates
                .into_iter()
                .find(|c| c.user_id == user_id)
                .map(MatchCandidate::from)
            else {
                continue;
            };

            let target = match_target(&event);
            if let Ok(score) = evaluate_candidate(&candidate, &target, &self.policy) {
                match self.invitations.upsert_auto_match(event.id, user_id, score).await {
                    Ok(UpsertOutcome::Created) => matched_events.push(event.id),
                    Ok(UpsertOutcome::Existed) => {}
                    Err(err) => {
                        warn!(event_id = %event.id, user_id = %user_id, error = %err,
                              "Auto-match upsert failed, continuing");
                    }
                }
            }
        }

        info!(
            user_id = %user_id,
            matches_created = matched_events.len(),
            "User matching run completed"
        );
        Ok(UserMatchOutcome {
            username: username.to_string(),
            matches_created: matched_events.len(),
            event_ids: matched_events,
        })
    }

    /// Clear an event's auto-matches and recompute them from scratch.
    /// Manual invitations survive untouched.
    pub async fn rebuild_for_event(
        &self,
        event_id: Uuid,
    ) -> Result<EventMatchOutcome, MatchingError> {
        let cleared = self.invitations.clear_auto_matches(event_id).await?;
        debug!(event_id = %event_id, cleared = cleared, "Cleared auto-matches for rebuild");
        self.match_event(event_id).await
    }

    /// Administrative full rebuild: clear auto-matches on every
    /// auto-matching event, then run bulk matching.
    pub async fn rebuild_all(&self) -> Result<BulkMatchOutcome, MatchingError> {
        let event_ids = self.events.auto_matching_event_ids().await?;
        let mut cleared_total = 0u64;
        for event_id in event_ids {
            cleared_total += self.invitations.clear_auto_matches(event_id).await?;
        }
        info!(cleared = cleared_total, "Cleared auto-matches for full rebuild");
        self.match_all_events().await
    }

    /// Matching for an already-loaded event row.
    async fn match_loaded_event(
        &self,
        event: &Event,
        limit: usize,
    ) -> Result<EventMatchOutcome, MatchingError> {
        let now = chrono::Utc::now();
        if !event.auto_matching_enabled
            || event.interest_tags.is_empty()
            || !event.is_public
            || !event.is_upcoming(now)
        {
            debug!(event_id = %event.id, "Event not eligible for matching, skipping");
            return Ok(EventMatchOutcome::empty(event.id));
        }

        let candidates = self.index.candidates_for_event(event.id).await?;
        record_candidates_scored(candidates.len());

        let target = match_target(event);
        let scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(MatchCandidate::from)
            .filter_map(|candidate| {
                match evaluate_candidate(&candidate, &target, &self.policy) {
                    Ok(score) => Some(ScoredCandidate { candidate, score }),
                    Err(rejection) => {
                        debug!(event_id = %event.id, username = %candidate.username,
                               rejection = %rejection, "Candidate rejected");
                        None
                    }
                }
            })
            .collect();

        let mut matches = Vec::new();
        for entry in rank_candidates(scored).into_iter().take(limit) {
            match self
                .invitations
                .upsert_auto_match(event.id, entry.candidate.user_id, entry.score)
                .await
            {
                Ok(UpsertOutcome::Created) => matches.push(MatchResult {
                    username: entry.candidate.username,
                    score: entry.score,
                }),
                Ok(UpsertOutcome::Existed) => {}
                Err(err) => {
                    warn!(event_id = %event.id, user_id = %entry.candidate.user_id,
                          error = %err, "Auto-match upsert failed, continuing");
                }
            }
        }

        record_auto_matches_created(matches.len());
        info!(
            event_id = %event.id,
            matches_created = matches.len(),
            "Event matching completed"
        );
        Ok(EventMatchOutcome {
            event_id: event.id,
            matches_created: matches.len(),
            matches,
        })
    }
}

fn match_target(event: &Event) -> MatchTarget {
    MatchTarget {
        event_id: event.id,
        host_id: event.host_id,
        interest_tags: event.interest_tags.clone(),
        auto_matching_enabled: event.auto_matching_enabled,
        latitude: event.latitude,
        longitude: event.longitude,
    }
}
