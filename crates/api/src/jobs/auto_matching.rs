//! Periodic bulk auto-matching job.
//!
//! The cron-style trigger of the old operational scripts: invokes one bulk
//! matching run on an interval. Each run is idempotent, so overlapping state
//! between runs is harmless.

use super::scheduler::{Job, JobFrequency};
use crate::services::MatchingService;

/// Job that periodically matches users to upcoming events.
pub struct AutoMatchingJob {
    matching: MatchingService,
    interval_minutes: u64,
}

impl AutoMatchingJob {
    /// Create a new auto-matching job.
    pub fn new(matching: MatchingService, interval_minutes: u64) -> Self {
        Self {
            matching,
            interval_minutes,
        }
    }
}

#[async_trait::async_trait]
impl Job for AutoMatchingJob {
    fn name(&self) -> &'static str {
        "auto_matching"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(self.interval_minutes)
    }

    async fn execute(&self) -> Result<(), String> {
        let outcome = self
            .matching
            .match_all_events()
            .await
            .map_err(|e| e.to_string())?;

        if !outcome.failed_event_ids.is_empty() {
            return Err(format!(
                "{} of {} events failed",
                outcome.failed_event_ids.len(),
                outcome.events_processed
            ));
        }
        Ok(())
    }
}
