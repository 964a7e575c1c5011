//! Domain services for the PinIt backend.
//!
//! Services contain pure business logic that operates on domain models.
//! They perform no I/O; persistence hands them plain views of stored rows.

pub mod matching;
pub mod visibility;

pub use matching::{
    evaluate_candidate, rank_candidates, score_interests, MatchCandidate, MatchPolicy,
    MatchRejection, MatchTarget, ScoredCandidate,
};

pub use visibility::{bucketize, classify, EventBucket, EventRelation};
