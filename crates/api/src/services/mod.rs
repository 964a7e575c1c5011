//! Application services.

pub mod matching;

pub use matching::{MatchingError, MatchingService};
