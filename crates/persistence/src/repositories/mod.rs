//! Repository implementations for database operations.

pub mod event;
pub mod invitation;
pub mod matching;
pub mod profile;
pub mod user;

pub use event::EventRepository;
pub use invitation::{AttendOutcome, InvitationRepository, UpsertOutcome};
pub use matching::MatchingRepository;
pub use profile::{ProfileRepository, UpdateProfileInput};
pub use user::UserRepository;
