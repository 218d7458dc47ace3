//! Domain layer: player records, the roster and pure helpers.

pub mod player;
pub mod rate_limit;
pub mod round_state;
pub mod roster;
pub mod seed_derivation;

// Re-exports for ergonomics
pub use player::{ChatId, Player, PlayerId, PlayerStatus};
pub use rate_limit::{RateLimiter, Verdict};
pub use round_state::{RoundState, Shape, Signal};
pub use roster::{CommitReport, Roster};
