//! Runtime configuration: environment-driven bot settings and game timings.

pub mod bot;
pub mod timings;

pub use bot::{BotConfig, GameConfig};
pub use timings::{
    HuntTimings, QuizTimings, RaceTimings, ShapeTimings, SpamLimits, Timings, TrustTimings,
    VoteTimings,
};
