#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod commands;
pub mod config;
pub mod domain;
pub mod effects;
pub mod error;
pub mod errors;
pub mod ports;
pub mod rounds;
pub mod runtime;
pub mod services;

// Re-exports for public API
pub use commands::{Command, Inbound, PlayerAction, Sender};
pub use config::{BotConfig, GameConfig, Timings};
pub use effects::{Asset, Effect};
pub use error::AppError;
pub use errors::DomainError;
pub use runtime::{spawn_poller, Runtime};
pub use services::{Input, Stage, TournamentEngine};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    gauntlet_test_support::logging::init();
}
