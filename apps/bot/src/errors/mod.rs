//! Error handling for the Gauntlet bot.

pub mod domain;

pub use domain::DomainError;
