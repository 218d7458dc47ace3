//! Gauntlet test support utilities
//!
//! Shared helpers for the integration tests of the `gauntlet` crate: unified
//! logging initialization and generators for unique test data.

pub mod logging;
pub mod unique_helpers;

pub use unique_helpers::{unique_name, unique_player_id};
