//! Concrete implementations of the [`crate::ports`] traits.

pub mod json_store;
pub mod memory;
pub mod telegram;

pub use json_store::JsonRosterStore;
pub use memory::{MemoryChannel, MemoryModeration, MemoryStore};
pub use telegram::TelegramGateway;
