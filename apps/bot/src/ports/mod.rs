//! Seams between the engine's effects and the outside world.

pub mod channel;
pub mod moderation;
pub mod store;

pub use channel::Channel;
pub use moderation::Moderation;
pub use store::RosterStore;
