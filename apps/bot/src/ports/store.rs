use async_trait::async_trait;

use crate::domain::player::Player;
use crate::errors::domain::DomainError;

/// Durable roster storage.
///
/// `load` must fail with `InfraErrorKind::DataCorruption` rather than return a
/// partial roster when stored data cannot be read back.
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn load(&self) -> Result<Vec<Player>, DomainError>;

    async fn save(&self, players: &[Player]) -> Result<(), DomainError>;
}
