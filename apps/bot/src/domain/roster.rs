//! The canonical list of player records for the active tournament.
//!
//! Only the coordinator's commit step changes `status` here; rounds work on
//! cloned snapshots and hand them back through [`Roster::commit`].

use std::collections::HashSet;

use tracing::warn;

use crate::domain::player::{Player, PlayerId, PlayerStatus};
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    players: Vec<Player>,
}

/// Status changes applied by one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub eliminated: Vec<PlayerId>,
    pub winners: Vec<PlayerId>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from stored records, rejecting a snapshot with duplicate ids.
    pub fn from_records(players: Vec<Player>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(players.len());
        for p in &players {
            if !seen.insert(p.id) {
                return Err(DomainError::infra(
                    InfraErrorKind::DataCorruption,
                    format!("player {} appears twice in the stored roster", p.id),
                ));
            }
        }
        Ok(Self { players })
    }

    pub fn records(&self) -> &[Player] {
        &self.players
    }

    pub fn to_records(&self) -> Vec<Player> {
        self.players.clone()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.get(id).is_some()
    }

    pub fn add(&mut self, player: Player) -> Result<(), DomainError> {
        if self.contains(player.id) {
            return Err(DomainError::conflict(
                ConflictKind::DuplicatePlayer,
                format!("player {} is already on the roster", player.id),
            ));
        }
        self.players.push(player);
        Ok(())
    }

    pub fn count(&self, status: PlayerStatus) -> usize {
        self.players.iter().filter(|p| p.status == status).count()
    }

    pub fn alive_count(&self) -> usize {
        self.count(PlayerStatus::Alive)
    }

    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    pub fn with_status(&self, status: PlayerStatus) -> Vec<&Player> {
        self.players.iter().filter(|p| p.status == status).collect()
    }

    /// Promote every `registered` player to `alive`; returns how many moved.
    pub fn promote_registered(&mut self) -> usize {
        let mut promoted = 0;
        for p in self
            .players
            .iter_mut()
            .filter(|p| p.status == PlayerStatus::Registered)
        {
            if p.transition(PlayerStatus::Alive).is_ok() {
                promoted += 1;
            }
        }
        promoted
    }

    /// Frozen copy of the alive players with their round state cleared.
    pub fn snapshot_alive(&self) -> Vec<Player> {
        self.alive()
            .cloned()
            .map(|mut p| {
                p.round_state.reset();
                p
            })
            .collect()
    }

    /// Write a completed round's working copy back as authoritative.
    ///
    /// Round state is copied verbatim; status changes must follow a legal
    /// edge, otherwise the canonical status is kept and the attempt logged.
    pub fn commit(&mut self, working: Vec<Player>) -> CommitReport {
        let mut report = CommitReport::default();
        for updated in working {
            let Some(current) = self.players.iter_mut().find(|p| p.id == updated.id) else {
                warn!(player_id = updated.id, "Commit for player not on roster; ignored");
                continue;
            };
            current.round_state = updated.round_state;
            if current.status == updated.status {
                continue;
            }
            match current.transition(updated.status) {
                Ok(()) => match updated.status {
                    PlayerStatus::Eliminated => report.eliminated.push(updated.id),
                    PlayerStatus::Winner => report.winners.push(updated.id),
                    _ => {}
                },
                Err(e) => warn!(player_id = updated.id, error = %e, "Rejected status change at commit"),
            }
        }
        report
    }

    /// Promote the given survivor to `winner`.
    pub fn crown(&mut self, id: PlayerId) -> Result<(), DomainError> {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(p) => p.transition(PlayerStatus::Winner),
            None => Err(DomainError::not_found(
                NotFoundKind::Player,
                format!("player {id} not on roster"),
            )),
        }
    }

    pub fn find_by_mention(&self, mention: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.matches_mention(mention))
    }
}
