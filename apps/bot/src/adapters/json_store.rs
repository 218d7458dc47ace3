//! Roster persisted as a flat JSON array of player records.
//!
//! Writers take an exclusive OS lock on `<path>.lock`, write a sibling temp
//! file and rename it over the snapshot, so a reader never sees a torn file.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::player::Player;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::ports::RosterStore;

const LOCK_ATTEMPTS: u32 = 50;
const LOCK_BACKOFF: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct JsonRosterStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonRosterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = PathBuf::from(format!("{}.lock", path.display()));
        Self { path, lock_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hold the exclusive lock file; dropping the handle releases it.
    async fn acquire(&self) -> Result<File, DomainError> {
        use fs4::fs_std::FileExt;

        if let Some(parent) = self.lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(unavailable)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(&self.lock_path)
            .map_err(unavailable)?;

        for attempt in 1..=LOCK_ATTEMPTS {
            match file.try_lock_exclusive() {
                Ok(true) => return Ok(file),
                Ok(false) => {}
                Err(e) if e.kind() == ErrorKind::WouldBlock => {}
                Err(e) => return Err(unavailable(e)),
            }
            debug!(attempt, lock = %self.lock_path.display(), "Roster lock contended");
            tokio::time::sleep(LOCK_BACKOFF).await;
        }
        Err(DomainError::infra(
            InfraErrorKind::StoreUnavailable,
            format!("timed out waiting for {}", self.lock_path.display()),
        ))
    }
}

fn unavailable(e: std::io::Error) -> DomainError {
    DomainError::infra(InfraErrorKind::StoreUnavailable, e.to_string())
}

#[async_trait]
impl RosterStore for JsonRosterStore {
    async fn load(&self) -> Result<Vec<Player>, DomainError> {
        let _lock = self.acquire().await?;
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No roster file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(unavailable(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Roster file is corrupt");
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("{} is not a valid roster: {e}", self.path.display()),
            )
        })
    }

    async fn save(&self, players: &[Player]) -> Result<(), DomainError> {
        let body = serde_json::to_vec_pretty(players)
            .map_err(|e| DomainError::infra(InfraErrorKind::DataCorruption, e.to_string()))?;
        let _lock = self.acquire().await?;
        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));
        tokio::fs::write(&tmp, &body).await.map_err(unavailable)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(unavailable)?;
        debug!(path = %self.path.display(), players = players.len(), "Roster saved");
        Ok(())
    }
}
