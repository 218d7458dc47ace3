//! Environment-driven configuration for the bot process.
//!
//! Variables:
//! - `GAUNTLET_BOT_TOKEN` (required): gateway credential
//! - `GAUNTLET_OPERATOR_ID` (required): the single operator identity
//! - `GAUNTLET_API_BASE`: gateway base URL, defaults to the public Bot API
//! - `GAUNTLET_ROSTER_PATH`: roster snapshot file, defaults to `players.json`
//! - `GAUNTLET_ASSET_BASE`: URL prefix media files are served from; without
//!   it media announcements go out as plain text
//! - `GAUNTLET_SEED`: fixed RNG seed; a random one is drawn when unset
//! - `GAUNTLET_TIMINGS`: optional JSON file overriding [`Timings`]

use std::env;
use std::path::PathBuf;

use crate::config::timings::Timings;
use crate::domain::player::PlayerId;
use crate::error::AppError;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_ROSTER_PATH: &str = "players.json";

/// Settings the tournament engine itself needs.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub operator_id: PlayerId,
    pub seed: u64,
    pub timings: Timings,
}

impl GameConfig {
    pub fn new(operator_id: PlayerId, seed: u64) -> Self {
        Self {
            operator_id,
            seed,
            timings: Timings::default(),
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub api_base: String,
    pub roster_path: PathBuf,
    pub asset_base: Option<String>,
    pub game: GameConfig,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let token = required("GAUNTLET_BOT_TOKEN")?;
        let operator_raw = required("GAUNTLET_OPERATOR_ID")?;
        let operator_id: PlayerId = operator_raw.trim().parse().map_err(|_| {
            AppError::config(format!(
                "GAUNTLET_OPERATOR_ID must be an integer id, got {operator_raw:?}"
            ))
        })?;

        let api_base = optional("GAUNTLET_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let roster_path = optional("GAUNTLET_ROSTER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROSTER_PATH));

        let asset_base =
            optional("GAUNTLET_ASSET_BASE").map(|base| base.trim_end_matches('/').to_string());

        let seed = match optional("GAUNTLET_SEED") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::config(format!("GAUNTLET_SEED must be an unsigned integer, got {raw:?}"))
            })?,
            None => rand::random::<u64>(),
        };

        let timings = match optional("GAUNTLET_TIMINGS") {
            Some(path) => Timings::load(&PathBuf::from(path))?,
            None => Timings::default(),
        };

        Ok(Self {
            token,
            api_base,
            roster_path,
            asset_base,
            game: GameConfig {
                operator_id,
                seed,
                timings,
            },
        })
    }
}

fn required(name: &str) -> Result<String, AppError> {
    optional(name).ok_or_else(|| AppError::config(format!("{name} must be set")))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
