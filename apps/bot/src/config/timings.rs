//! Every duration and threshold the tournament runs on.
//!
//! Defaults reproduce the live game. A JSON file (keys suffixed `_ms` for
//! durations) can override any subset; missing keys keep their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::error::AppError;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "registration_window_ms")]
    pub registration_window: Duration,
    /// Delay between the tournament starting and round 1.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "preparation_ms")]
    pub preparation: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "round_cooldown_ms")]
    pub round_cooldown: Duration,
    /// How long an eliminated player stays in the channel before removal.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "kick_delay_ms")]
    pub kick_delay: Duration,
    pub max_rounds: u8,
    pub race: RaceTimings,
    pub shape: ShapeTimings,
    pub trust: TrustTimings,
    pub vote: VoteTimings,
    pub quiz: QuizTimings,
    pub hunt: HuntTimings,
    pub flag: FlagTimings,
    pub spam: SpamLimits,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            registration_window: Duration::from_secs(120),
            preparation: Duration::from_secs(60),
            round_cooldown: Duration::from_secs(5),
            kick_delay: Duration::from_secs(10),
            max_rounds: 5,
            race: RaceTimings::default(),
            shape: ShapeTimings::default(),
            trust: TrustTimings::default(),
            vote: VoteTimings::default(),
            quiz: QuizTimings::default(),
            hunt: HuntTimings::default(),
            flag: FlagTimings::default(),
            spam: SpamLimits::default(),
        }
    }
}

impl Timings {
    /// Read overrides from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read timings file {}: {e}", path.display()))
        })?;
        let timings: Timings = serde_json::from_str(&raw)?;
        timings.validate()?;
        Ok(timings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.race.flip_min > self.race.flip_max {
            return Err(AppError::config("race.flip_min_ms exceeds race.flip_max_ms"));
        }
        if self.race.full_progress.is_zero() {
            return Err(AppError::config("race.full_progress_ms must be positive"));
        }
        if self.quiz.win_score == 0 {
            return Err(AppError::config("quiz.win_score must be at least 1"));
        }
        if self.hunt.max_secret == 0 || self.hunt.guesses == 0 {
            return Err(AppError::config("hunt.max_secret and hunt.guesses must be positive"));
        }
        if self.flag.rounds == 0 {
            return Err(AppError::config("flag.rounds must be at least 1"));
        }
        if self.spam.threshold == 0 {
            return Err(AppError::config("spam.threshold must be at least 1"));
        }
        Ok(())
    }
}

/// Movement race (red light / green light).
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceTimings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "prep_ms")]
    pub prep: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "duration_ms")]
    pub duration: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "flip_min_ms")]
    pub flip_min: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "flip_max_ms")]
    pub flip_max: Duration,
    /// Uninterrupted running time needed to go from 0 to 100 progress.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "full_progress_ms")]
    pub full_progress: Duration,
    pub eliminate_unfinished: bool,
}

impl Default for RaceTimings {
    fn default() -> Self {
        Self {
            prep: Duration::from_secs(60),
            duration: Duration::from_secs(60),
            flip_min: Duration::from_secs(15),
            flip_max: Duration::from_secs(30),
            full_progress: Duration::from_secs(5),
            eliminate_unfinished: true,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeTimings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "thinking_ms")]
    pub thinking: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "guessing_ms")]
    pub guessing: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "action_cooldown_ms")]
    pub action_cooldown: Duration,
}

impl Default for ShapeTimings {
    fn default() -> Self {
        Self {
            thinking: Duration::from_secs(60),
            guessing: Duration::from_secs(60),
            action_cooldown: Duration::from_secs(1),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustTimings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "intro_ms")]
    pub intro: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "pairing_ms")]
    pub pairing: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "choice_intro_ms")]
    pub choice_intro: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "choice_ms")]
    pub choice: Duration,
}

impl Default for TrustTimings {
    fn default() -> Self {
        Self {
            intro: Duration::from_secs(60),
            pairing: Duration::from_secs(60),
            choice_intro: Duration::from_secs(60),
            choice: Duration::from_secs(60),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteTimings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "intro_ms")]
    pub intro: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "window_ms")]
    pub window: Duration,
    /// Pause after an elimination before the next ballot opens.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "pause_ms")]
    pub pause: Duration,
}

impl Default for VoteTimings {
    fn default() -> Self {
        Self {
            intro: Duration::from_secs(20),
            window: Duration::from_secs(60),
            pause: Duration::from_secs(5),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizTimings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "answer_ms")]
    pub answer: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "cooldown_ms")]
    pub cooldown: Duration,
    pub win_score: u32,
}

impl Default for QuizTimings {
    fn default() -> Self {
        Self {
            answer: Duration::from_secs(30),
            cooldown: Duration::from_secs(60),
            win_score: 3,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuntTimings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "prep_ms")]
    pub prep: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "limit_ms")]
    pub limit: Duration,
    pub guesses: u8,
    pub max_secret: u32,
}

impl Default for HuntTimings {
    fn default() -> Self {
        Self {
            prep: Duration::from_secs(60),
            limit: Duration::from_secs(100),
            guesses: 7,
            max_secret: 100,
        }
    }
}

/// Guess the flag: `rounds` flags in a row, one private answer each.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagTimings {
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "prep_ms")]
    pub prep: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "answer_ms")]
    pub answer: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "gap_ms")]
    pub gap: Duration,
    pub rounds: u8,
}

impl Default for FlagTimings {
    fn default() -> Self {
        Self {
            prep: Duration::from_secs(30),
            answer: Duration::from_secs(30),
            gap: Duration::from_secs(30),
            rounds: 2,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamLimits {
    pub threshold: u32,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "interval_ms")]
    pub interval: Duration,
}

impl Default for SpamLimits {
    fn default() -> Self {
        Self {
            threshold: 3,
            interval: Duration::from_secs(10),
        }
    }
}
