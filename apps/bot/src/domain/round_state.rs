//! Per-round scratch state carried on each player record.
//!
//! Exactly one variant is live at a time. The coordinator resets every
//! participant to [`RoundState::Idle`] when a round starts; the accessor for a
//! round's variant installs that variant's neutral default on first use.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::domain::player::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Circle,
    Triangle,
    Square,
}

impl Shape {
    pub const ALL: [Shape; 3] = [Shape::Circle, Shape::Triangle, Shape::Square];

    pub fn label(self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Triangle => "triangle",
            Shape::Square => "square",
        }
    }
}

/// Partner-trust signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Cooperate,
    Defect,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceLane {
    pub progress: u8,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(default, rename = "running_since_ms")]
    pub running_since: Option<Duration>,
}

impl RaceLane {
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn finished(&self) -> bool {
        self.progress >= 100
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeCard {
    pub guess: Option<Shape>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(default, rename = "last_action_ms")]
    pub last_action: Option<Duration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrustSlot {
    pub pick: Option<PlayerId>,
    pub partner: Option<PlayerId>,
    pub choice: Option<Signal>,
}

impl TrustSlot {
    pub fn partner_confirmed(&self) -> bool {
        self.partner.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub vote_for: Option<PlayerId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizCard {
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HuntCard {
    pub secret: u32,
    pub guesses_left: u8,
    pub solved: bool,
}

/// One private answer per flag; `None` until the player submits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagCard {
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "round", rename_all = "snake_case")]
pub enum RoundState {
    #[default]
    Idle,
    Race(RaceLane),
    Shape(ShapeCard),
    Trust(TrustSlot),
    Vote(Ballot),
    Quiz(QuizCard),
    Hunt(HuntCard),
    Flag(FlagCard),
}

macro_rules! round_slot {
    ($variant:ident, $ty:ty, $get:ident, $get_mut:ident) => {
        pub fn $get(&self) -> Option<&$ty> {
            match self {
                RoundState::$variant(slot) => Some(slot),
                _ => None,
            }
        }

        pub fn $get_mut(&mut self) -> &mut $ty {
            if !matches!(self, RoundState::$variant(_)) {
                *self = RoundState::$variant(<$ty>::default());
            }
            match self {
                RoundState::$variant(slot) => slot,
                _ => unreachable!(concat!(stringify!($variant), " slot was just installed")),
            }
        }
    };
}

impl RoundState {
    round_slot!(Race, RaceLane, race, race_mut);
    round_slot!(Shape, ShapeCard, shape, shape_mut);
    round_slot!(Trust, TrustSlot, trust, trust_mut);
    round_slot!(Vote, Ballot, ballot, ballot_mut);
    round_slot!(Quiz, QuizCard, quiz, quiz_mut);
    round_slot!(Hunt, HuntCard, hunt, hunt_mut);
    round_slot!(Flag, FlagCard, flag, flag_mut);

    pub fn reset(&mut self) {
        *self = RoundState::Idle;
    }
}
