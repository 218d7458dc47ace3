//! Side effects requested by the engine and carried out by the runtime.

use std::time::Duration;

use crate::domain::player::{ChatId, Player, PlayerId};

/// Named media the rounds announce with. Adapters map these to files or URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    RegistrationBanner,
    RedLight,
    GreenLight,
    ShapeBoard,
    TrustIntro,
    VoteIntro,
    QuizIntro,
    HuntIntro,
    FlagIntro,
    /// A country flag, by file name.
    Flag(&'static str),
    Champion,
}

impl Asset {
    pub fn file_name(self) -> &'static str {
        match self {
            Asset::RegistrationBanner => "start.jpg",
            Asset::RedLight => "red_light.gif",
            Asset::GreenLight => "green_light.gif",
            Asset::ShapeBoard => "shapes.jpg",
            Asset::TrustIntro => "trust.jpg",
            Asset::VoteIntro => "vote.jpg",
            Asset::QuizIntro => "quiz.jpg",
            Asset::HuntIntro => "hunt.jpg",
            Asset::FlagIntro => "guess_flag.png",
            Asset::Flag(file) => file,
            Asset::Champion => "winner.gif",
        }
    }

    pub fn is_animation(self) -> bool {
        self.file_name().ends_with(".gif")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send {
        to: ChatId,
        text: String,
    },
    /// Text with one button per choice; a press arrives back as that text.
    Prompt {
        to: ChatId,
        text: String,
        choices: Vec<String>,
    },
    SendMedia {
        to: ChatId,
        asset: Asset,
        caption: String,
    },
    Delete {
        chat: ChatId,
        message_id: i64,
    },
    Restrict {
        chat: ChatId,
        player: PlayerId,
    },
    /// Lift restrictions and remove the player from the channel after `after`.
    Remove {
        chat: ChatId,
        player: PlayerId,
        after: Duration,
    },
    /// Drop every `Remove` still waiting out its delay.
    CancelRemovals,
    LoadRoster,
    SaveRoster(Vec<Player>),
    NotifyOperator(String),
}

impl Effect {
    pub fn send(to: ChatId, text: impl Into<String>) -> Self {
        Effect::Send {
            to,
            text: text.into(),
        }
    }

    /// Text of a `Send`/`Prompt`/`SendMedia`, for logging and tests.
    pub fn text(&self) -> Option<&str> {
        match self {
            Effect::Send { text, .. } | Effect::Prompt { text, .. } => Some(text),
            Effect::SendMedia { caption, .. } => Some(caption),
            Effect::NotifyOperator(text) => Some(text),
            _ => None,
        }
    }
}
