//! Parsing of inbound chat messages into engine commands.

use lazy_regex::regex_captures;
use time::OffsetDateTime;

use crate::domain::player::{ChatId, PlayerId};
use crate::domain::round_state::{Shape, Signal};

#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub id: PlayerId,
    pub display_name: String,
    pub username: Option<String>,
}

/// One message (or button press) as delivered by the channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub sender: Sender,
    pub chat: ChatId,
    pub private: bool,
    pub message_id: Option<i64>,
    pub text: String,
    pub sent_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    Run,
    Stop,
    Guess(Shape),
    Pick(String),
    Choose(Signal),
    Vote(String),
    Answer(String),
    Number(u32),
}

impl PlayerAction {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::Run => "run",
            PlayerAction::Stop => "stop",
            PlayerAction::Guess(_) => "guess",
            PlayerAction::Pick(_) => "pick",
            PlayerAction::Choose(_) => "choose",
            PlayerAction::Vote(_) => "vote",
            PlayerAction::Answer(_) => "answer",
            PlayerAction::Number(_) => "number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open registration for this many slots; `None` when the count is not a number.
    Start(Option<u32>),
    Join,
    Begin,
    StopGame,
    StopRound,
    Roster,
    Status,
    Reset,
    Action(PlayerAction),
    /// Free text that is not a command; may still be a quiz or flag answer.
    Chatter(String),
}

impl Command {
    pub fn is_operator_only(&self) -> bool {
        matches!(
            self,
            Command::Start(_)
                | Command::Begin
                | Command::StopGame
                | Command::StopRound
                | Command::Roster
                | Command::Status
                | Command::Reset
        )
    }
}

/// Classify a message. Returns `None` for empty text and unknown slash commands.
pub fn parse(text: &str, private: bool) -> Option<Command> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some((_, name, rest)) = regex_captures!(r"^/([A-Za-z_]+)(?:@\w+)?(?:\s+(.*))?$"s, text)
    {
        let arg = rest.trim();
        return match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start(arg.parse().ok())),
            "join" => Some(Command::Join),
            "begin" => Some(Command::Begin),
            "stopgame" => Some(Command::StopGame),
            "stopround" => Some(Command::StopRound),
            "roster" => Some(Command::Roster),
            "status" => Some(Command::Status),
            "reset" => Some(Command::Reset),
            "pick" if !arg.is_empty() => Some(Command::Action(PlayerAction::Pick(arg.into()))),
            "vote" if !arg.is_empty() => Some(Command::Action(PlayerAction::Vote(arg.into()))),
            "answer" if !arg.is_empty() => {
                Some(Command::Action(PlayerAction::Answer(arg.into())))
            }
            _ => None,
        };
    }

    let action = match text.to_ascii_lowercase().as_str() {
        "run" => Some(PlayerAction::Run),
        "stop" => Some(PlayerAction::Stop),
        "circle" => Some(PlayerAction::Guess(Shape::Circle)),
        "triangle" => Some(PlayerAction::Guess(Shape::Triangle)),
        "square" => Some(PlayerAction::Guess(Shape::Square)),
        "trust" | "cooperate" => Some(PlayerAction::Choose(Signal::Cooperate)),
        "betray" | "defect" => Some(PlayerAction::Choose(Signal::Defect)),
        _ => None,
    };
    if let Some(action) = action {
        return Some(Command::Action(action));
    }

    if private {
        if let Some((_, digits)) = regex_captures!(r"^(\d{1,9})$", text) {
            if let Ok(n) = digits.parse() {
                return Some(Command::Action(PlayerAction::Number(n)));
            }
        }
    }

    Some(Command::Chatter(text.to_string()))
}
