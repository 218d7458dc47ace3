//! Domain-level error type used across the engine, rounds and adapters.
//!
//! This error type is transport-agnostic. The process edge converts it into
//! `crate::error::AppError`; inside the engine a `Validation` error becomes a
//! reply to the player who sent the offending action.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Reasons an inbound action is rejected without touching state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    NotRegistered,
    AlreadyRegistered,
    RegistrationClosed,
    RegistrationFull,
    PrivateOnly,
    GroupOnly,
    NotAlive,
    WrongPhase,
    AlreadyActed,
    AlreadyFinished,
    NotRunning,
    SelfTarget,
    UnknownTarget,
    TargetUnavailable,
    AlreadyPaired,
    NotPaired,
    AlreadyAnswered,
    WrongAnswer,
    Cooldown,
    RateLimited,
    Unauthorized,
    NoActiveRound,
    TournamentRunning,
    TournamentIdle,
    EmptyRoster,
    InvalidSlots,
    Malformed,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    StoreUnavailable,
    DataCorruption,
    Delivery,
    Moderation,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Player,
    Round,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    DuplicatePlayer,
    RoundInFlight,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed, duplicate or unauthorized input
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    pub fn validation_kind(&self) -> Option<&ValidationKind> {
        match self {
            DomainError::Validation(kind, _) => Some(kind),
            _ => None,
        }
    }

    /// Rejections the player never hears about.
    ///
    /// Late answers to an already-won quiz question and stale button presses
    /// are dropped without a reply.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(ValidationKind::AlreadyAnswered, _)
                | DomainError::Validation(ValidationKind::Cooldown, _)
                | DomainError::Validation(ValidationKind::NoActiveRound, _)
                | DomainError::Validation(ValidationKind::RateLimited, _)
        )
    }

    /// Text sent back to the player whose action was rejected.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::Validation(_, detail) => detail.clone(),
            DomainError::Conflict(_, detail) => detail.clone(),
            DomainError::NotFound(_, detail) => detail.clone(),
            DomainError::Infra(_, _) => "Something went wrong on our side, try again.".to_string(),
        }
    }
}
