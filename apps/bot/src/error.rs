use thiserror::Error;

use crate::errors::domain::{DomainError, InfraErrorKind};

/// Process-level error returned by `main` and the adapters.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Roster store error: {detail}")]
    Store { detail: String },
    #[error("Channel error: {detail}")]
    Channel { detail: String },
    #[error("Moderation error: {detail}")]
    Moderation { detail: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn store(detail: impl Into<String>) -> Self {
        Self::Store {
            detail: detail.into(),
        }
    }

    pub fn channel(detail: impl Into<String>) -> Self {
        Self::Channel {
            detail: detail.into(),
        }
    }

    pub fn moderation(detail: impl Into<String>) -> Self {
        Self::Moderation {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl From<AppError> for DomainError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(e) => e,
            AppError::Store { detail } => DomainError::infra(InfraErrorKind::StoreUnavailable, detail),
            AppError::Json(e) => DomainError::infra(InfraErrorKind::DataCorruption, e.to_string()),
            AppError::Io(e) => DomainError::infra(InfraErrorKind::StoreUnavailable, e.to_string()),
            AppError::Channel { detail } => DomainError::infra(InfraErrorKind::Delivery, detail),
            AppError::Http(e) => DomainError::infra(InfraErrorKind::Delivery, e.to_string()),
            AppError::Moderation { detail } => DomainError::infra(InfraErrorKind::Moderation, detail),
            other => DomainError::infra(InfraErrorKind::Other("app".into()), other.to_string()),
        }
    }
}
