use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::MessageId;

/// Input rejected before it reaches the room. Not retried automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("message text is empty")]
    EmptyText,

    #[error("unknown message status: {0}")]
    UnknownStatus(String),
}

/// Failure taxonomy shared by every store implementation and screen.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("message not found: {0}")]
    NotFound(MessageId),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("subscription error: {0}")]
    Subscription(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),
}

/// Wire discriminant for [`BoardError`], carried in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    StoreUnavailable,
    Subscription,
    Unauthorized,
    Forbidden,
}

impl BoardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BoardError::Validation(_) => ErrorKind::Validation,
            BoardError::NotFound(_) => ErrorKind::NotFound,
            BoardError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            BoardError::Subscription(_) => ErrorKind::Subscription,
            BoardError::Unauthorized(_) => ErrorKind::Unauthorized,
            BoardError::Forbidden(_) => ErrorKind::Forbidden,
        }
    }

    /// Transient failures that are safe to retry without side effects.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BoardError::StoreUnavailable(_) | BoardError::Subscription(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
