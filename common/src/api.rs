//! Request, response and feed types exchanged between the node and its
//! screens.

use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::error::{BoardError, ErrorKind, ValidationError};
use crate::message::{MessageId, MessageStatus};
use crate::room::Snapshot;

// ─── Paths ───────────────────────────────────────────────────────────────────

pub fn session_path() -> &'static str {
    "/v1/session"
}

// Room names and ids are percent-encoded as single path segments.

pub fn messages_path(room: &str) -> String {
    format!("/v1/rooms/{}/messages", encode(room))
}

pub fn message_path(room: &str, id: &MessageId) -> String {
    format!("/v1/rooms/{}/messages/{}", encode(room), encode(id.as_str()))
}

pub fn status_path(room: &str, id: &MessageId) -> String {
    format!(
        "/v1/rooms/{}/messages/{}/status",
        encode(room),
        encode(id.as_str())
    )
}

pub fn subscribe_path(room: &str) -> String {
    format!("/v1/rooms/{}/subscribe", encode(room))
}

// ─── Requests/Responses ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: MessageId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    /// Wire name of the new status. Parsed by the node so an unknown name
    /// comes back as a validation error.
    pub status: String,
}

impl StatusRequest {
    pub fn new(status: MessageStatus) -> Self {
        StatusRequest {
            status: status.as_str().to_string(),
        }
    }

    pub fn parse(&self) -> Result<MessageStatus, ValidationError> {
        self.status.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub room: String,
    pub messages: usize,
    pub subscribers: usize,
}

/// Error body returned by every failing route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    /// The rejected status name of an unknown-status validation error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl From<&BoardError> for ErrorResponse {
    fn from(err: &BoardError) -> Self {
        let id = match err {
            BoardError::NotFound(id) => Some(id.clone()),
            _ => None,
        };
        let status = match err {
            BoardError::Validation(ValidationError::UnknownStatus(name)) => Some(name.clone()),
            _ => None,
        };
        ErrorResponse {
            error: err.to_string(),
            kind: err.kind(),
            id,
            status,
        }
    }
}

impl ErrorResponse {
    /// Rebuild the typed error on the client side.
    pub fn into_board_error(self) -> BoardError {
        match self.kind {
            ErrorKind::Validation => BoardError::Validation(match self.status {
                Some(name) => ValidationError::UnknownStatus(name),
                None => ValidationError::EmptyText,
            }),
            ErrorKind::NotFound => {
                BoardError::NotFound(self.id.unwrap_or_else(|| MessageId(String::new())))
            }
            ErrorKind::StoreUnavailable => BoardError::StoreUnavailable(self.error),
            ErrorKind::Subscription => BoardError::Subscription(self.error),
            ErrorKind::Unauthorized => BoardError::Unauthorized(self.error),
            ErrorKind::Forbidden => BoardError::Forbidden(self.error),
        }
    }
}

// ─── Live feed ───────────────────────────────────────────────────────────────

/// One text frame on the subscription WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedFrame {
    Snapshot(Snapshot),
    Error { message: String },
}
