use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque message identifier, assigned by the room on creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Random 64-bit id rendered as 16 hex digits.
    pub fn generate() -> Self {
        MessageId(hex::encode(rand::random::<[u8; 8]>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId(s.to_string())
    }
}

/// Moderation status of a message.
///
/// There is no terminal state: a moderator may move a message between any
/// two statuses, any number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Approved,
    Rejected,
}

impl MessageStatus {
    pub fn all() -> &'static [MessageStatus] {
        &[
            MessageStatus::Pending,
            MessageStatus::Approved,
            MessageStatus::Rejected,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Approved => "approved",
            MessageStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MessageStatus::Pending),
            "approved" => Ok(MessageStatus::Approved),
            "rejected" => Ok(MessageStatus::Rejected),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

/// A guest's wish as stored in the room.
///
/// Only `status` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub status: MessageStatus,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a new pending message. `text` must already be validated.
    pub fn pending(id: MessageId, text: String, created_at: DateTime<Utc>) -> Self {
        Message {
            id,
            text,
            status: MessageStatus::Pending,
            created_at,
        }
    }

    /// Text length in UTF-16 code units, the input of display tiering.
    ///
    /// Characters outside the Basic Multilingual Plane (most emoji) count
    /// as two.
    pub fn text_len(&self) -> usize {
        self.text.encode_utf16().count()
    }
}

/// Check that submitted text is non-empty after trimming.
///
/// The text itself is stored exactly as the author typed it.
pub fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(())
}
