use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};
use crate::message::{validate_text, Message, MessageId, MessageStatus};

/// The complete set of messages in a room at one point in time.
///
/// `revision` grows by one per accepted mutation, so a consumer can tell
/// when several writes were coalesced into a single delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub room: String,
    pub revision: u64,
    pub messages: Vec<Message>,
}

impl Snapshot {
    pub fn empty(room: impl Into<String>) -> Self {
        Snapshot {
            room: room.into(),
            revision: 0,
            messages: Vec::new(),
        }
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn ids(&self) -> Vec<MessageId> {
        self.messages.iter().map(|m| m.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Authoritative message collection of a single room.
///
/// Every mutation touches exactly one message. Timestamps are assigned here,
/// never by clients, and never go backwards.
#[derive(Debug, Clone)]
pub struct RoomState {
    room: String,
    revision: u64,
    last_created_at: Option<DateTime<Utc>>,
    messages: BTreeMap<MessageId, Message>,
}

impl RoomState {
    pub fn new(room: impl Into<String>) -> Self {
        RoomState {
            room: room.into(),
            revision: 0,
            last_created_at: None,
            messages: BTreeMap::new(),
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    /// Create a pending message stamped with `now` at millisecond precision.
    ///
    /// Stamps are strictly increasing within a room: if the clock stalls or
    /// steps back, the message is placed one millisecond after the previous
    /// one, so insertion order survives the wire format.
    pub fn insert(&mut self, text: &str, now: DateTime<Utc>) -> Result<Message> {
        validate_text(text)?;

        let now = truncate_to_millis(now);
        let created_at = match self.last_created_at {
            Some(last) if last >= now => last + Duration::milliseconds(1),
            _ => now,
        };
        let mut id = MessageId::generate();
        while self.messages.contains_key(&id) {
            id = MessageId::generate();
        }

        let message = Message::pending(id.clone(), text.to_string(), created_at);
        self.messages.insert(id, message.clone());
        self.last_created_at = Some(created_at);
        self.revision += 1;
        Ok(message)
    }

    /// Overwrite the status of an existing message. Last write wins.
    pub fn set_status(&mut self, id: &MessageId, status: MessageStatus) -> Result<Message> {
        let message = self
            .messages
            .get_mut(id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))?;
        message.status = status;
        let updated = message.clone();
        self.revision += 1;
        Ok(updated)
    }

    /// Remove one message. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: &MessageId) -> bool {
        let removed = self.messages.remove(id).is_some();
        if removed {
            self.revision += 1;
        }
        removed
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            room: self.room.clone(),
            revision: self.revision,
            messages: self.messages.values().cloned().collect(),
        }
    }
}

fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

/// Outcome of a bulk clear. Deletions are never rolled back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    pub deleted: Vec<MessageId>,
    pub failed: Vec<ClearFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearFailure {
    pub id: MessageId,
    pub reason: String,
}

impl ClearReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<MessageId> {
        self.failed.iter().map(|f| f.id.clone()).collect()
    }
}
