//! Per-screen derived views over a raw snapshot.
//!
//! These are pure functions: the same message set always yields the same
//! view, whatever order the snapshot delivered the messages in.

use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageStatus};

/// Texts shorter than this many UTF-16 units get [`DisplayTier::Large`].
pub const SHORT_TEXT_CHARS: usize = 20;

/// Texts shorter than this many UTF-16 units (and not short) get
/// [`DisplayTier::Medium`].
pub const MEDIUM_TEXT_CHARS: usize = 60;

/// Size class of an approved message on the wall. Ordered smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayTier {
    Small,
    Medium,
    Large,
}

impl DisplayTier {
    pub fn for_len(units: usize) -> Self {
        if units < SHORT_TEXT_CHARS {
            DisplayTier::Large
        } else if units < MEDIUM_TEXT_CHARS {
            DisplayTier::Medium
        } else {
            DisplayTier::Small
        }
    }

    pub fn for_text(text: &str) -> Self {
        Self::for_len(text.encode_utf16().count())
    }
}

/// An approved message placed on the wall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallEntry {
    pub message: Message,
    pub tier: DisplayTier,
}

/// Moderation queue: pending messages, oldest first.
pub fn admin_view(messages: &[Message]) -> Vec<Message> {
    let mut pending: Vec<Message> = messages
        .iter()
        .filter(|m| m.status == MessageStatus::Pending)
        .cloned()
        .collect();
    pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    pending
}

/// Wall display: approved messages, newest first, each with its tier.
pub fn wall_view(messages: &[Message]) -> Vec<WallEntry> {
    let mut approved: Vec<&Message> = messages
        .iter()
        .filter(|m| m.status == MessageStatus::Approved)
        .collect();
    approved.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    approved
        .into_iter()
        .map(|m| WallEntry {
            tier: DisplayTier::for_len(m.text_len()),
            message: m.clone(),
        })
        .collect()
}
