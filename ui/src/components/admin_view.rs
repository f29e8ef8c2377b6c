use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, warn};

use wishwall_common::error::Result;
use wishwall_common::message::{Message, MessageId, MessageStatus};
use wishwall_common::room::ClearReport;
use wishwall_common::view::admin_view;
use wishwall_store::{LiveQuery, MessageStore};

use super::shared_state::{Board, LiveBoard};

pub const EMPTY_QUEUE: &str = "No pending wishes.";
pub const CLEAR_PROMPT: &str = "Delete ALL data?";

pub type ModerationQueue = Board<Message>;

/// Proof that the moderator was asked before a bulk clear.
///
/// Only [`AdminScreen::request_clear`] makes one and
/// [`AdminScreen::confirm_clear`] consumes it.
#[derive(Debug)]
#[must_use = "a clear only happens once the confirmation is passed to confirm_clear"]
pub struct ClearConfirmation {
    prompt: &'static str,
}

impl ClearConfirmation {
    pub fn prompt(&self) -> &'static str {
        self.prompt
    }
}

/// The moderator dashboard: pending messages, oldest first.
pub struct AdminScreen {
    store: Arc<dyn MessageStore>,
    queue: LiveBoard<Message>,
}

impl AdminScreen {
    pub fn open(store: Arc<dyn MessageStore>, query: Arc<dyn LiveQuery>) -> Self {
        AdminScreen {
            store,
            queue: LiveBoard::open(query, admin_view),
        }
    }

    pub fn current(&self) -> ModerationQueue {
        self.queue.current().clone()
    }

    pub fn changes(&self) -> watch::Receiver<ModerationQueue> {
        self.queue.changes()
    }

    pub async fn approve(&self, id: &MessageId) -> Result<Message> {
        self.set_status(id, MessageStatus::Approved).await
    }

    pub async fn reject(&self, id: &MessageId) -> Result<Message> {
        self.set_status(id, MessageStatus::Rejected).await
    }

    /// Any status may be set from any other, including back to pending.
    pub async fn set_status(&self, id: &MessageId, status: MessageStatus) -> Result<Message> {
        match self.store.set_status(id, status).await {
            Ok(message) => {
                info!(%id, %status, "Moderated");
                Ok(message)
            }
            Err(e) => {
                error!(%id, %status, error = %e, "Moderation failed");
                Err(e)
            }
        }
    }

    pub fn request_clear(&self) -> ClearConfirmation {
        ClearConfirmation {
            prompt: CLEAR_PROMPT,
        }
    }

    /// Delete every message in the room, whatever its status.
    pub async fn confirm_clear(&self, _confirmation: ClearConfirmation) -> Result<ClearReport> {
        let report = self.store.clear_all().await?;
        if report.is_complete() {
            info!(deleted = report.deleted.len(), "Room cleared");
        } else {
            warn!(
                deleted = report.deleted.len(),
                failed = report.failed.len(),
                "Room partially cleared"
            );
        }
        Ok(report)
    }

    pub fn resync(&mut self) {
        self.queue.resync();
    }

    pub fn close(&self) {
        self.queue.close();
    }
}
