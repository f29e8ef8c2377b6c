use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, warn};

use wishwall_common::error::{BoardError, Result};
use wishwall_common::message::{Message, MessageId, MessageStatus};
use wishwall_common::room::{ClearFailure, ClearReport, Snapshot};

use crate::subscription::{spawn_subscription, Subscription};

/// How many deletes a bulk clear keeps in flight at once.
pub const CLEAR_CONCURRENCY: usize = 8;

/// Write side of a room.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Room this store writes to.
    fn room(&self) -> &str;

    /// Create a pending message. Text must contain a non-whitespace character.
    async fn submit(&self, text: &str) -> Result<MessageId>;

    /// Overwrite the status of an existing message. Last write wins.
    async fn set_status(&self, id: &MessageId, status: MessageStatus) -> Result<Message>;

    /// Remove one message. Returns `false` if it was already gone.
    async fn delete(&self, id: &MessageId) -> Result<bool>;

    /// Current contents of the room.
    async fn fetch(&self) -> Result<Snapshot>;

    /// Delete every message present when the call starts.
    ///
    /// Reads the room once, then deletes each document individually. Failures
    /// are collected per id; deletions that succeeded stay deleted. Messages
    /// created after the read are untouched.
    async fn clear_all(&self) -> Result<ClearReport> {
        let snapshot = self.fetch().await?;
        let ids = snapshot.ids();
        debug!(room = %self.room(), count = ids.len(), "Clearing room");

        let outcomes: Vec<(MessageId, Result<bool>)> = stream::iter(ids)
            .map(|id| async move {
                let outcome = self.delete(&id).await;
                (id, outcome)
            })
            .buffer_unordered(CLEAR_CONCURRENCY)
            .collect()
            .await;

        let mut report = ClearReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(_) => report.deleted.push(id),
                Err(e) => {
                    warn!(room = %self.room(), %id, error = %e, "Delete failed during clear");
                    report.failed.push(ClearFailure {
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }
}

/// Stream of full snapshots. Ends after a terminal error or when the source
/// goes away.
pub struct SnapshotFeed {
    inner: Pin<Box<dyn Stream<Item = Result<Snapshot>> + Send>>,
}

impl SnapshotFeed {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Snapshot>> + Send + 'static,
    {
        SnapshotFeed {
            inner: Box::pin(stream),
        }
    }

    pub async fn next(&mut self) -> Option<Result<Snapshot>> {
        self.inner.next().await
    }
}

impl fmt::Debug for SnapshotFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotFeed").finish_non_exhaustive()
    }
}

/// Read side of a room.
#[async_trait]
pub trait LiveQuery: Send + Sync {
    /// Open a feed. The first item is the room as it is now; every later item
    /// follows a change. Bursts may be coalesced, but the last item delivered
    /// always reflects the latest state.
    async fn watch(&self) -> Result<SnapshotFeed>;
}

/// Call `on_snapshot` with every snapshot of `query` until the returned
/// handle is cancelled or dropped.
///
/// `on_error` fires for each feed error, and once more if the feed ends
/// without having reported one. No delivery starts once the task has
/// observed the cancel, so a `cancel` from inside a callback stops every
/// later one. A `cancel` from another thread may race with a delivery that
/// has already started.
pub fn subscribe<Q, F, E>(query: &Arc<Q>, on_snapshot: F, on_error: E) -> Subscription
where
    Q: LiveQuery + ?Sized + 'static,
    F: FnMut(Snapshot) + Send + 'static,
    E: FnMut(BoardError) + Send + 'static,
{
    spawn_subscription(Arc::clone(query), on_snapshot, on_error)
}
