use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use wishwall_common::error::{BoardError, Result};
use wishwall_common::message::{Message, MessageId, MessageStatus};
use wishwall_common::room::{RoomState, Snapshot};

use crate::store::{LiveQuery, MessageStore, SnapshotFeed};

/// A room held in process memory.
///
/// Every accepted mutation publishes a fresh snapshot on a watch channel, so
/// slow subscribers skip intermediate states but always see the latest one.
/// Clones share the same room.
#[derive(Debug, Clone)]
pub struct MemoryRoom {
    inner: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    room: String,
    state: RwLock<RoomState>,
    feed_tx: watch::Sender<Snapshot>,
    closed_tx: watch::Sender<bool>,
}

impl MemoryRoom {
    pub fn new(room: impl Into<String>) -> Self {
        let room = room.into();
        let state = RoomState::new(&room);
        let (feed_tx, _) = watch::channel(state.snapshot());
        let (closed_tx, _) = watch::channel(false);
        MemoryRoom {
            inner: Arc::new(Shared {
                room,
                state: RwLock::new(state),
                feed_tx,
                closed_tx,
            }),
        }
    }

    /// Number of open feeds.
    pub fn subscriber_count(&self) -> usize {
        self.inner.feed_tx.receiver_count()
    }

    pub async fn len(&self) -> usize {
        self.inner.state.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.state.read().await.is_empty()
    }

    pub async fn get(&self, id: &MessageId) -> Option<Message> {
        self.inner.state.read().await.get(id).cloned()
    }

    /// End every open feed with an error. Later watches are refused.
    pub fn close(&self) {
        if !self.inner.closed_tx.send_replace(true) {
            info!(room = %self.room(), "Room closed");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.inner.closed_tx.borrow()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(BoardError::StoreUnavailable(format!(
                "room {} is closed",
                self.room()
            )));
        }
        Ok(())
    }

    fn publish(&self, state: &RoomState) {
        self.inner.feed_tx.send_replace(state.snapshot());
    }
}

#[async_trait]
impl MessageStore for MemoryRoom {
    fn room(&self) -> &str {
        &self.inner.room
    }

    async fn submit(&self, text: &str) -> Result<MessageId> {
        self.ensure_open()?;
        let mut state = self.inner.state.write().await;
        let message = state.insert(text, Utc::now())?;
        debug!(room = %state.room(), id = %message.id, "Message submitted");
        self.publish(&state);
        Ok(message.id)
    }

    async fn set_status(&self, id: &MessageId, status: MessageStatus) -> Result<Message> {
        self.ensure_open()?;
        let mut state = self.inner.state.write().await;
        let message = state.set_status(id, status)?;
        debug!(room = %state.room(), %id, %status, "Status changed");
        self.publish(&state);
        Ok(message)
    }

    async fn delete(&self, id: &MessageId) -> Result<bool> {
        self.ensure_open()?;
        let mut state = self.inner.state.write().await;
        let removed = state.remove(id);
        if removed {
            debug!(room = %state.room(), %id, "Message deleted");
            self.publish(&state);
        }
        Ok(removed)
    }

    async fn fetch(&self) -> Result<Snapshot> {
        self.ensure_open()?;
        Ok(self.inner.state.read().await.snapshot())
    }
}

#[async_trait]
impl LiveQuery for MemoryRoom {
    async fn watch(&self) -> Result<SnapshotFeed> {
        let feed_rx = self.inner.feed_tx.subscribe();
        let closed_rx = self.inner.closed_tx.subscribe();
        if *closed_rx.borrow() {
            return Err(BoardError::Subscription(format!(
                "room {} is closed",
                self.room()
            )));
        }

        let stream = stream::unfold(
            FeedState::First(feed_rx, closed_rx),
            |state| async move {
                match state {
                    FeedState::First(mut feed_rx, closed_rx) => {
                        let snapshot = feed_rx.borrow_and_update().clone();
                        Some((Ok(snapshot), FeedState::Live(feed_rx, closed_rx)))
                    }
                    FeedState::Live(mut feed_rx, mut closed_rx) => {
                        tokio::select! {
                            biased;
                            _ = closed_rx.changed() => Some((
                                Err(BoardError::Subscription("room closed".into())),
                                FeedState::Done,
                            )),
                            changed = feed_rx.changed() => match changed {
                                Ok(()) => {
                                    let snapshot = feed_rx.borrow_and_update().clone();
                                    Some((Ok(snapshot), FeedState::Live(feed_rx, closed_rx)))
                                }
                                Err(_) => Some((
                                    Err(BoardError::Subscription("room dropped".into())),
                                    FeedState::Done,
                                )),
                            },
                        }
                    }
                    FeedState::Done => None,
                }
            },
        );
        Ok(SnapshotFeed::new(stream))
    }
}

enum FeedState {
    First(watch::Receiver<Snapshot>, watch::Receiver<bool>),
    Live(watch::Receiver<Snapshot>, watch::Receiver<bool>),
    Done,
}
