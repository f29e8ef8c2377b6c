use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use wishwall_common::message::Message;
use wishwall_store::{subscribe, LiveQuery, Subscription};

/// Health of a screen's live feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedStatus {
    /// No snapshot received yet.
    #[default]
    Connecting,
    /// Showing the snapshot with this revision.
    Live { revision: u64 },
    /// The feed failed. The last rendered items are kept on screen.
    Degraded { error: String },
}

impl FeedStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, FeedStatus::Live { .. })
    }

    pub fn label(&self) -> String {
        match self {
            FeedStatus::Connecting => "connecting".to_string(),
            FeedStatus::Live { revision } => format!("live (rev {revision})"),
            FeedStatus::Degraded { error } => format!("offline: {error}"),
        }
    }
}

/// What a screen renders: the filtered items plus the feed they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board<T> {
    pub items: Vec<T>,
    pub feed: FeedStatus,
}

impl<T> Default for Board<T> {
    fn default() -> Self {
        Board {
            items: Vec::new(),
            feed: FeedStatus::default(),
        }
    }
}

/// Projection from the full room contents to one screen's items.
pub type Projection<T> = fn(&[Message]) -> Vec<T>;

/// A board kept current by a live query subscription.
///
/// Readers take the latest [`Board`] from [`LiveBoard::changes`]; a burst of
/// snapshots only wakes them once.
pub struct LiveBoard<T> {
    query: Arc<dyn LiveQuery>,
    project: Projection<T>,
    board_tx: Arc<watch::Sender<Board<T>>>,
    subscription: Subscription,
}

impl<T> LiveBoard<T>
where
    T: Send + Sync + 'static,
{
    pub fn open(query: Arc<dyn LiveQuery>, project: Projection<T>) -> Self {
        let board_tx = Arc::new(watch::Sender::new(Board::default()));
        let subscription = follow(&query, project, &board_tx);
        LiveBoard {
            query,
            project,
            board_tx,
            subscription,
        }
    }

    /// Latest board.
    pub fn current(&self) -> watch::Ref<'_, Board<T>> {
        self.board_tx.borrow()
    }

    pub fn changes(&self) -> watch::Receiver<Board<T>> {
        self.board_tx.subscribe()
    }

    /// Drop the current subscription and open a new one. Items stay on
    /// screen until the first snapshot of the new feed arrives.
    pub fn resync(&mut self) {
        self.subscription.cancel();
        self.board_tx
            .send_modify(|board| board.feed = FeedStatus::Connecting);
        self.subscription = follow(&self.query, self.project, &self.board_tx);
        debug!("Feed resubscribed");
    }

    pub fn close(&self) {
        self.subscription.cancel();
    }
}

impl<T> Drop for LiveBoard<T> {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}

fn follow<T>(
    query: &Arc<dyn LiveQuery>,
    project: Projection<T>,
    board_tx: &Arc<watch::Sender<Board<T>>>,
) -> Subscription
where
    T: Send + Sync + 'static,
{
    let on_snapshot = {
        let board_tx = Arc::clone(board_tx);
        move |snapshot: wishwall_common::room::Snapshot| {
            let items = project(&snapshot.messages);
            board_tx.send_replace(Board {
                items,
                feed: FeedStatus::Live {
                    revision: snapshot.revision,
                },
            });
        }
    };
    let on_error = {
        let board_tx = Arc::clone(board_tx);
        move |err: wishwall_common::error::BoardError| {
            warn!(error = %err, "Live feed failed");
            board_tx.send_modify(|board| {
                board.feed = FeedStatus::Degraded {
                    error: err.to_string(),
                }
            });
        }
    };
    subscribe(query, on_snapshot, on_error)
}
