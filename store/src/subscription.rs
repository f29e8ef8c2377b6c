use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use wishwall_common::error::BoardError;
use wishwall_common::room::Snapshot;

use crate::store::LiveQuery;

/// Handle to a running subscription.
///
/// Clones share one subscription. `cancel` is idempotent and never blocks, so
/// it may be called from inside the snapshot or error callback. Dropping the
/// last clone cancels as well; a clone captured by one of the callbacks keeps
/// the subscription alive until `cancel` is called.
#[derive(Debug, Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    cancelled: Arc<AtomicBool>,
    shutdown_tx: watch::Sender<bool>,
}

impl Subscription {
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            debug!("Subscription cancelled");
        }
        self.inner.shutdown_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }
}

pub(crate) fn spawn_subscription<Q, F, E>(
    query: Arc<Q>,
    mut on_snapshot: F,
    mut on_error: E,
) -> Subscription
where
    Q: LiveQuery + ?Sized + 'static,
    F: FnMut(Snapshot) + Send + 'static,
    E: FnMut(BoardError) + Send + 'static,
{
    let cancelled = Arc::new(AtomicBool::new(false));
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let flag = Arc::clone(&cancelled);

    tokio::spawn(async move {
        let live = || !flag.load(Ordering::SeqCst);

        let opened = tokio::select! {
            biased;
            _ = shutdown_rx.changed() => return,
            opened = query.watch() => opened,
        };
        let mut feed = match opened {
            Ok(feed) => feed,
            Err(e) => {
                if live() {
                    on_error(e);
                }
                return;
            }
        };

        let mut reported = false;
        loop {
            let item = tokio::select! {
                biased;
                // Err here means every handle was dropped.
                _ = shutdown_rx.changed() => break,
                item = feed.next() => item,
            };
            if !live() {
                break;
            }
            match item {
                Some(Ok(snapshot)) => {
                    reported = false;
                    on_snapshot(snapshot);
                }
                Some(Err(e)) => {
                    reported = true;
                    on_error(e);
                }
                None => {
                    if !reported {
                        on_error(BoardError::Subscription("feed closed".into()));
                    }
                    break;
                }
            }
        }
        debug!("Subscription task finished");
    });

    Subscription {
        inner: Arc::new(Inner {
            cancelled,
            shutdown_tx,
        }),
    }
}
