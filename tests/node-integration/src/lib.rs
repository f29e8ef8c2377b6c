//! Helpers for running a `wishwall-node` inside a test and talking to it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use wishwall_common::identity::Credentials;
use wishwall_common::room::Snapshot;
use wishwall_node::{AppState, NodeConfig};
use wishwall_store::{ClientConfig, RemoteStore, SnapshotFeed};


pub const ADMIN_TOKEN: &str = "integration-admin";
pub const ROOM: &str = "integration-room";
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// A node serving on an ephemeral localhost port. Stops when dropped.
pub struct TestNode {
    pub url: String,
    pub state: Arc<AppState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestNode {
    pub fn guest_config(&self) -> ClientConfig {
        ClientConfig::new(&self.url)
            .with_room(ROOM)
            .with_timeout(TIMEOUT)
    }

    pub fn admin_config(&self) -> ClientConfig {
        self.guest_config()
            .with_credentials(Credentials::Token(ADMIN_TOKEN.into()))
    }

    pub async fn connect_guest(&self) -> RemoteStore {
        RemoteStore::connect(self.guest_config())
            .await
            .expect("guest sign-in")
    }

    pub async fn connect_admin(&self) -> RemoteStore {
        RemoteStore::connect(self.admin_config())
            .await
            .expect("admin sign-in")
    }

    /// Wait until the node has exactly `count` open feeds.
    pub async fn wait_for_subscribers(&self, count: usize) -> bool {
        let deadline = Instant::now() + TIMEOUT;
        while Instant::now() < deadline {
            if self.state.room.subscriber_count() == count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}

pub async fn spawn_node() -> TestNode {
    spawn_node_with(NodeConfig {
        room: ROOM.to_string(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        allow_anonymous: true,
    })
    .await
}

pub async fn spawn_node_with(config: NodeConfig) -> TestNode {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let state = Arc::new(AppState::new(config));
    let (tx, rx) = oneshot::channel();

    let handle = tokio::spawn(wishwall_node::serve(listener, state.clone(), async {
        let _ = rx.await;
    }));
    tracing::debug!(%addr, "Test node started");

    TestNode {
        url: format!("http://{addr}"),
        state,
        shutdown: Some(tx),
        handle,
    }
}

/// Receive from `rx` until an item satisfies `predicate`, or `timeout` expires.
pub async fn recv_matching<T>(
    rx: &mut mpsc::UnboundedReceiver<T>,
    predicate: impl Fn(&T) -> bool,
    timeout: Duration,
) -> Option<T> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        match tokio::time::timeout(remaining, rx.recv()).await {
            Ok(Some(item)) if predicate(&item) => return Some(item),
            Ok(Some(_)) => continue,
            Ok(None) | Err(_) => return None,
        }
    }
}

/// Read `feed` until a snapshot satisfies `predicate`, or `timeout` expires.
pub async fn next_snapshot_matching(
    feed: &mut SnapshotFeed,
    predicate: impl Fn(&Snapshot) -> bool,
    timeout: Duration,
) -> Option<Snapshot> {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return None;
        }
        match tokio::time::timeout(remaining, feed.next()).await {
            Ok(Some(Ok(snapshot))) if predicate(&snapshot) => return Some(snapshot),
            Ok(Some(Ok(_))) => continue,
            Ok(Some(Err(e))) => {
                tracing::debug!(error = %e, "Feed error while waiting");
                return None;
            }
            Ok(None) | Err(_) => return None,
        }
    }
}
