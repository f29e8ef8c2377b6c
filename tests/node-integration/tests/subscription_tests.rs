use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use wishwall_common::error::BoardError;
use wishwall_common::message::MessageStatus;
use wishwall_common::room::Snapshot;
use wishwall_node_integration::*;
use wishwall_store::{subscribe, LiveQuery, MessageStore, Subscription};

/// First delivery is the room as it is, before any further change.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn feed_opens_with_current_state() {
    tracing_subscriber::fmt::try_init().ok();
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    guest.submit("early bird").await.unwrap();

    let mut feed = guest.watch().await.unwrap();
    let first = next_snapshot_matching(&mut feed, |_| true, TIMEOUT)
        .await
        .expect("first snapshot");
    assert_eq!(first.len(), 1);
    assert_eq!(first.room, ROOM);
}

/// Every subscriber sees a change made by someone else.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn change_reaches_every_subscriber() {
    let node = spawn_node().await;
    let wall = Arc::new(node.connect_guest().await);
    let admin = Arc::new(node.connect_admin().await);
    let guest = node.connect_guest().await;

    let (wall_tx, mut wall_rx) = mpsc::unbounded_channel::<Snapshot>();
    let (admin_tx, mut admin_rx) = mpsc::unbounded_channel::<Snapshot>();
    let _wall_sub = subscribe(&wall, move |s| drop(wall_tx.send(s)), |_| {});
    let _admin_sub = subscribe(&admin, move |s| drop(admin_tx.send(s)), |_| {});
    assert!(node.wait_for_subscribers(2).await);

    let id = guest.submit("for everyone").await.unwrap();
    admin.set_status(&id, MessageStatus::Approved).await.unwrap();

    let approved = |s: &Snapshot| {
        s.get(&id)
            .is_some_and(|m| m.status == MessageStatus::Approved)
    };
    assert!(recv_matching(&mut wall_rx, approved, TIMEOUT).await.is_some());
    assert!(recv_matching(&mut admin_rx, approved, TIMEOUT).await.is_some());
}

/// Revisions only move forward within one feed.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn revisions_increase() {
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    let mut feed = guest.watch().await.unwrap();
    next_snapshot_matching(&mut feed, |_| true, TIMEOUT).await.unwrap();

    let mut last = 0;
    for i in 0..3 {
        guest.submit(&format!("wish {i}")).await.unwrap();
        let snapshot = next_snapshot_matching(&mut feed, |s| s.len() == i + 1, TIMEOUT)
            .await
            .expect("snapshot after submit");
        assert!(snapshot.revision > last);
        last = snapshot.revision;
    }
}

/// Cancelling from inside the callback stops delivery and closes the feed.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_inside_callback_releases_feed() {
    let node = spawn_node().await;
    let guest = Arc::new(node.connect_guest().await);
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
    let calls = Arc::new(Mutex::new(0usize));

    let sub = {
        let slot = slot.clone();
        let calls = calls.clone();
        subscribe(
            &guest,
            move |s: Snapshot| {
                *calls.lock().unwrap() += 1;
                if !s.is_empty() {
                    if let Some(sub) = slot.lock().unwrap().as_ref() {
                        sub.cancel();
                    }
                }
            },
            |_| {},
        )
    };
    *slot.lock().unwrap() = Some(sub.clone());
    assert!(node.wait_for_subscribers(1).await);

    guest.submit("stop after this").await.unwrap();
    assert!(node.wait_for_subscribers(0).await, "feed still open");
    assert!(sub.is_cancelled());

    let seen = *calls.lock().unwrap();
    guest.submit("unseen").await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(*calls.lock().unwrap(), seen);
    slot.lock().unwrap().take();
}

/// Dropping the only handle unsubscribes.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dropping_handle_closes_feed() {
    let node = spawn_node().await;
    let guest = Arc::new(node.connect_guest().await);
    let sub = subscribe(&guest, |_| {}, |_| {});
    assert!(node.wait_for_subscribers(1).await);

    drop(sub);
    assert!(node.wait_for_subscribers(0).await);
}

/// A feed that cannot be opened reports through the error callback.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_room_feed_reports_error() {
    let node = spawn_node().await;
    let stray = Arc::new(
        wishwall_store::RemoteStore::connect(node.guest_config().with_room("elsewhere"))
            .await
            .unwrap(),
    );
    let (tx, mut rx) = mpsc::unbounded_channel::<BoardError>();
    let _sub = subscribe(&stray, |_| panic!("no snapshot expected"), move |e| {
        drop(tx.send(e))
    });

    let err = recv_matching(&mut rx, |_| true, TIMEOUT)
        .await
        .expect("error reported");
    assert!(matches!(err, BoardError::Subscription(_)));
}

/// A bulk clear while subscribed ends with an empty snapshot.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn clear_is_observed_by_subscribers() {
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    let admin = node.connect_admin().await;
    for text in ["a", "b", "c", "d"] {
        guest.submit(text).await.unwrap();
    }

    let mut feed = guest.watch().await.unwrap();
    next_snapshot_matching(&mut feed, |s| s.len() == 4, TIMEOUT)
        .await
        .unwrap();

    let report = admin.clear_all().await.unwrap();
    assert!(report.is_complete());
    assert!(next_snapshot_matching(&mut feed, |s| s.is_empty(), TIMEOUT)
        .await
        .is_some());
}
