use wishwall_common::api::{self, ErrorResponse, HealthResponse};
use wishwall_common::error::{BoardError, ErrorKind, ValidationError};
use wishwall_common::identity::{Credentials, Role};
use wishwall_common::message::{MessageId, MessageStatus};
use wishwall_node::NodeConfig;
use wishwall_node_integration::*;
use wishwall_store::{MessageStore, RemoteStore};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn health_reports_room() {
    tracing_subscriber::fmt::try_init().ok();
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    guest.submit("hello").await.unwrap();

    let health: HealthResponse = reqwest::get(format!("{}/health", node.url))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.room, ROOM);
    assert_eq!(health.messages, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sign_in_assigns_roles() {
    let node = spawn_node().await;
    assert_eq!(node.connect_guest().await.session().role, Role::Guest);
    assert_eq!(node.connect_admin().await.session().role, Role::Moderator);

    let wrong = node
        .guest_config()
        .with_credentials(Credentials::Token("guess".into()));
    let err = RemoteStore::connect(wrong).await.unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn anonymous_sign_in_can_be_disabled() {
    let node = spawn_node_with(NodeConfig {
        room: ROOM.to_string(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        allow_anonymous: false,
    })
    .await;

    let err = RemoteStore::connect(node.guest_config()).await.unwrap_err();
    assert!(matches!(err, BoardError::Unauthorized(_)));
    node.connect_admin().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn requests_without_session_are_unauthorized() {
    let node = spawn_node().await;
    let response = reqwest::get(format!("{}{}", node.url, api::messages_path(ROOM)))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(body.kind, ErrorKind::Unauthorized);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn guests_cannot_moderate() {
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    let id = guest.submit("let me approve myself").await.unwrap();

    let err = guest
        .set_status(&id, MessageStatus::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, BoardError::Forbidden(_)));
    assert!(matches!(
        guest.delete(&id).await,
        Err(BoardError::Forbidden(_))
    ));
    let report = guest.clear_all().await.unwrap();
    assert_eq!(report.failed_ids(), vec![id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn blank_text_is_rejected_on_both_sides() {
    let node = spawn_node().await;
    let guest = node.connect_guest().await;

    let err = guest.submit(" \t ").await.unwrap_err();
    assert_eq!(err, BoardError::Validation(ValidationError::EmptyText));

    // Bypass the client check and hit the route directly.
    let response = reqwest::Client::new()
        .post(format!("{}{}", node.url, api::messages_path(ROOM)))
        .bearer_auth(&guest.session().token)
        .json(&serde_json::json!({ "text": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(node.state.room.len().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn moderating_missing_message_is_not_found() {
    let node = spawn_node().await;
    let admin = node.connect_admin().await;
    let ghost = MessageId::from("ghost");

    let err = admin
        .set_status(&ghost, MessageStatus::Approved)
        .await
        .unwrap_err();
    assert_eq!(err, BoardError::NotFound(ghost.clone()));
    assert!(!admin.delete(&ghost).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn status_changes_are_last_write_wins() {
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    let admin_a = node.connect_admin().await;
    let admin_b = node.connect_admin().await;
    let id = guest.submit("contested").await.unwrap();

    admin_a.set_status(&id, MessageStatus::Approved).await.unwrap();
    let last = admin_b.set_status(&id, MessageStatus::Rejected).await.unwrap();
    assert_eq!(last.status, MessageStatus::Rejected);
    assert_eq!(
        node.state.room.get(&id).await.unwrap().status,
        MessageStatus::Rejected
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submissions_are_stamped_in_order() {
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(guest.submit(&format!("wish {i}")).await.unwrap());
    }

    let snapshot = guest.fetch().await.unwrap();
    let stamps: Vec<_> = ids
        .iter()
        .map(|id| snapshot.get(id).unwrap().created_at)
        .collect();
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    assert!(snapshot
        .messages
        .iter()
        .all(|m| m.status == MessageStatus::Pending));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn other_rooms_are_not_found() {
    let node = spawn_node().await;
    let stray = RemoteStore::connect(node.guest_config().with_room("elsewhere"))
        .await
        .unwrap();
    let err = stray.submit("hello?").await.unwrap_err();
    assert!(matches!(err, BoardError::NotFound(_)));
    assert_eq!(node.state.room.len().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn text_is_stored_verbatim() {
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    let id = guest.submit("  Frohe Weihnachten 🎄  ").await.unwrap();
    let stored = node.state.room.get(&id).await.unwrap();
    assert_eq!(stored.text, "  Frohe Weihnachten 🎄  ");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_status_comes_back_as_validation_error() {
    let node = spawn_node().await;
    let guest = node.connect_guest().await;
    let admin = node.connect_admin().await;
    let id = guest.submit("archive me").await.unwrap();

    let response = reqwest::Client::new()
        .put(format!("{}{}", node.url, api::status_path(ROOM, &id)))
        .bearer_auth(&admin.session().token)
        .json(&serde_json::json!({ "status": "archived" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: ErrorResponse = response.json().await.unwrap();
    assert_eq!(
        body.into_board_error(),
        BoardError::Validation(ValidationError::UnknownStatus("archived".into()))
    );
    assert_eq!(
        node.state.room.get(&id).await.unwrap().status,
        MessageStatus::Pending
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn room_names_with_reserved_characters_work() {
    let room = "wish wall/2025?";
    let node = spawn_node_with(NodeConfig {
        room: room.to_string(),
        admin_token: Some(ADMIN_TOKEN.to_string()),
        allow_anonymous: true,
    })
    .await;
    let guest = RemoteStore::connect(node.guest_config().with_room(room))
        .await
        .unwrap();
    let admin = RemoteStore::connect(node.admin_config().with_room(room))
        .await
        .unwrap();

    let id = guest.submit("odd room").await.unwrap();
    admin.set_status(&id, MessageStatus::Approved).await.unwrap();
    let snapshot = guest.fetch().await.unwrap();
    assert_eq!(snapshot.room, room);
    assert_eq!(snapshot.get(&id).unwrap().status, MessageStatus::Approved);
}
