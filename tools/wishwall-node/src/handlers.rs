use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info, warn};

use wishwall_common::api::{
    DeleteResponse, FeedFrame, HealthResponse, SessionRequest, StatusRequest, SubmitRequest,
    SubmitResponse,
};
use wishwall_common::error::BoardError;
use wishwall_common::identity::Session;
use wishwall_common::message::{Message, MessageId};
use wishwall_common::room::Snapshot;
use wishwall_store::{LiveQuery, MessageStore};

use crate::error::ApiError;
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

// ─── Health/Session ──────────────────────────────────────────────────────────

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        room: state.room_name().to_string(),
        messages: state.room.len().await,
        subscribers: state.room.subscriber_count(),
    })
}

pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> ApiResult<Json<Session>> {
    let token = req.token.as_deref().filter(|t| !t.is_empty());
    Ok(Json(state.sessions.sign_in(token)?))
}

// ─── Messages ────────────────────────────────────────────────────────────────

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Snapshot>> {
    state.sessions.resolve(bearer(&headers))?;
    state.check_room(&room)?;
    Ok(Json(state.room.fetch().await?))
}

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    headers: HeaderMap,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<(StatusCode, Json<SubmitResponse>)> {
    let session = state.sessions.resolve(bearer(&headers))?;
    state.check_room(&room)?;
    let id = state.room.submit(&req.text).await?;
    info!(session = %session.id, %id, "Message submitted");
    Ok((StatusCode::CREATED, Json(SubmitResponse { id })))
}

pub async fn status_handler(
    State(state): State<Arc<AppState>>,
    Path((room, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Message>> {
    let session = state.sessions.resolve_moderator(bearer(&headers))?;
    state.check_room(&room)?;
    let status = req.parse().map_err(BoardError::from)?;
    let message = state
        .room
        .set_status(&MessageId::from(id.as_str()), status)
        .await?;
    info!(session = %session.id, id = %message.id, status = %message.status, "Status set");
    Ok(Json(message))
}

pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path((room, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Json<DeleteResponse>> {
    let session = state.sessions.resolve_moderator(bearer(&headers))?;
    state.check_room(&room)?;
    let deleted = state.room.delete(&MessageId::from(id.as_str())).await?;
    debug!(session = %session.id, %id, deleted, "Delete");
    Ok(Json(DeleteResponse { deleted }))
}

// ─── Live feed ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    token: Option<String>,
}

/// Upgrade to a WebSocket that carries one snapshot frame per change.
///
/// Browsers cannot set headers on a WebSocket handshake, so the session token
/// may also come as `?token=`.
pub async fn subscribe_handler(
    State(state): State<Arc<AppState>>,
    Path(room): Path<String>,
    Query(params): Query<FeedParams>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> ApiResult<Response> {
    let token = params.token.as_deref().or_else(|| bearer(&headers));
    let session = state.sessions.resolve(token)?;
    state.check_room(&room)?;
    Ok(ws.on_upgrade(move |socket| run_feed(state, session, socket)))
}

async fn run_feed(state: Arc<AppState>, session: Session, mut socket: WebSocket) {
    let mut feed = match state.room.watch().await {
        Ok(feed) => feed,
        Err(e) => {
            let _ = send_frame(&mut socket, &FeedFrame::Error { message: e.to_string() }).await;
            return;
        }
    };
    info!(session = %session.id, "Feed opened");

    loop {
        tokio::select! {
            item = feed.next() => {
                let frame = match item {
                    Some(Ok(snapshot)) => FeedFrame::Snapshot(snapshot),
                    Some(Err(e)) => FeedFrame::Error { message: e.to_string() },
                    None => break,
                };
                let terminal = matches!(frame, FeedFrame::Error { .. });
                if send_frame(&mut socket, &frame).await.is_err() || terminal {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Err(e)) => {
                    warn!(session = %session.id, error = %e, "Feed socket error");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
    let _ = socket.send(WsMessage::Close(None)).await;
    info!(session = %session.id, "Feed closed");
}

async fn send_frame(socket: &mut WebSocket, frame: &FeedFrame) -> Result<(), axum::Error> {
    let text = serde_json::to_string(frame).map_err(axum::Error::new)?;
    socket.send(WsMessage::Text(text.into())).await
}
