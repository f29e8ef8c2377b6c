//! Store client backed by a `wishwall-node` over HTTP and WebSocket.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, instrument, warn};

use wishwall_common::api::{
    self, DeleteResponse, ErrorResponse, FeedFrame, SessionRequest, StatusRequest,
    SubmitRequest, SubmitResponse,
};
use wishwall_common::error::{BoardError, Result};
use wishwall_common::identity::{Credentials, Session};
use wishwall_common::message::{validate_text, Message, MessageId, MessageStatus};
use wishwall_common::room::Snapshot;

use crate::config::ClientConfig;
use crate::store::{LiveQuery, MessageStore, SnapshotFeed};

/// A signed-in connection to one room on a node.
///
/// The only constructor signs in first, so every request carries a session.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    config: ClientConfig,
    session: Session,
}

impl RemoteStore {
    #[instrument(skip(config), fields(node = %config.node_url, room = %config.room))]
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(unavailable)?;

        let token = match &config.credentials {
            Credentials::Anonymous => None,
            Credentials::Token(t) => Some(t.clone()),
        };
        let request = http
            .post(format!("{}{}", config.node_url, api::session_path()))
            .json(&SessionRequest { token });
        let session: Session = send_json(request).await?;
        info!(session = %session.id, role = ?session.role, "Signed in");

        Ok(RemoteStore {
            http,
            config,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.node_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.bearer_auth(&self.session.token)
    }
}

#[async_trait]
impl MessageStore for RemoteStore {
    fn room(&self) -> &str {
        &self.config.room
    }

    async fn submit(&self, text: &str) -> Result<MessageId> {
        validate_text(text)?;
        let request = self
            .authed(self.http.post(self.url(&api::messages_path(self.room()))))
            .json(&SubmitRequest {
                text: text.to_string(),
            });
        let response: SubmitResponse = send_json(request).await?;
        debug!(id = %response.id, "Message submitted");
        Ok(response.id)
    }

    async fn set_status(&self, id: &MessageId, status: MessageStatus) -> Result<Message> {
        let request = self
            .authed(self.http.put(self.url(&api::status_path(self.room(), id))))
            .json(&StatusRequest::new(status));
        send_json(request).await
    }

    async fn delete(&self, id: &MessageId) -> Result<bool> {
        let request = self.authed(self.http.delete(self.url(&api::message_path(self.room(), id))));
        let response: DeleteResponse = send_json(request).await?;
        Ok(response.deleted)
    }

    async fn fetch(&self) -> Result<Snapshot> {
        let request = self.authed(self.http.get(self.url(&api::messages_path(self.room()))));
        send_json(request).await
    }
}

#[async_trait]
impl LiveQuery for RemoteStore {
    async fn watch(&self) -> Result<SnapshotFeed> {
        let url = format!(
            "{}{}?token={}",
            self.config.ws_url(),
            api::subscribe_path(self.room()),
            self.session.token
        );
        let (ws, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| BoardError::Subscription(format!("connect failed: {e}")))?;
        debug!(room = %self.room(), "Feed connected");

        // The socket is dropped with the stream, which closes the connection.
        let feed = stream::unfold(Some(ws), |ws| async move {
            let mut ws = ws?;
            loop {
                let frame = match ws.next().await {
                    None => return None,
                    Some(Err(e)) => {
                        return Some((Err(BoardError::Subscription(e.to_string())), None));
                    }
                    Some(Ok(frame)) => frame,
                };
                match frame {
                    WsMessage::Text(text) => {
                        let parsed = serde_json::from_str::<FeedFrame>(text.as_str());
                        return match parsed {
                            Ok(FeedFrame::Snapshot(snapshot)) => Some((Ok(snapshot), Some(ws))),
                            Ok(FeedFrame::Error { message }) => {
                                Some((Err(BoardError::Subscription(message)), None))
                            }
                            Err(e) => {
                                warn!(error = %e, "Unreadable feed frame");
                                Some((Err(BoardError::Subscription(e.to_string())), None))
                            }
                        };
                    }
                    WsMessage::Close(_) => return None,
                    _ => continue,
                }
            }
        });
        Ok(SnapshotFeed::new(feed))
    }
}

fn unavailable(err: reqwest::Error) -> BoardError {
    BoardError::StoreUnavailable(err.to_string())
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await.map_err(unavailable)?;
    let status = response.status();
    if !status.is_success() {
        return Err(error_from(status, response).await);
    }
    response.json::<T>().await.map_err(unavailable)
}

async fn error_from(status: StatusCode, response: Response) -> BoardError {
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.into_board_error(),
        Err(_) => match status {
            StatusCode::UNAUTHORIZED => BoardError::Unauthorized(status.to_string()),
            StatusCode::FORBIDDEN => BoardError::Forbidden(status.to_string()),
            _ => BoardError::StoreUnavailable(format!("HTTP {status}")),
        },
    }
}
