//! Wish wall node.
//!
//! Hosts one room in memory. Screens sign in over HTTP, write through the
//! message routes and follow the room over a WebSocket that pushes a full
//! snapshot after every change.

pub mod error;
pub mod handlers;
pub mod sessions;
pub mod state;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use handlers::{
    delete_handler, health_handler, list_handler, session_handler, status_handler,
    submit_handler, subscribe_handler,
};
pub use state::{AppState, NodeConfig};

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/session", post(session_handler))
        .route(
            "/v1/rooms/{room}/messages",
            get(list_handler).post(submit_handler),
        )
        .route(
            "/v1/rooms/{room}/messages/{id}",
            axum::routing::delete(delete_handler),
        )
        .route("/v1/rooms/{room}/messages/{id}/status", put(status_handler))
        .route("/v1/rooms/{room}/subscribe", get(subscribe_handler))
        .layer(cors)
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
