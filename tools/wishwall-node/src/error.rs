use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use wishwall_common::api::ErrorResponse;
use wishwall_common::error::{BoardError, ErrorKind};

/// Error returned by a route.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("unknown room: {0}")]
    UnknownRoom(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownRoom(_) => StatusCode::NOT_FOUND,
            ApiError::Board(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::StoreUnavailable | ErrorKind::Subscription => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            },
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Board(err) => ErrorResponse::from(err),
            ApiError::UnknownRoom(_) => ErrorResponse {
                error: self.to_string(),
                kind: ErrorKind::NotFound,
                id: None,
                status: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
