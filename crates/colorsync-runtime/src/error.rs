//! Request-scoped runtime failures and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::game::GameStatus;

/// Everything a runtime request can fail with.
///
/// Streaming-scope problems (reads, writes) never appear here — those are
/// disconnections and are handled on the session, not as a response.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Invalid game start request: {0}")]
    InvalidStartRequest(String),

    #[error("A game already exists for this room")]
    GameAlreadyExists,

    #[error("Game not found")]
    GameNotFound,

    #[error("Game is not accepting connections (status: {0})")]
    NotJoinable(GameStatus),

    #[error("Player is not part of this game")]
    NotAMember,
}

impl RuntimeError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidStartRequest(_) => StatusCode::BAD_REQUEST,
            Self::GameAlreadyExists | Self::NotJoinable(_) => StatusCode::CONFLICT,
            Self::GameNotFound => StatusCode::NOT_FOUND,
            Self::NotAMember => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for RuntimeError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
