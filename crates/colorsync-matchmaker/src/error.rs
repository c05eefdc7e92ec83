//! Request-scoped matchmaker failures and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Everything a matchmaker request can fail with. Each variant carries its
/// status class; the body is always a short `{"error": "..."}` object.
#[derive(Debug, thiserror::Error)]
pub enum MatchmakerError {
    #[error("user_id is required")]
    MissingUserId,

    #[error("User ID mismatch - cannot join as another user")]
    UserIdMismatch,

    #[error("User not found")]
    UnknownPlayer,

    #[error("You are already in matchmaking queue")]
    AlreadyQueued,

    #[error("You are already in an active room")]
    AlreadyInRoom,

    #[error("Room not found")]
    RoomNotFound,

    #[error("You are not in this room")]
    NotInRoom,
}

impl MatchmakerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingUserId => StatusCode::BAD_REQUEST,
            Self::UserIdMismatch | Self::NotInRoom => StatusCode::FORBIDDEN,
            Self::UnknownPlayer | Self::RoomNotFound => StatusCode::NOT_FOUND,
            Self::AlreadyQueued | Self::AlreadyInRoom => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for MatchmakerError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
