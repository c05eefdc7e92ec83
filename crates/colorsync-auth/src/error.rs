//! Auth failures and their HTTP representation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Why a credential was rejected. Every variant maps to a 401.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization token")]
    MissingToken,

    #[error("Invalid authorization format. Use: Bearer <token>")]
    InvalidAuthFormat,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Missing service authentication token")]
    MissingServiceToken,

    #[error("Invalid service token")]
    InvalidServiceToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
