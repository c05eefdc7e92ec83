//! HTTP surface of the game runtime.
//!
//! | Method | Path                      | Auth           |
//! |--------|---------------------------|----------------|
//! | POST   | `/game/start`             | service token  |
//! | GET    | `/game/status?room_id={}` | public         |
//! | GET    | `/game/ws`                | upgrade        |
//! | GET    | `/health`                 | public         |

use std::sync::Arc;

use axum::{
    extract::{FromRef, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use colorsync_auth::{ServiceClaims, ServiceSecret};
use colorsync_protocol::{PlayerId, RoomId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::game::GameStatus;
use crate::registry::GameRegistry;
use crate::session;
use crate::RuntimeError;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct RuntimeState {
    pub registry: Arc<GameRegistry>,
    pub service_secret: ServiceSecret,
}

impl FromRef<RuntimeState> for ServiceSecret {
    fn from_ref(state: &RuntimeState) -> Self {
        state.service_secret.clone()
    }
}

/// Builds the runtime router.
pub fn app(state: RuntimeState) -> Router {
    Router::new()
        .route("/game/start", post(start_game_handler))
        .route("/game/status", get(game_status_handler))
        .route("/game/ws", get(session::ws_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

#[derive(Deserialize)]
struct StartGameRequest {
    #[serde(default)]
    room_id: String,
    #[serde(default)]
    players: Vec<PlayerId>,
}

#[derive(Serialize)]
struct StartGameResponse {
    room_id: RoomId,
    status: GameStatus,
    message: String,
}

/// Only the matchmaker may announce games, which it proves with its
/// service token. Clients cannot fabricate one: the extractor rejects the
/// request before this handler runs.
async fn start_game_handler(
    State(state): State<RuntimeState>,
    claims: ServiceClaims,
    Json(req): Json<StartGameRequest>,
) -> Result<Json<StartGameResponse>, RuntimeError> {
    tracing::info!(
        service = %claims.service_name,
        room_id = %req.room_id,
        "game start announcement"
    );

    let room_id = RoomId::new(req.room_id);
    state.registry.create(room_id.clone(), req.players)?;

    Ok(Json(StartGameResponse {
        room_id,
        status: GameStatus::WaitingForPlayers,
        message: "Game created, waiting for players to connect via WebSocket".into(),
    }))
}

#[derive(Deserialize)]
struct StatusQuery {
    room_id: String,
}

#[derive(Serialize)]
struct StatusResponse {
    room_id: RoomId,
    status: GameStatus,
}

async fn game_status_handler(
    State(state): State<RuntimeState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, RuntimeError> {
    let room_id = RoomId::new(query.room_id);
    let game = state.registry.get(&room_id).ok_or(RuntimeError::GameNotFound)?;

    Ok(Json(StatusResponse {
        room_id,
        status: game.status().await,
    }))
}
