//! HTTP surface of the matchmaker.
//!
//! | Method | Path                | Auth        |
//! |--------|---------------------|-------------|
//! | POST   | `/join`             | user token  |
//! | GET    | `/rooms/:id`        | public      |
//! | GET    | `/room/:id/ready`   | public      |
//! | POST   | `/rooms/:id/leave`  | user token  |
//! | GET    | `/health`           | public      |

use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use colorsync_auth::{UserClaims, UserSecret};
use colorsync_protocol::{PlayerId, RoomId};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    IdentityVerifier, Matchmaker, MatchmakerError, RoomStatus, RuntimeNotifier,
};

/// Shared state handed to every handler.
///
/// Generic over the identity and runtime collaborators so integration tests
/// can wire in stubs without touching the handlers.
pub struct AppState<V, N> {
    pub matchmaker: Arc<Matchmaker>,
    pub identity: Arc<V>,
    pub notifier: Arc<N>,
    pub user_secret: UserSecret,
}

// Manual impl: `#[derive(Clone)]` would demand `V: Clone` even though only
// the `Arc`s are cloned.
impl<V, N> Clone for AppState<V, N> {
    fn clone(&self) -> Self {
        Self {
            matchmaker: Arc::clone(&self.matchmaker),
            identity: Arc::clone(&self.identity),
            notifier: Arc::clone(&self.notifier),
            user_secret: self.user_secret.clone(),
        }
    }
}

impl<V, N> FromRef<AppState<V, N>> for UserSecret {
    fn from_ref(state: &AppState<V, N>) -> Self {
        state.user_secret.clone()
    }
}

/// Builds the matchmaker router.
pub fn app<V, N>(state: AppState<V, N>) -> Router
where
    V: IdentityVerifier,
    N: RuntimeNotifier,
{
    Router::new()
        .route("/join", post(join_handler::<V, N>))
        .route("/rooms/:room_id", get(get_room_handler::<V, N>))
        .route("/room/:room_id/ready", get(room_ready_handler::<V, N>))
        .route("/rooms/:room_id/leave", post(leave_handler::<V, N>))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

#[derive(Deserialize)]
struct JoinRequest {
    #[serde(default)]
    user_id: String,
}

#[derive(Serialize)]
struct JoinResponse {
    room_id: RoomId,
    players: Vec<PlayerId>,
    status: RoomStatus,
    message: String,
}

async fn join_handler<V, N>(
    State(state): State<AppState<V, N>>,
    claims: UserClaims,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, MatchmakerError>
where
    V: IdentityVerifier,
    N: RuntimeNotifier,
{
    if req.user_id.is_empty() {
        return Err(MatchmakerError::MissingUserId);
    }

    // The body must name the same player the token was issued to.
    if req.user_id != claims.user_id {
        tracing::warn!(
            username = %claims.username,
            claimed = %claims.user_id,
            requested = %req.user_id,
            "join attempt on behalf of another user"
        );
        return Err(MatchmakerError::UserIdMismatch);
    }

    let player = PlayerId::new(req.user_id);
    tracing::info!(%player, username = %claims.username, "player joining matchmaking");

    if !state.identity.verify(&player).await {
        return Err(MatchmakerError::UnknownPlayer);
    }

    let outcome = state.matchmaker.join(player)?;

    if outcome.paired {
        // Handoff must not delay the join response; clients poll the
        // runtime's status probe before connecting, so fire-and-forget is
        // enough. Failure is logged, never rolled back.
        let notifier = Arc::clone(&state.notifier);
        let room_id = outcome.room.id.clone();
        let players = outcome.room.players.clone();
        tokio::spawn(async move {
            match notifier.announce(&room_id, &players).await {
                Ok(()) => tracing::info!(%room_id, "game runtime notified"),
                Err(error) => {
                    tracing::error!(%room_id, %error, "failed to announce room to game runtime")
                }
            }
        });
    }

    let message = format!("Joined room {}", outcome.room.id);
    Ok(Json(JoinResponse {
        room_id: outcome.room.id,
        players: outcome.room.players,
        status: outcome.room.status,
        message,
    }))
}

#[derive(Serialize)]
struct RoomResponse {
    id: RoomId,
    players: Vec<PlayerId>,
    status: RoomStatus,
}

async fn get_room_handler<V, N>(
    State(state): State<AppState<V, N>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomResponse>, MatchmakerError>
where
    V: IdentityVerifier,
    N: RuntimeNotifier,
{
    let room = state
        .matchmaker
        .room(&RoomId::new(room_id))
        .ok_or(MatchmakerError::RoomNotFound)?;

    Ok(Json(RoomResponse {
        id: room.id,
        players: room.players,
        status: room.status,
    }))
}

#[derive(Serialize)]
struct ReadyResponse {
    ready: bool,
    players: Vec<PlayerId>,
}

async fn room_ready_handler<V, N>(
    State(state): State<AppState<V, N>>,
    Path(room_id): Path<String>,
) -> Result<Json<ReadyResponse>, MatchmakerError>
where
    V: IdentityVerifier,
    N: RuntimeNotifier,
{
    let (ready, players) = state
        .matchmaker
        .ready(&RoomId::new(room_id))
        .ok_or(MatchmakerError::RoomNotFound)?;

    Ok(Json(ReadyResponse { ready, players }))
}

async fn leave_handler<V, N>(
    State(state): State<AppState<V, N>>,
    Path(room_id): Path<String>,
    claims: UserClaims,
) -> Result<Json<serde_json::Value>, MatchmakerError>
where
    V: IdentityVerifier,
    N: RuntimeNotifier,
{
    let room_id = RoomId::new(room_id);
    let player = PlayerId::new(claims.user_id);
    state.matchmaker.leave(&room_id, &player)?;
    Ok(Json(json!({ "message": format!("Left room {room_id}") })))
}
