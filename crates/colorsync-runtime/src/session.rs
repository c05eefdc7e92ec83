//! The client session layer: one WebSocket per player per game.
//!
//! Each accepted session splits into two halves:
//!
//! - a **writer task** that owns the socket sink and drains the player's
//!   frame queue — so broadcasts from the scheduler never block on a slow
//!   client, and dropping the queue sender is all it takes to close the
//!   socket;
//! - a **reader loop** (this task) that decodes inbound frames and routes
//!   them into the game. A closed or failed read is the disconnect signal.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use colorsync_protocol::{decode_frame, encode_frame, ClientFrame, PlayerId, RoomId, ServerFrame};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::game::Game;
use crate::routes::RuntimeState;
use crate::scheduler;
use crate::RuntimeError;

#[derive(Deserialize)]
pub struct SessionQuery {
    #[serde(default)]
    room_id: String,
    #[serde(default)]
    user_id: String,
}

/// `GET /game/ws?room_id={id}&user_id={id}` — the bidirectional upgrade.
///
/// Rejections happen at the HTTP layer where possible (missing params,
/// unknown game, game already underway); the authoritative joinability
/// check is repeated under the game lock at registration, since another
/// session can race us between the probe and the upgrade.
pub async fn ws_handler(
    State(state): State<RuntimeState>,
    Query(query): Query<SessionQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    if query.room_id.is_empty() || query.user_id.is_empty() {
        return RuntimeError::InvalidStartRequest("missing room_id or user_id".into())
            .into_response();
    }
    let room_id = RoomId::new(query.room_id);
    let player = PlayerId::new(query.user_id);

    let Some(game) = state.registry.get(&room_id) else {
        return RuntimeError::GameNotFound.into_response();
    };
    match game.status().await {
        crate::game::GameStatus::WaitingForPlayers => {}
        status => return RuntimeError::NotJoinable(status).into_response(),
    }

    ws.on_upgrade(move |socket| handle_session(game, player, socket))
}

async fn handle_session(game: Arc<Game>, player: PlayerId, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerFrame>();
    // Kept for PONG replies; the original goes to the game's connection slot.
    let pong_tx = tx.clone();

    let outcome = match game.register_connection(player.clone(), tx).await {
        Ok(outcome) => outcome,
        Err(rejection) => {
            // Lost the race between the HTTP probe and registration.
            tracing::info!(
                room_id = %game.room_id(),
                %player,
                %rejection,
                "session rejected at registration"
            );
            if let Ok(text) = encode_frame(&ServerFrame::Error {
                message: rejection.to_string(),
            }) {
                let _ = sink.send(Message::Text(text)).await;
            }
            let _ = sink.close().await;
            return;
        }
    };

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match encode_frame(&frame) {
                Ok(text) => text,
                Err(error) => {
                    tracing::error!(%error, "failed to encode outbound frame");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        // Queue sender gone: game over, or this connection was replaced.
        let _ = sink.close().await;
    });

    if outcome.start_game {
        tracing::info!(room_id = %game.room_id(), "both players connected, starting game");
        tokio::spawn(scheduler::run_game(Arc::clone(&game)));
    }

    while let Some(msg) = stream.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(_) => break,
        };
        match msg {
            Message::Text(text) => match decode_frame::<ClientFrame>(&text) {
                Ok(ClientFrame::Click { answer }) => {
                    game.handle_click(&player, answer).await;
                }
                Ok(ClientFrame::Ping {}) => {
                    let _ = pong_tx.send(ServerFrame::Pong {});
                }
                Err(error) => {
                    tracing::debug!(%player, %error, "ignoring unrecognized frame");
                }
            },
            Message::Close(_) => break,
            // Protocol-level ping/pong/binary are not part of the frame
            // vocabulary; axum answers pings on its own.
            _ => {}
        }
    }

    game.handle_disconnect(&player, outcome.connection).await;

    // Release our queue sender so the writer drains and closes the socket.
    drop(pong_tx);
    let _ = writer.await;
    tracing::debug!(room_id = %game.room_id(), %player, "session ended");
}
