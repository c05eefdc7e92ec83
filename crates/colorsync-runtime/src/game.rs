//! The per-room game record and its mutual-exclusion domain.
//!
//! One [`Game`] exists per announced room. Everything that changes during
//! play — connections, disconnect flags, lifecycle status, round state,
//! results — lives behind a single `tokio::sync::Mutex`, so click
//! arbitration, broadcasts, and disconnect transitions are all serialized
//! per game. Games never share locks, and no game ever touches matchmaker
//! state, so there is no cross-domain lock ordering to get wrong.
//!
//! The round scheduler (see `scheduler`) drives the state machine; this
//! module owns the data and the operations the session layer calls into:
//! connection registration, click evaluation, and disconnect handling.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use colorsync_protocol::{
    Color, GameOverReason, GameWinner, PlayerId, RoomId, RoundResult, RoundWinner, ServerFrame,
    Word,
};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex, Notify};

use crate::{GameConfig, RuntimeError};

/// Counter for generating unique connection ids.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one physical connection, so that a stale reader task can never
/// tear down a connection that has since been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Channel sender feeding a player's writer task.
pub type FrameSender = mpsc::UnboundedSender<ServerFrame>;

/// Lifecycle of a game.
///
/// ```text
/// WaitingForPlayers → InProgress → Finished → Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Created by the matchmaker's announcement; sessions may register.
    WaitingForPlayers,
    /// Both players connected; the round loop is running.
    InProgress,
    /// Outcome decided, `GAME_OVER` sent; connections still draining.
    Finished,
    /// Connections closed. Terminal.
    Completed,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::WaitingForPlayers => "waiting_for_players",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

struct Connection {
    id: ConnectionId,
    sender: FrameSender,
}

/// Mutable state of the round currently on screen.
pub(crate) struct RoundState {
    pub(crate) word: Word,
    pub(crate) color: Color,
    pub(crate) started_at: Instant,
    /// First-correct-answer latch. Monotonic within a round.
    pub(crate) answered: bool,
    /// Deadline latch. Monotonic within a round.
    pub(crate) finished: bool,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) latency_ms: u64,
    /// Players locked out of this round after a wrong answer.
    pub(crate) wrong_answers: HashSet<PlayerId>,
}

impl RoundState {
    fn new(word: Word, color: Color) -> Self {
        Self {
            word,
            color,
            started_at: Instant::now(),
            answered: false,
            finished: false,
            winner: None,
            latency_ms: 0,
            wrong_answers: HashSet::new(),
        }
    }
}

/// Everything guarded by the game mutex.
pub(crate) struct GameState {
    pub(crate) status: GameStatus,
    connections: HashMap<PlayerId, Connection>,
    disconnected: HashMap<PlayerId, bool>,
    pub(crate) current_round: u32,
    pub(crate) round: Option<RoundState>,
    pub(crate) results: Vec<RoundResult>,
}

impl GameState {
    /// Sends a frame to every registered connection. Best-effort: a gone
    /// receiver is simply skipped, the write path treats that player as
    /// disconnected on its own.
    pub(crate) fn broadcast(&self, frame: ServerFrame) {
        for conn in self.connections.values() {
            let _ = conn.sender.send(frame.clone());
        }
    }

    /// Sends a frame to one player, if they have a live connection.
    pub(crate) fn send_to(&self, player: &PlayerId, frame: ServerFrame) {
        if let Some(conn) = self.connections.get(player) {
            let _ = conn.sender.send(frame);
        }
    }

    pub(crate) fn is_disconnected(&self, player: &PlayerId) -> bool {
        self.disconnected.get(player).copied().unwrap_or(false)
    }

    /// Drops every connection sender, which ends the writer tasks and
    /// closes the sockets.
    pub(crate) fn close_connections(&mut self) {
        self.connections.clear();
    }
}

/// Result of registering a connection.
pub struct RegisterOutcome {
    /// Identity of the connection just installed; the reader task passes it
    /// back on disconnect so a superseded connection can't act.
    pub connection: ConnectionId,
    /// `true` when this registration completed the pair — the caller must
    /// spawn the round scheduler, exactly once.
    pub start_game: bool,
}

/// A single game: immutable identity plus the locked state machine.
pub struct Game {
    room_id: RoomId,
    /// Roster snapshot copied at handoff. Never changes afterwards.
    players: [PlayerId; 2],
    config: GameConfig,
    pub(crate) state: Mutex<GameState>,
    /// Signalled when the current round's answer latch is set, and on any
    /// early game end, to wake the scheduler out of its deadline wait.
    pub(crate) answered: Notify,
}

impl Game {
    pub fn new(room_id: RoomId, players: [PlayerId; 2], config: GameConfig) -> Self {
        Self {
            room_id,
            players,
            config,
            state: Mutex::new(GameState {
                status: GameStatus::WaitingForPlayers,
                connections: HashMap::new(),
                disconnected: HashMap::new(),
                current_round: 0,
                round: None,
                results: Vec::new(),
            }),
            answered: Notify::new(),
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn players(&self) -> &[PlayerId; 2] {
        &self.players
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub async fn status(&self) -> GameStatus {
        self.state.lock().await.status
    }

    pub async fn results(&self) -> Vec<RoundResult> {
        self.state.lock().await.results.clone()
    }

    fn opponent_of(&self, player: &PlayerId) -> &PlayerId {
        if self.players[0] == *player {
            &self.players[1]
        } else {
            &self.players[0]
        }
    }

    /// Installs a player's outbound channel.
    ///
    /// Only valid while the game is still waiting for players; during that
    /// window a player may replace their own previous connection
    /// (last-writer-wins — the old sender is dropped, which closes the old
    /// socket). Once the second distinct player registers, the game flips
    /// to `in_progress` and the caller must spawn the scheduler.
    pub async fn register_connection(
        &self,
        player: PlayerId,
        sender: FrameSender,
    ) -> Result<RegisterOutcome, RuntimeError> {
        let mut state = self.state.lock().await;

        if !self.players.contains(&player) {
            return Err(RuntimeError::NotAMember);
        }
        if state.status != GameStatus::WaitingForPlayers {
            return Err(RuntimeError::NotJoinable(state.status));
        }

        let id = ConnectionId::next();
        if let Some(old) = state
            .connections
            .insert(player.clone(), Connection { id, sender })
        {
            tracing::info!(
                room_id = %self.room_id,
                %player,
                old = %old.id,
                new = %id,
                "replaced existing connection"
            );
        }
        state.disconnected.insert(player.clone(), false);

        let start_game = if state.connections.len() == 2 {
            state.status = GameStatus::InProgress;
            true
        } else {
            false
        };

        tracing::info!(
            room_id = %self.room_id,
            %player,
            connections = state.connections.len(),
            "player registered"
        );

        Ok(RegisterOutcome {
            connection: id,
            start_game,
        })
    }

    /// Evaluates a `CLICK` against the current round.
    ///
    /// The first correct answer accepted under the game lock wins; wrong
    /// answers lock the sender out of this round and earn a unicast
    /// `WRONG_ANSWER`. Everything else — late frames, already-settled
    /// rounds, locked-out players, clicks before any round started — is
    /// silently ignored.
    pub async fn handle_click(&self, player: &PlayerId, answer: Color) {
        let mut state = self.state.lock().await;

        if state.status != GameStatus::InProgress {
            return;
        }
        let Some(round) = state.round.as_mut() else {
            return;
        };
        if round.finished || round.answered {
            return;
        }
        if round.wrong_answers.contains(player) {
            return;
        }

        let latency_ms = round.started_at.elapsed().as_millis() as u64;

        if answer == round.color {
            round.answered = true;
            round.winner = Some(player.clone());
            round.latency_ms = latency_ms;
            tracing::info!(
                room_id = %self.room_id,
                %player,
                latency_ms,
                "round won"
            );
            self.answered.notify_one();
        } else {
            round.wrong_answers.insert(player.clone());
            tracing::debug!(
                room_id = %self.room_id,
                %player,
                "wrong answer, locked out for this round"
            );
            state.send_to(player, ServerFrame::WrongAnswer {});
        }
    }

    /// Handles read-side closure of a player's connection.
    ///
    /// No-op if the closing connection was already superseded by a
    /// replacement. Otherwise the player is flagged disconnected, and if a
    /// game was in progress it ends immediately in the survivor's favor:
    /// one `GAME_OVER {opponent_disconnected}` to the surviving connection,
    /// scheduler woken so it can run the cleanup steps.
    pub async fn handle_disconnect(&self, player: &PlayerId, connection: ConnectionId) {
        let mut state = self.state.lock().await;

        let superseded = state
            .connections
            .get(player)
            .map_or(true, |conn| conn.id != connection);
        if superseded {
            tracing::debug!(
                room_id = %self.room_id,
                %player,
                %connection,
                "ignoring close of superseded connection"
            );
            return;
        }

        state.connections.remove(player);
        state.disconnected.insert(player.clone(), true);
        tracing::info!(room_id = %self.room_id, %player, "player disconnected");

        if state.status == GameStatus::InProgress {
            self.finish_after_disconnect(&mut state, player);
        }
    }

    /// Ends an in-progress game because `leaver` is gone. Caller must hold
    /// the lock and have checked `status == InProgress`.
    pub(crate) fn finish_after_disconnect(&self, state: &mut GameState, leaver: &PlayerId) {
        state.status = GameStatus::Finished;
        let survivor = self.opponent_of(leaver).clone();
        let frame = ServerFrame::GameOver {
            reason: GameOverReason::OpponentDisconnected,
            winner: GameWinner::Player(survivor.clone()),
            results: state.results.clone(),
            stats: None,
        };
        state.send_to(&survivor, frame);
        // Wake the scheduler out of any round wait so it can clean up.
        self.answered.notify_one();
        tracing::info!(
            room_id = %self.room_id,
            %leaver,
            %survivor,
            "game ended by disconnect"
        );
    }

    /// Starts a new round: resets the round state and broadcasts
    /// `ROUND_START`. Returns `false` if the game is no longer in progress
    /// or a player is already gone (the scheduler then winds down).
    pub(crate) async fn begin_round(&self, round: u32, word: Word, color: Color) -> bool {
        let mut state = self.state.lock().await;

        if state.status != GameStatus::InProgress {
            return false;
        }
        if let Some(leaver) = self
            .players
            .iter()
            .find(|&p| state.is_disconnected(p))
            .cloned()
        {
            // Belt-and-braces: the disconnect path normally ends the game
            // itself, but a flag set without a transition still stops play.
            self.finish_after_disconnect(&mut state, &leaver);
            return false;
        }

        state.current_round = round;
        state.round = Some(RoundState::new(word, color));
        state.broadcast(ServerFrame::RoundStart { round, word, color });
        tracing::info!(
            room_id = %self.room_id,
            round,
            ?word,
            ?color,
            "round started"
        );
        true
    }

    /// Latches the deadline, records the round result, and broadcasts it.
    /// Returns `false` if the game ended mid-round.
    pub(crate) async fn settle_round(&self, round: u32) -> bool {
        let mut state = self.state.lock().await;

        if state.status != GameStatus::InProgress {
            return false;
        }
        let Some(round_state) = state.round.as_mut() else {
            return false;
        };

        round_state.finished = true;
        let winner = match round_state.winner.clone() {
            Some(player) => RoundWinner::Player(player),
            None => RoundWinner::Timeout,
        };
        let latency_ms = round_state.latency_ms;
        let result = RoundResult {
            round,
            word: round_state.word,
            color: round_state.color,
            winner: winner.clone(),
            latency_ms,
        };
        state.results.push(result);
        state.broadcast(ServerFrame::RoundResult {
            round,
            winner: winner.clone(),
            latency_ms,
        });
        tracing::info!(room_id = %self.room_id, round, winner = %String::from(winner), "round settled");
        true
    }
}

// =========================================================================
// Tests
// =========================================================================
