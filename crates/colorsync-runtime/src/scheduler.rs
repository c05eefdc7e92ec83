//! The per-game round scheduler.
//!
//! Spawned exactly once per game, when the second player's session
//! registers. Drives the whole broadcast order a client observes:
//!
//! ```text
//! GAME_START → (ROUND_START → ROUND_RESULT)⁺ → GAME_OVER
//! ```
//!
//! The scheduler owns the clock — round deadlines and the pauses around
//! them — while the session layer owns the latches it waits on. A game that
//! ends early (disconnect) transitions under the game lock on the session
//! side; the scheduler notices the status change at its next wakeup, skips
//! its own `GAME_OVER`, and just runs the cleanup steps.

use std::sync::Arc;

use colorsync_protocol::{Color, GameOverReason, ServerFrame, Word};
use rand::Rng;
use tokio::time::{sleep, sleep_until, Instant};

use crate::game::{Game, GameStatus};
use crate::scoring::{compute_stats, determine_winner};

/// Draws a Stroop prompt: word and color sampled independently, so the
/// conflict is frequent but never guaranteed.
fn draw_prompt() -> (Word, Color) {
    let mut rng = rand::rng();
    let word = Word::ALL[rng.random_range(0..Word::ALL.len())];
    let color = Color::ALL[rng.random_range(0..Color::ALL.len())];
    (word, color)
}

/// Runs one game from `GAME_START` to connection teardown.
pub async fn run_game(game: Arc<Game>) {
    let config = game.config().clone();

    // Step 1: announce the game.
    {
        let state = game.state.lock().await;
        if state.status != GameStatus::InProgress {
            return;
        }
        state.broadcast(ServerFrame::GameStart {
            room_id: game.room_id().clone(),
            max_rounds: config.max_rounds,
            players: game.players().to_vec(),
        });
    }
    tracing::info!(room_id = %game.room_id(), "game started");

    // Step 2: let clients show their pre-round UI.
    sleep(config.pre_game_pause).await;

    // Step 3: the rounds.
    for round in 1..=config.max_rounds {
        let (word, color) = draw_prompt();
        if !game.begin_round(round, word, color).await {
            break;
        }
        let deadline = Instant::now() + config.round_timeout;

        // First of: answer latch, hard deadline. A wakeup can also mean the
        // game ended early, or be a leftover permit from a previous round —
        // both are checked under the lock before the wait ends.
        loop {
            tokio::select! {
                _ = game.answered.notified() => {
                    let state = game.state.lock().await;
                    if state.status != GameStatus::InProgress {
                        break;
                    }
                    if state.round.as_ref().is_some_and(|r| r.answered) {
                        break;
                    }
                }
                _ = sleep_until(deadline) => break,
            }
        }

        if !game.settle_round(round).await {
            break;
        }

        if round < config.max_rounds {
            sleep(config.inter_round_pause).await;
        }
    }

    // Steps 4–5: score and announce, unless a disconnect already did.
    {
        let mut state = game.state.lock().await;
        if state.status == GameStatus::InProgress {
            let stats = compute_stats(game.players(), &state.results);
            let winner = determine_winner(game.players(), &stats);
            state.status = GameStatus::Finished;
            state.broadcast(ServerFrame::GameOver {
                reason: GameOverReason::GameCompleted,
                winner: winner.clone(),
                results: state.results.clone(),
                stats: Some(stats),
            });
            tracing::info!(
                room_id = %game.room_id(),
                winner = %String::from(winner),
                "game finished"
            );
        }
    }

    // Step 6: linger so the last frames flush, then tear down.
    sleep(config.post_game_pause).await;
    {
        let mut state = game.state.lock().await;
        state.close_connections();
        state.status = GameStatus::Completed;
    }
    tracing::info!(room_id = %game.room_id(), "game completed");
}

// =========================================================================
// Tests
// =========================================================================
