//! ColorSync game runtime.
//!
//! Runs the Stroop reflex games the matchmaker announces: accepts both
//! players' WebSocket sessions, drives a deadline-bounded round loop per
//! game, arbitrates first-correct-answer wins, and reports scores. Every
//! game is its own concurrency island — one lock, one scheduler task, one
//! reader task per connection.

pub mod config;
pub mod error;
pub mod game;
pub mod registry;
pub mod routes;
pub mod scheduler;
pub mod scoring;
pub mod session;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

pub use config::{GameConfig, RuntimeConfig};
pub use error::RuntimeError;
pub use game::{ConnectionId, Game, GameStatus, RegisterOutcome};
pub use registry::GameRegistry;
pub use routes::{app, RuntimeState};

pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colorsync_runtime=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(false)
                .with_target(false),
        )
        .init();
}

/// Serves the runtime on an already-bound listener until the process
/// terminates.
pub async fn run(
    listener: TcpListener,
    config: RuntimeConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = RuntimeState {
        registry: Arc::new(GameRegistry::new(config.game)),
        service_secret: config.service_secret,
    };
    axum::serve(listener, app(state)).await?;
    Ok(())
}
