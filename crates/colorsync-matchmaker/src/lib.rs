//! ColorSync matchmaker service.
//!
//! Pairs authenticated players into two-player rooms (strictly FIFO through
//! a single waiting slot) and announces each filled room to the game runtime
//! with a service credential. All state is in memory and hangs off a
//! [`Matchmaker`] value, so tests run isolated instances side by side.

#![allow(async_fn_in_trait)]

pub mod config;
pub mod error;
pub mod handoff;
pub mod identity;
pub mod routes;
pub mod service;

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

pub use config::MatchmakerConfig;
pub use error::MatchmakerError;
pub use handoff::{HandoffError, HttpRuntimeNotifier, RuntimeNotifier};
pub use identity::{HttpIdentityVerifier, IdentityVerifier};
pub use routes::{app, AppState};
pub use service::{JoinOutcome, Matchmaker, Room, RoomStatus};

pub fn setup_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "colorsync_matchmaker=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_file(false)
                .with_target(false),
        )
        .init();
}

/// Serves the matchmaker on an already-bound listener until the process
/// terminates.
pub async fn run(
    listener: TcpListener,
    config: MatchmakerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity =
        HttpIdentityVerifier::new(config.identity_url.as_str(), config.identity_timeout)?;
    let notifier = HttpRuntimeNotifier::new(
        config.runtime_url.as_str(),
        config.service_secret.clone(),
        config.announce_timeout,
    )?;

    let state = AppState {
        matchmaker: Arc::new(Matchmaker::new()),
        identity: Arc::new(identity),
        notifier: Arc::new(notifier),
        user_secret: config.user_secret,
    };

    axum::serve(listener, app(state)).await?;
    Ok(())
}
