//! Runtime configuration for the matchmaker binary.

use std::time::Duration;

use colorsync_auth::{ServiceSecret, UserSecret};

/// Where the peer services live and how the matchmaker authenticates.
#[derive(Clone)]
pub struct MatchmakerConfig {
    /// Base URL of the identity service (player-existence lookups).
    pub identity_url: String,
    /// Base URL of the game runtime (room announcements).
    pub runtime_url: String,
    /// Per-request timeout for identity lookups.
    pub identity_timeout: Duration,
    /// Per-request timeout for runtime announcements.
    pub announce_timeout: Duration,
    pub user_secret: UserSecret,
    pub service_secret: ServiceSecret,
}

impl MatchmakerConfig {
    /// Reads peer URLs and secrets from the environment, with the default
    /// local port layout (identity 8001, runtime 8003) as fallback.
    pub fn from_env() -> Self {
        Self {
            identity_url: std::env::var("IDENTITY_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_owned()),
            runtime_url: std::env::var("GAME_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8003".to_owned()),
            identity_timeout: Duration::from_secs(5),
            announce_timeout: Duration::from_secs(10),
            user_secret: UserSecret::from_env(),
            service_secret: ServiceSecret::from_env(),
        }
    }
}
