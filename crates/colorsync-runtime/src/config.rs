//! Runtime configuration: game pacing and service identity.

use std::time::Duration;

use colorsync_auth::ServiceSecret;

/// Pacing and limits for a single game.
///
/// Defaults are the production values; tests shrink the pauses so a full
/// five-round game runs in milliseconds without touching the state machine.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Rounds per game.
    pub max_rounds: u32,
    /// Pause between `GAME_START` and the first round, so clients can
    /// present their pre-round UI.
    pub pre_game_pause: Duration,
    /// Hard deadline for answering a round, measured from `ROUND_START`.
    pub round_timeout: Duration,
    /// Pause between a round's result and the next round.
    pub inter_round_pause: Duration,
    /// Pause between `GAME_OVER` and closing the connections.
    pub post_game_pause: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            pre_game_pause: Duration::from_secs(2),
            round_timeout: Duration::from_secs(5),
            inter_round_pause: Duration::from_secs(3),
            post_game_pause: Duration::from_secs(1),
        }
    }
}

/// Full configuration for the runtime binary.
#[derive(Clone)]
pub struct RuntimeConfig {
    pub service_secret: ServiceSecret,
    pub game: GameConfig,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self {
            service_secret: ServiceSecret::from_env(),
            game: GameConfig::default(),
        }
    }
}
