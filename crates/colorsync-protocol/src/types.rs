//! Core protocol types shared by the matchmaker and the game runtime.
//!
//! Everything in this module travels on the wire in JSON form, so the serde
//! attributes here *are* the wire format. The exact shapes are pinned down by
//! the tests at the bottom of this file and in `frames.rs` — a mismatch means
//! game clients can no longer parse our messages.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Player identity is minted by the external identity service; to us it is an
/// opaque string. The newtype keeps it from being confused with a [`RoomId`]
/// (both are strings underneath) and gives us a single place to hang trait
/// impls.
///
/// `#[serde(transparent)]` makes this serialize as the bare string, so a
/// `PlayerId("alice")` becomes `"alice"` in JSON, not `{"0":"alice"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A unique identifier for a room (and, after handoff, its game).
///
/// Generated by the matchmaker when the first player queues up; the runtime
/// reuses the same id to key the game record, so one string identifies the
/// match end to end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Stroop prompt
// ---------------------------------------------------------------------------

/// The color a prompt is rendered in — and the color named by a click.
///
/// Lowercase on the wire (`"red"`), matching what clients send back in a
/// `CLICK` frame. The winning condition compares a click against the round's
/// `Color`, never against its [`Word`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    /// Every color a round can use, in a fixed order for uniform sampling.
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];
}

/// The text of a Stroop prompt. Uppercase on the wire (`"RED"`).
///
/// Kept as a separate enum from [`Color`] so the two fields of a prompt can
/// never be mixed up at a call site, and so each serializes with its own
/// casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Word {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Word {
    /// Every word a round can use, in a fixed order for uniform sampling.
    pub const ALL: [Word; 4] = [Word::Red, Word::Blue, Word::Green, Word::Yellow];
}

// ---------------------------------------------------------------------------
// Winners
// ---------------------------------------------------------------------------

/// The outcome of a single round: a player, or the `"timeout"` sentinel when
/// the deadline fired with no correct answer.
///
/// On the wire this is a plain string — either a player id or `"timeout"` —
/// so the `from`/`into` conversions below do the narrowing instead of serde's
/// usual tagging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoundWinner {
    Player(PlayerId),
    Timeout,
}

const TIMEOUT_SENTINEL: &str = "timeout";

impl From<String> for RoundWinner {
    fn from(s: String) -> Self {
        if s == TIMEOUT_SENTINEL {
            RoundWinner::Timeout
        } else {
            RoundWinner::Player(PlayerId(s))
        }
    }
}

impl From<RoundWinner> for String {
    fn from(w: RoundWinner) -> Self {
        match w {
            RoundWinner::Player(id) => id.0,
            RoundWinner::Timeout => TIMEOUT_SENTINEL.to_owned(),
        }
    }
}

/// The outcome of a whole game: a player, or the `"draw"` sentinel when
/// scoring cannot pick a unique winner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GameWinner {
    Player(PlayerId),
    Draw,
}

const DRAW_SENTINEL: &str = "draw";

impl From<String> for GameWinner {
    fn from(s: String) -> Self {
        if s == DRAW_SENTINEL {
            GameWinner::Draw
        } else {
            GameWinner::Player(PlayerId(s))
        }
    }
}

impl From<GameWinner> for String {
    fn from(w: GameWinner) -> Self {
        match w {
            GameWinner::Player(id) => id.0,
            GameWinner::Draw => DRAW_SENTINEL.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results and statistics
// ---------------------------------------------------------------------------

/// The record of one finished round, appended to the game's result list and
/// echoed back inside `GAME_OVER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub word: Word,
    pub color: Color,
    pub winner: RoundWinner,
    pub latency_ms: u64,
}

/// Per-player aggregates computed over a game's round results.
///
/// `avg_latency` is integer milliseconds (`total_latency / wins`), and zero
/// for a player with no wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub wins: u32,
    pub total_latency: u64,
    pub avg_latency: u64,
}

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    /// All rounds were played to completion.
    GameCompleted,
    /// A player's connection dropped mid-game; the survivor wins.
    OpponentDisconnected,
}

// =========================================================================
// Tests
// =========================================================================
