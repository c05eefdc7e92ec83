//! Wire protocol for ColorSync.
//!
//! This crate defines the "language" the services and clients speak:
//!
//! - **Types** ([`PlayerId`], [`RoomId`], [`Color`], [`Word`],
//!   [`RoundResult`], …) — the data model that appears in HTTP bodies and
//!   WebSocket payloads.
//! - **Frames** ([`ServerFrame`], [`ClientFrame`]) — the closed set of
//!   `{type, payload}` messages that travel over a game connection, with
//!   [`encode_frame`] / [`decode_frame`] helpers.
//! - **Errors** ([`ProtocolError`]) — what can go wrong at the codec
//!   boundary.
//!
//! The protocol layer knows nothing about connections, rooms, or games — it
//! only knows how messages look as JSON.

mod error;
mod frames;
mod types;

pub use error::ProtocolError;
pub use frames::{decode_frame, encode_frame, ClientFrame, ServerFrame};
pub use types::{
    Color, GameOverReason, GameWinner, PlayerId, PlayerStats, RoomId, RoundResult, RoundWinner,
    Word,
};
