//! The WebSocket frame vocabulary.
//!
//! Every message on a game connection is a JSON object with a `type` string
//! and a `payload` object. Rather than transporting untyped maps and
//! narrowing them in each handler, the full table is modelled as two closed
//! enums — one per direction — so an unknown or malformed frame fails at the
//! decode boundary, once.
//!
//! Unknown *fields* inside a known payload are ignored on read and never
//! emitted on write; unknown frame *types* are a decode error the session
//! layer logs and drops.

use std::collections::HashMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    Color, GameOverReason, GameWinner, PlayerId, PlayerStats, ProtocolError, RoomId, RoundResult,
    RoundWinner, Word,
};

/// Frames the runtime sends to clients.
///
/// `#[serde(tag = "type", content = "payload")]` produces the adjacently
/// tagged shape the clients speak:
///
/// ```json
/// { "type": "ROUND_START", "payload": { "round": 1, "word": "RED", "color": "blue" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerFrame {
    /// Both players are connected; the round loop is about to begin.
    #[serde(rename = "GAME_START")]
    GameStart {
        room_id: RoomId,
        max_rounds: u32,
        players: Vec<PlayerId>,
    },

    /// A new Stroop prompt. The winning answer is `color`, not `word`.
    #[serde(rename = "ROUND_START")]
    RoundStart { round: u32, word: Word, color: Color },

    /// The round is settled: first correct click, or the timeout sentinel.
    #[serde(rename = "ROUND_RESULT")]
    RoundResult {
        round: u32,
        winner: RoundWinner,
        latency_ms: u64,
    },

    /// Unicast to a player who clicked the wrong color. They are locked out
    /// for the rest of the round; their opponent may still win it.
    #[serde(rename = "WRONG_ANSWER")]
    WrongAnswer {},

    /// The game is over. `stats` is present for a completed game and omitted
    /// when the game ended because a player disconnected.
    #[serde(rename = "GAME_OVER")]
    GameOver {
        reason: GameOverReason,
        winner: GameWinner,
        results: Vec<RoundResult>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stats: Option<HashMap<PlayerId, PlayerStats>>,
    },

    /// A request-scoped failure surfaced on the stream.
    #[serde(rename = "ERROR")]
    Error { message: String },

    /// Heartbeat reply.
    #[serde(rename = "PONG")]
    Pong {},
}

/// Frames clients send to the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientFrame {
    /// An answer attempt for the current round.
    #[serde(rename = "CLICK")]
    Click { answer: Color },

    /// Heartbeat.
    #[serde(rename = "PING")]
    Ping {},
}

/// Serializes a frame to the JSON text that goes into a WebSocket message.
pub fn encode_frame<T: Serialize>(frame: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(frame).map_err(ProtocolError::Encode)
}

/// Parses WebSocket message text into a frame.
///
/// Fails on unknown frame types as well as malformed JSON; callers decide
/// whether that is fatal (it never is for inbound client frames).
pub fn decode_frame<T: DeserializeOwned>(text: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! One shape test per frame variant: the client SDKs pattern-match on
    //! the exact `type` strings and payload fields, so these are pinned
    //! here rather than left to serde defaults.

    use super::*;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn test_game_start_json_shape() {
        let frame = ServerFrame::GameStart {
            room_id: RoomId::new("r1"),
            max_rounds: 5,
            players: vec![pid("alice"), pid("bob")],
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "GAME_START");
        assert_eq!(json["payload"]["room_id"], "r1");
        assert_eq!(json["payload"]["max_rounds"], 5);
        assert_eq!(json["payload"]["players"][0], "alice");
        assert_eq!(json["payload"]["players"][1], "bob");
    }

    #[test]
    fn test_round_start_json_shape() {
        let frame = ServerFrame::RoundStart {
            round: 1,
            word: Word::Red,
            color: Color::Blue,
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "ROUND_START");
        assert_eq!(json["payload"]["round"], 1);
        assert_eq!(json["payload"]["word"], "RED");
        assert_eq!(json["payload"]["color"], "blue");
    }

    #[test]
    fn test_round_result_with_player_winner() {
        let frame = ServerFrame::RoundResult {
            round: 1,
            winner: RoundWinner::Player(pid("alice")),
            latency_ms: 400,
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "ROUND_RESULT");
        assert_eq!(json["payload"]["winner"], "alice");
        assert_eq!(json["payload"]["latency_ms"], 400);
    }

    #[test]
    fn test_round_result_with_timeout_winner() {
        let frame = ServerFrame::RoundResult {
            round: 2,
            winner: RoundWinner::Timeout,
            latency_ms: 0,
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["payload"]["winner"], "timeout");
        assert_eq!(json["payload"]["latency_ms"], 0);
    }

    #[test]
    fn test_wrong_answer_has_empty_payload() {
        let json: serde_json::Value =
            serde_json::to_value(&ServerFrame::WrongAnswer {}).unwrap();

        assert_eq!(json["type"], "WRONG_ANSWER");
        assert_eq!(json["payload"], serde_json::json!({}));
    }

    #[test]
    fn test_game_over_with_stats() {
        let mut stats = HashMap::new();
        stats.insert(
            pid("alice"),
            PlayerStats {
                wins: 3,
                total_latency: 1200,
                avg_latency: 400,
            },
        );
        let frame = ServerFrame::GameOver {
            reason: GameOverReason::GameCompleted,
            winner: GameWinner::Player(pid("alice")),
            results: vec![],
            stats: Some(stats),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "GAME_OVER");
        assert_eq!(json["payload"]["reason"], "game_completed");
        assert_eq!(json["payload"]["winner"], "alice");
        assert_eq!(json["payload"]["stats"]["alice"]["wins"], 3);
        assert_eq!(json["payload"]["stats"]["alice"]["total_latency"], 1200);
        assert_eq!(json["payload"]["stats"]["alice"]["avg_latency"], 400);
    }

    #[test]
    fn test_game_over_without_stats_omits_field() {
        // The disconnect path has no meaningful aggregates; the field is
        // dropped entirely rather than sent as null.
        let frame = ServerFrame::GameOver {
            reason: GameOverReason::OpponentDisconnected,
            winner: GameWinner::Player(pid("bob")),
            results: vec![],
            stats: None,
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["payload"]["reason"], "opponent_disconnected");
        assert!(json["payload"].get("stats").is_none());
    }

    #[test]
    fn test_pong_round_trip() {
        let text = encode_frame(&ServerFrame::Pong {}).unwrap();
        let decoded: ServerFrame = decode_frame(&text).unwrap();
        assert_eq!(decoded, ServerFrame::Pong {});
    }

    #[test]
    fn test_error_frame_json_shape() {
        let frame = ServerFrame::Error {
            message: "game not found".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "ERROR");
        assert_eq!(json["payload"]["message"], "game not found");
    }

    #[test]
    fn test_click_decodes_from_client_json() {
        let frame: ClientFrame =
            decode_frame(r#"{"type":"CLICK","payload":{"answer":"blue"}}"#).unwrap();
        assert_eq!(frame, ClientFrame::Click { answer: Color::Blue });
    }

    #[test]
    fn test_ping_decodes_with_empty_payload() {
        let frame: ClientFrame = decode_frame(r#"{"type":"PING","payload":{}}"#).unwrap();
        assert_eq!(frame, ClientFrame::Ping {});
    }

    #[test]
    fn test_click_ignores_unknown_payload_fields() {
        let frame: ClientFrame = decode_frame(
            r#"{"type":"CLICK","payload":{"answer":"red","client_ts":123456}}"#,
        )
        .unwrap();
        assert_eq!(frame, ClientFrame::Click { answer: Color::Red });
    }

    #[test]
    fn test_unknown_frame_type_is_a_decode_error() {
        let result: Result<ClientFrame, _> =
            decode_frame(r#"{"type":"TELEPORT","payload":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_click_with_invalid_answer_is_a_decode_error() {
        let result: Result<ClientFrame, _> =
            decode_frame(r#"{"type":"CLICK","payload":{"answer":"purple"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let result: Result<ServerFrame, _> = decode_frame("not json at all");
        assert!(result.is_err());
    }
}
