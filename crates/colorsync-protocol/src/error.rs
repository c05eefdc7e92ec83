//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a frame into JSON text).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown frame type, or a
    /// payload that doesn't match the frame's table entry.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
