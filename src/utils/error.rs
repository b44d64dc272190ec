//! Error types for the broker and the producer trigger client.
//!
//! Transport failures are not modeled here: the broker treats a broken
//! connection as an implicit disconnect and handles it in-line, inside the
//! connection's own task. The types below cover the two failure classes that
//! cross a boundary: protocol violations contained to a single connection,
//! and producer delivery failures surfaced to the caller only as `false`.

use thiserror::Error;

/// A violation of the wire protocol by one connection.
///
/// Never fatal to the broker process: an unparseable envelope closes the
/// offending connection, an unexpected kind is logged and ignored, and other
/// sessions are unaffected either way.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unexpected inbound envelope kind `{0}`")]
    UnexpectedKind(&'static str),
}

/// A failure to hand an envelope to the broker from the trigger client.
///
/// Callers of the trigger client never see this type; it is logged at the
/// client boundary and collapsed into a boolean, the notification path is
/// advisory by design.
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("websocket error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
}
