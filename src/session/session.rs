use chrono::{DateTime, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;

/// The server-side record of one live client connection.
///
/// A session is keyed by its caller-supplied `id` (taken from the
/// `/ws/{client_id}` connection path) and exclusively owns the sending side
/// of the per-connection channel the broker uses to push messages. The
/// session exists in the registry exactly as long as its transport is open.
#[derive(Debug)]
pub struct Session {
    /// Caller-supplied identifier; not validated for uniqueness.
    pub id: String,

    /// Channel into the connection's outbound forwarding task.
    pub sender: UnboundedSender<WsMessage>,

    /// When the connection handshake completed.
    pub connected_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: String, sender: UnboundedSender<WsMessage>) -> Self {
        Self {
            id,
            sender,
            connected_at: Utc::now(),
        }
    }
}
