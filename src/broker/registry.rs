use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tungstenite::protocol::Message as WsMessage;

use crate::session::Session;

pub type ClientId = String;

/// The set of currently connected sessions, keyed by client identifier.
///
/// The registry exclusively owns each session's transport handle. Registering
/// an id that is already present replaces the prior entry (last-writer-wins);
/// the superseded transport is not closed by the registry, its connection
/// task simply no longer receives broker traffic.
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<ClientId, Session>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Inserts or replaces the session for its id.
    pub fn register(&mut self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    /// Deletes the session if present; a no-op otherwise.
    pub fn remove(&mut self, id: &str) {
        self.sessions.remove(id);
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// A stabilized copy of every `(id, sender)` pair, for broadcast.
    ///
    /// Broadcast iterates this copy rather than the live map so that a
    /// send-triggered disconnect (which mutates the registry) cannot corrupt
    /// the traversal. Order is unspecified; there is no cross-recipient
    /// ordering guarantee.
    pub fn snapshot(&self) -> Vec<(ClientId, UnboundedSender<WsMessage>)> {
        self.sessions
            .iter()
            .map(|(id, session)| (id.clone(), session.sender.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
