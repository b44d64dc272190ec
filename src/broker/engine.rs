use serde_json::json;
use tracing::{debug, error, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::envelope::{CHANNEL_ALL, Envelope};
use crate::broker::registry::Registry;
use crate::broker::subscriptions::SubscriptionIndex;
use crate::session::Session;
use crate::utils::error::ProtocolError;

/// Computes the payload of a `data_response`; owned by the report layer.
pub type DataProvider = Box<dyn Fn(serde_json::Value) -> serde_json::Value + Send>;

/// The connection broker: composes the session registry and the subscription
/// index, dispatches inbound envelopes, and performs unicast and broadcast
/// delivery.
///
/// One `Broker` is constructed at process start and shared with every
/// connection task behind `Arc<Mutex<_>>`; all mutation of the registry and
/// the index happens under that lock. Per-envelope payloads are owned by the
/// task processing them and need no synchronization.
pub struct Broker {
    pub(crate) registry: Registry,
    pub(crate) subscriptions: SubscriptionIndex,
    data_provider: DataProvider,
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker {
    /// Creates a broker with an empty registry, an empty subscription index,
    /// and a placeholder data provider.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            subscriptions: SubscriptionIndex::new(),
            data_provider: Box::new(|_| json!({ "example": "data" })),
        }
    }

    /// Installs the report layer's `data_request` payload computation.
    pub fn set_data_provider(&mut self, provider: DataProvider) {
        self.data_provider = provider;
    }

    /// Records a newly opened connection. An id that is already registered
    /// is replaced, last writer wins; the superseded transport is left open.
    pub fn register_session(&mut self, session: Session) {
        debug!(client_id = %session.id, "session registered");
        self.registry.register(session);
    }

    /// The single cleanup path for a closed connection: drop the session and
    /// prune the id from every channel's member set, in that order. Every
    /// exit, transport error, close frame, idle timeout, or a failed send
    /// during broadcast, funnels through here.
    pub fn disconnect(&mut self, client_id: &str) {
        self.registry.remove(client_id);
        self.subscriptions.remove_everywhere(client_id);
        debug!(%client_id, "session disconnected");
    }

    pub fn session_count(&self) -> usize {
        self.registry.len()
    }

    /// Routes one inbound envelope from the connection identified by
    /// `client_id`.
    ///
    /// Client commands (`navigate`, `subscribe`, `data_request`) produce a
    /// unicast reply to the same session. Producer kinds (`notification`,
    /// `refresh`, `data_update`) are fanned out to their channel. Kinds the
    /// server itself originates are not valid inbound and are reported as a
    /// protocol error for the transport to log; the connection stays open.
    pub fn dispatch(&mut self, client_id: &str, envelope: Envelope) -> Result<(), ProtocolError> {
        match envelope {
            Envelope::Navigate { page } => {
                self.unicast(client_id, &Envelope::navigation(&page));
                Ok(())
            }
            Envelope::Subscribe { channel } => {
                self.subscriptions.subscribe(client_id, &channel);
                debug!(%client_id, %channel, "subscribed");
                self.unicast(client_id, &Envelope::subscription_ack(channel));
                Ok(())
            }
            Envelope::DataRequest { params } => {
                let data = (self.data_provider)(params);
                self.unicast(client_id, &Envelope::data_response(data));
                Ok(())
            }
            Envelope::Notification { .. } | Envelope::Refresh { .. } | Envelope::DataUpdate { .. } => {
                let channel = envelope
                    .channel()
                    .unwrap_or(CHANNEL_ALL)
                    .to_string();
                self.broadcast(&envelope, &channel);
                Ok(())
            }
            other => Err(ProtocolError::UnexpectedKind(other.kind())),
        }
    }

    /// Delivers one envelope to exactly one session. Returns `false` when the
    /// session is absent or its transport no longer accepts writes; cleanup
    /// of a dead transport is left to that connection's own task.
    pub fn unicast(&self, client_id: &str, envelope: &Envelope) -> bool {
        let Some(session) = self.registry.get(client_id) else {
            warn!(%client_id, kind = envelope.kind(), "unicast to unknown session");
            return false;
        };
        let text = match serde_json::to_string(envelope) {
            Ok(json) => json,
            Err(e) => {
                error!("failed to serialize envelope: {e}");
                return false;
            }
        };
        if let Err(e) = session.sender.send(WsMessage::text(text)) {
            warn!(%client_id, "failed to send to session: {e}");
            return false;
        }
        true
    }

    /// Delivers one envelope to every session addressed by `channel`.
    ///
    /// `"all"` reaches every registered session unconditionally; any other
    /// name reaches the channel's current member set. Delivery failures are
    /// isolated per recipient: a broken transport gets the standard
    /// disconnect cleanup and the fan-out continues, so one bad recipient
    /// never aborts delivery to the rest.
    pub fn broadcast(&mut self, envelope: &Envelope, channel: &str) {
        let text = match serde_json::to_string(envelope) {
            Ok(json) => json,
            Err(e) => {
                error!("failed to serialize envelope: {e}");
                return;
            }
        };

        if channel == CHANNEL_ALL {
            for (id, sender) in self.registry.snapshot() {
                if sender.send(WsMessage::text(text.clone())).is_err() {
                    warn!(client_id = %id, "dropping unreachable session during broadcast");
                    self.disconnect(&id);
                }
            }
            return;
        }

        for id in self.subscriptions.members_of(channel) {
            let sent = self
                .registry
                .get(&id)
                .map(|session| session.sender.send(WsMessage::text(text.clone())).is_ok());
            match sent {
                Some(true) => {}
                Some(false) => {
                    warn!(client_id = %id, %channel, "dropping unreachable session during broadcast");
                    self.disconnect(&id);
                }
                None => {
                    // Member without a live session; repair the index.
                    self.subscriptions.remove_everywhere(&id);
                }
            }
        }
    }
}
