use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use tungstenite::protocol::Message as WsMessage;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::broker::Broker;
use crate::broker::envelope::{Envelope, KNOWN_KINDS};
use crate::config::Settings;
use crate::session::Session;
use crate::utils::error::ProtocolError;

/// Accepts WebSocket connections and runs one task per connection against the
/// shared broker.
///
/// Clients address themselves by connecting to `/ws/{client_id}`; the id is
/// caller-supplied and not validated for uniqueness, so two connections with
/// the same id collide under the registry's last-writer-wins rule. Producer
/// trigger calls arrive on the same listener under the well-known
/// `/ws/trigger` path and are ordinary sessions from the broker's point of
/// view.
pub async fn start_websocket_server(addr: &str, broker: Arc<Mutex<Broker>>, settings: Settings) {
    let listener = TcpListener::bind(addr).await.expect("Can't bind");

    info!("WebSocket server listening on ws://{addr}");

    while let Ok((stream, _)) = listener.accept().await {
        let broker = broker.clone();
        let settings = settings.clone();
        tokio::spawn(handle_connection(stream, broker, settings));
    }
}

/// Lifecycle of one connection: handshake, register, receive loop, cleanup.
///
/// Every exit path out of the receive loop, peer close, transport error,
/// idle timeout, or protocol violation, ends in the broker's single
/// `disconnect` cleanup. The connection is terminal after that; a client
/// reconnects by opening a new one.
async fn handle_connection(stream: TcpStream, broker: Arc<Mutex<Broker>>, settings: Settings) {
    let at_capacity = {
        let broker = broker.lock().unwrap();
        broker.session_count() >= settings.broker.max_connections
    };

    let mut path_id: Option<String> = None;
    let callback = |req: &Request, response: Response| {
        if at_capacity {
            let mut resp = ErrorResponse::new(Some("session limit reached".to_string()));
            *resp.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
            return Err(resp);
        }
        path_id = client_id_from_path(req.uri().path());
        Ok(response)
    };

    let ws_stream = match accept_hdr_async(stream, callback).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!("WebSocket handshake failed: {e}");
            return;
        }
    };

    let client_id = path_id.unwrap_or_else(|| format!("client-{}", uuid::Uuid::new_v4()));

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Channel the broker writes into; the forward task drains it to the socket
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();

    {
        let mut broker = broker.lock().unwrap();
        broker.register_session(Session::new(client_id.clone(), tx));
    }

    let forward_id = client_id.clone();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sender.send(msg).await {
                debug!(client_id = %forward_id, "send loop closed: {e}");
                break;
            }
        }
    });

    let idle = Duration::from_secs(settings.broker.idle_timeout_secs);

    loop {
        let frame = match timeout(idle, ws_receiver.next()).await {
            Err(_) => {
                info!(%client_id, "closing idle connection");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                debug!(%client_id, "transport error: {e}");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        if frame.is_close() {
            break;
        }
        if !frame.is_text() {
            continue;
        }
        let Ok(text) = frame.to_text() else { continue };

        match parse_envelope(text) {
            Ok(Some(envelope)) => {
                let result = broker.lock().unwrap().dispatch(&client_id, envelope);
                if let Err(e) = result {
                    warn!(%client_id, "ignoring envelope: {e}");
                }
            }
            Ok(None) => {
                warn!(%client_id, "ignoring envelope of unrecognized kind");
            }
            Err(e) => {
                warn!(%client_id, "closing connection: {e}");
                break;
            }
        }
    }

    info!(%client_id, "connection closed");

    {
        let mut broker = broker.lock().unwrap();
        broker.disconnect(&client_id);
    }
}

/// Parses one inbound text frame.
///
/// `Ok(Some(_))` is a well-formed envelope, `Ok(None)` is valid JSON whose
/// kind tag is outside the protocol (ignored, connection stays open), and
/// `Err(_)` is a malformed payload that closes the connection.
pub(crate) fn parse_envelope(text: &str) -> Result<Option<Envelope>, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let known = value
        .get("type")
        .and_then(|kind| kind.as_str())
        .map(|kind| KNOWN_KINDS.contains(&kind));
    match known {
        Some(true) => Ok(Some(serde_json::from_value::<Envelope>(value)?)),
        Some(false) => Ok(None),
        // No string kind tag at all: malformed
        None => Ok(serde_json::from_value::<Envelope>(value).map(Some)?),
    }
}

/// Extracts the caller-supplied client id from a `/ws/{client_id}` path.
pub(crate) fn client_id_from_path(path: &str) -> Option<String> {
    path.strip_prefix("/ws/")
        .map(|rest| rest.trim_end_matches('/'))
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}
