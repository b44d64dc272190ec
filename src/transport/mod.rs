//! The `transport` module is responsible for handling network communication
//! with clients via WebSockets.
//!
//! It implements the WebSocket server itself: the `/ws/{client_id}` handshake,
//! the per-connection receive loop with its idle timeout, wire parsing, and
//! forwarding of parsed envelopes to the broker.

pub mod websocket;
