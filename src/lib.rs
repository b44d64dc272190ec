//! # DashPub
//!
//! `dashpub` is the real-time notification layer for a suite of database
//! reporting dashboards. It runs a WebSocket broker that holds live client
//! sessions, groups them into named channels, and relays navigation replies,
//! subscription acks, and producer-originated notifications to the right
//! sessions. Report pipelines stay synchronous and push events through a
//! best-effort trigger client.
//!
//! ## Core Modules
//!
//! - `broker`: session registry, subscription index, envelope definition, and
//!   the dispatch/broadcast engine.
//! - `session`: the server-side record of one connected client.
//! - `config`: loading and merging of server, broker, and trigger settings.
//! - `transport`: the WebSocket server, connection lifecycle, and wire parsing.
//! - `trigger`: the producer-facing fire-and-forget client, with a blocking
//!   wrapper for synchronous report code.
//! - `utils`: shared error types and logging setup.

pub mod broker;
pub mod config;
pub mod session;
pub mod transport;
pub mod trigger;
pub mod utils;

#[cfg(test)]
mod tests;
