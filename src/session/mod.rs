//! The `session` module defines the representation of a connected client.
//!
//! It provides the `Session` struct, which encapsulates the state of a single
//! live connection: the caller-supplied identifier, the channel for sending
//! messages to it, and the time the connection was established.

pub mod session;
pub use session::Session;
