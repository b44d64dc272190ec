//! The `trigger` module is the producer-facing side of the notification layer.
//!
//! Report pipelines run synchronously and must never block on, or fail
//! because of, notification delivery. `TriggerClient` submits one envelope
//! per short-lived connection and reports only a boolean;
//! `TriggerClientSync` wraps it for callers without an async runtime.

pub mod client;
pub use client::{TriggerClient, TriggerClientSync};

#[cfg(test)]
mod tests;
