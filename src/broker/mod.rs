pub mod engine;
pub mod envelope;
pub mod registry;
pub mod subscriptions;

pub use engine::Broker;
