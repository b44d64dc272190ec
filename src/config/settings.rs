use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the server, the broker, and the producer trigger
/// client.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub broker: BrokerSettings,
    pub trigger: TriggerSettings,
}

/// Configuration settings for the server.
///
/// Defines the host and port the WebSocket listener will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Configuration settings for the broker.
///
/// `max_connections` bounds the registry; a handshake past the bound is
/// rejected. `idle_timeout_secs` bounds how long a silent connection may
/// occupy a registry slot before it is closed.
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerSettings {
    pub max_connections: usize,
    pub idle_timeout_secs: u64,
}

/// Configuration settings for the producer trigger client.
///
/// `url` is the broker's well-known trigger address that report pipelines
/// submit envelopes to.
#[derive(Debug, Deserialize, Clone)]
pub struct TriggerSettings {
    pub url: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub broker: Option<PartialBrokerSettings>,
    pub trigger: Option<PartialTriggerSettings>,
}

/// Partial server settings.
#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Partial broker settings.
#[derive(Debug, Deserialize)]
pub struct PartialBrokerSettings {
    pub max_connections: Option<usize>,
    pub idle_timeout_secs: Option<u64>,
}

/// Partial trigger settings.
#[derive(Debug, Deserialize)]
pub struct PartialTriggerSettings {
    pub url: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8000,
            },
            broker: BrokerSettings {
                max_connections: 1000,
                idle_timeout_secs: 300,
            },
            trigger: TriggerSettings {
                url: "ws://127.0.0.1:8000/ws/trigger".to_string(),
            },
        }
    }
}
