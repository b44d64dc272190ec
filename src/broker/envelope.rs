use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The channel name that addresses every registered session, subscribed or not.
pub const CHANNEL_ALL: &str = "all";

/// Every wire-level kind tag the protocol defines. Inbound text carrying a
/// `type` outside this set is logged and ignored rather than treated as a
/// malformed payload.
pub const KNOWN_KINDS: [&str; 9] = [
    "navigate",
    "subscribe",
    "data_request",
    "navigation",
    "subscription",
    "data_response",
    "notification",
    "refresh",
    "data_update",
];

/// One wire-level message exchanged between clients, the broker, and producers.
///
/// The envelope is an exhaustive tagged union over the closed set of message
/// kinds; the `type` field on the wire selects the variant. Anything outside
/// this set fails to deserialize and is handled as a protocol error by the
/// transport, it never reaches dispatch.
///
/// Client-originated kinds: `navigate`, `subscribe`, `data_request`.
/// Server/producer-originated kinds: `navigation`, `subscription`,
/// `data_response`, `notification`, `refresh`, `data_update`.
///
/// Timestamps are ISO-8601 (RFC 3339) strings, stamped when the envelope is
/// constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Client asks for the URL of a named report page.
    Navigate { page: String },

    /// Client joins a channel's subscriber set.
    Subscribe { channel: String },

    /// Client requests data; the payload shape is owned by the report layer.
    DataRequest {
        #[serde(flatten)]
        params: serde_json::Value,
    },

    /// Reply to `navigate`: the resolved page URL.
    Navigation { url: String, timestamp: String },

    /// Reply to `subscribe`.
    #[serde(rename = "subscription")]
    SubscriptionAck {
        status: String,
        channel: String,
        timestamp: String,
    },

    /// Reply to `data_request`.
    DataResponse {
        data: serde_json::Value,
        timestamp: String,
    },

    /// Producer-originated user-visible notification.
    Notification {
        message: String,
        channel: String,
        category: String,
        timestamp: String,
    },

    /// Producer-originated request that subscribers reload their view.
    Refresh { channel: String, timestamp: String },

    /// Producer-originated data push aimed at a named UI target.
    DataUpdate {
        data: serde_json::Value,
        target: String,
        channel: String,
        timestamp: String,
    },
}

impl Envelope {
    pub fn navigation(page: &str) -> Self {
        Envelope::Navigation {
            url: format!("/{}", page.replace(' ', "_")),
            timestamp: now_iso(),
        }
    }

    pub fn subscription_ack(channel: String) -> Self {
        Envelope::SubscriptionAck {
            status: "success".to_string(),
            channel,
            timestamp: now_iso(),
        }
    }

    pub fn data_response(data: serde_json::Value) -> Self {
        Envelope::DataResponse {
            data,
            timestamp: now_iso(),
        }
    }

    pub fn notification(message: &str, channel: &str, category: &str) -> Self {
        Envelope::Notification {
            message: message.to_string(),
            channel: channel.to_string(),
            category: category.to_string(),
            timestamp: now_iso(),
        }
    }

    pub fn refresh(channel: &str) -> Self {
        Envelope::Refresh {
            channel: channel.to_string(),
            timestamp: now_iso(),
        }
    }

    pub fn data_update(data: serde_json::Value, target: &str, channel: &str) -> Self {
        Envelope::DataUpdate {
            data,
            target: target.to_string(),
            channel: channel.to_string(),
            timestamp: now_iso(),
        }
    }

    /// The wire name of this envelope's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Navigate { .. } => "navigate",
            Envelope::Subscribe { .. } => "subscribe",
            Envelope::DataRequest { .. } => "data_request",
            Envelope::Navigation { .. } => "navigation",
            Envelope::SubscriptionAck { .. } => "subscription",
            Envelope::DataResponse { .. } => "data_response",
            Envelope::Notification { .. } => "notification",
            Envelope::Refresh { .. } => "refresh",
            Envelope::DataUpdate { .. } => "data_update",
        }
    }

    /// The delivery channel carried by producer-originated kinds.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Envelope::Notification { channel, .. }
            | Envelope::Refresh { channel, .. }
            | Envelope::DataUpdate { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

/// Current time as an ISO-8601 string, the timestamp format of the wire protocol.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
