use futures_util::SinkExt;
use tokio_tungstenite::connect_async;
use tracing::warn;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::envelope::Envelope;
use crate::utils::error::TriggerError;

/// Fire-and-forget producer client for pushing envelopes into the broker.
///
/// Each call opens a fresh connection to the broker's well-known trigger
/// address, sends exactly one envelope, and closes; no acknowledgment is
/// awaited beyond the handshake. The result is a plain boolean: `true` once
/// the envelope has been handed to the transport, `false` on any connection
/// or send failure. Calls never return an error to the caller; the whole
/// channel is advisory and the report pipeline must succeed without it.
///
/// Concurrent calls all register under the shared trigger id and collide
/// under the registry's last-writer-wins rule; harmless for send-only
/// connections, but a reason to keep producer traffic on this client rather
/// than long-lived sessions.
pub struct TriggerClient {
    url: String,
}

impl TriggerClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Broadcasts a user-visible notification to `channel` ("all" for every
    /// session). `category` is a UI hint such as "info" or "success".
    pub async fn send_notification(&self, message: &str, channel: &str, category: &str) -> bool {
        self.submit(Envelope::notification(message, channel, category))
            .await
    }

    /// Asks subscribers of `channel` to reload their view.
    pub async fn trigger_refresh(&self, channel: &str) -> bool {
        self.submit(Envelope::refresh(channel)).await
    }

    /// Pushes a data payload at the named UI `target` for `channel`.
    pub async fn send_data_update(
        &self,
        data: serde_json::Value,
        target: &str,
        channel: &str,
    ) -> bool {
        self.submit(Envelope::data_update(data, target, channel))
            .await
    }

    async fn submit(&self, envelope: Envelope) -> bool {
        match self.try_submit(&envelope).await {
            Ok(()) => true,
            Err(e) => {
                warn!(kind = envelope.kind(), "trigger delivery failed: {e}");
                false
            }
        }
    }

    // One connect-send-close cycle per envelope; no pooling or reuse
    async fn try_submit(&self, envelope: &Envelope) -> Result<(), TriggerError> {
        let text = serde_json::to_string(envelope)?;
        let (mut ws, _) = connect_async(self.url.as_str()).await?;
        ws.send(WsMessage::text(text)).await?;
        let _ = ws.close(None).await;
        Ok(())
    }
}

impl Default for TriggerClient {
    fn default() -> Self {
        Self::new(crate::config::Settings::default().trigger.url)
    }
}

/// Blocking wrapper over [`TriggerClient`] for synchronous report code.
///
/// Each call builds a throwaway current-thread runtime and blocks until the
/// connect-send-close cycle finishes or fails, so every call pays the full
/// connection-setup cost. A runtime that fails to build is treated like any
/// other delivery failure and reported as `false`.
pub struct TriggerClientSync {
    inner: TriggerClient,
}

impl TriggerClientSync {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            inner: TriggerClient::new(url),
        }
    }

    pub fn send_notification(&self, message: &str, channel: &str, category: &str) -> bool {
        self.block_on(self.inner.send_notification(message, channel, category))
    }

    pub fn trigger_refresh(&self, channel: &str) -> bool {
        self.block_on(self.inner.trigger_refresh(channel))
    }

    pub fn send_data_update(&self, data: serde_json::Value, target: &str, channel: &str) -> bool {
        self.block_on(self.inner.send_data_update(data, target, channel))
    }

    fn block_on<F: Future<Output = bool>>(&self, fut: F) -> bool {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(fut),
            Err(e) => {
                warn!("failed to build trigger runtime: {e}");
                false
            }
        }
    }
}

impl Default for TriggerClientSync {
    fn default() -> Self {
        Self {
            inner: TriggerClient::default(),
        }
    }
}
