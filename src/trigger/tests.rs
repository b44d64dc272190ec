use super::{TriggerClient, TriggerClientSync};
use serde_json::json;

// Nothing listens on port 9 locally, so every call sees a connect failure.
const UNREACHABLE: &str = "ws://127.0.0.1:9/ws/trigger";

#[tokio::test]
async fn test_unreachable_broker_returns_false() {
    let client = TriggerClient::new(UNREACHABLE);
    assert!(!client.send_notification("Data refreshed", "inventory", "success").await);
    assert!(!client.trigger_refresh("all").await);
    assert!(
        !client
            .send_data_update(json!({ "rows": 1 }), "inventory_table", "all")
            .await
    );
}

#[test]
fn test_sync_wrapper_never_panics_on_unreachable_broker() {
    let client = TriggerClientSync::new(UNREACHABLE);
    assert!(!client.send_notification("Data refreshed", "inventory", "success"));
    assert!(!client.trigger_refresh("all"));
    assert!(!client.send_data_update(json!({ "rows": 1 }), "inventory_table", "all"));
}
