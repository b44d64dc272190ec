use std::sync::{Arc, Mutex};

use dashpub::broker::Broker;
use dashpub::config::load_config;
use dashpub::transport::websocket::start_websocket_server;
use dashpub::utils::logging;

#[tokio::main]
async fn main() {
    logging::init("info");

    let settings = load_config().expect("Failed to load configuration");
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let broker = Arc::new(Mutex::new(Broker::new()));
    start_websocket_server(&addr, broker, settings).await;
}
