//! End-to-end tests: real relay server, real WebSocket clients.


use meshroom_core::Envelope;
use meshroom_relay::{RelayService, serve_on};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Start a relay on an ephemeral port and return its connect URL.
pub async fn start_relay() -> (String, RelayService) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");
    let service = RelayService::new();

    tokio::spawn(serve_on(listener, service.clone()));

    (format!("ws://{addr}/connect"), service)
}

pub async fn next_envelope(rx: &mut mpsc::Receiver<String>) -> Envelope {
    let text = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("Timed out waiting for relay frame")
        .expect("Relay connection closed");
    serde_json::from_str(&text).expect("Relay sent an invalid envelope")
}
