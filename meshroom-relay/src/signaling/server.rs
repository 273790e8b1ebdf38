use crate::relay_config::RelayConfig;
use crate::signaling::{RelayService, ws_handler};
use anyhow::Context;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

/// Routes served by the relay. Members connect with a WebSocket upgrade on
/// `GET /connect`.
pub fn router(service: RelayService) -> Router {
    Router::new()
        .route("/connect", get(ws_handler))
        .with_state(service)
}

pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind relay to {}", config.bind))?;
    info!("Relay listening on ws://{}/connect", config.bind);

    serve_on(listener, RelayService::new()).await
}

pub async fn serve_on(listener: TcpListener, service: RelayService) -> anyhow::Result<()> {
    axum::serve(listener, router(service))
        .await
        .context("relay server stopped")
}
