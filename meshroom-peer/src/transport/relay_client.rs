use crate::error::TransportError;
use crate::transport::{RelayClientConfig, SignalingTransport};
use futures::{SinkExt, StreamExt};
use meshroom_core::{Envelope, PeerId, RelayRequest};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// WebSocket connection to a meshroom relay.
///
/// Outbound frames are queued and written by a background task in the order
/// they were sent; inbound text frames are handed out on the receiver
/// returned by [`RelayClient::connect`].
pub struct RelayClient {
    outbound: mpsc::UnboundedSender<RelayRequest>,
}

impl RelayClient {
    pub async fn connect(
        config: RelayClientConfig,
    ) -> Result<(Self, mpsc::Receiver<String>), TransportError> {
        let (ws_stream, _) = connect_async(config.url.as_str())
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))?;
        info!("Connected to relay at {}", config.url);

        let (mut sender, mut receiver) = ws_stream.split();
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<RelayRequest>();
        let (inbound_tx, inbound_rx) = mpsc::channel::<String>(256);

        tokio::spawn(async move {
            // The first tick is delayed so the join frame always goes out first.
            let mut ping = time::interval_at(
                Instant::now() + config.ping_interval,
                config.ping_interval,
            );

            loop {
                let request = tokio::select! {
                    request = outbound_rx.recv() => match request {
                        Some(request) => request,
                        None => break,
                    },
                    _ = ping.tick() => RelayRequest::Ping,
                };

                let json = match serde_json::to_string(&request) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize relay frame: {}", e);
                        continue;
                    }
                };

                if let Err(e) = sender.send(Message::Text(json.into())).await {
                    warn!("Relay socket closed while sending: {}", e);
                    break;
                }
            }
        });

        tokio::spawn(async move {
            while let Some(msg) = receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        if inbound_tx.send(text.to_string()).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Relay socket error: {}", e);
                        break;
                    }
                }
            }
            debug!("Relay reader finished");
        });

        Ok((Self { outbound }, inbound_rx))
    }

    fn send(&self, request: RelayRequest) -> Result<(), TransportError> {
        self.outbound
            .send(request)
            .map_err(|_| TransportError::Closed)
    }
}

impl SignalingTransport for RelayClient {
    fn join(&self, room: &str) -> Result<(), TransportError> {
        self.send(RelayRequest::Room {
            name: room.to_owned(),
        })
    }

    fn send_to(&self, target: &PeerId, envelope: Envelope) -> Result<(), TransportError> {
        self.send(RelayRequest::Forward {
            to: target.clone(),
            envelope,
        })
    }
}
