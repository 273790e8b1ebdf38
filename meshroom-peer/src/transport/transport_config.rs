use meshroom_core::IceServerConfig;
use std::time::Duration;

/// Settings for WebRTC connections.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: IceServerConfig::defaults(),
        }
    }
}

/// Settings for the WebSocket connection to the relay.
#[derive(Debug, Clone)]
pub struct RelayClientConfig {
    pub url: String,
    /// Keep-alive period; intermediate proxies drop idle sockets.
    pub ping_interval: Duration,
}

impl RelayClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ping_interval: Duration::from_secs(30),
        }
    }
}
