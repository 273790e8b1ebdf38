use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind: SocketAddr,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}
