use serde::{Deserialize, Serialize};

/// STUN servers used when nothing else is configured.
pub const DEFAULT_STUN_SERVERS: [&str; 2] = [
    "stun:stun.services.mozilla.com",
    "stun:stun.l.google.com:19302",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn defaults() -> Vec<Self> {
        DEFAULT_STUN_SERVERS.iter().map(|url| Self::stun(*url)).collect()
    }
}
