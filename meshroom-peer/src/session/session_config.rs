use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Room path sent in the join, e.g. `/room/standup`.
    pub room: String,
    /// How long a peer may stay short of connected before it is dropped.
    /// `None` waits forever.
    pub negotiation_timeout: Option<Duration>,
    pub sweep_interval: Duration,
}

impl SessionConfig {
    pub fn new(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            ..Self::default()
        }
    }

    pub fn random_room() -> Self {
        Self::new(format!("/room/{}", Uuid::new_v4().simple()))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            room: "/room/lobby".to_string(),
            negotiation_timeout: Some(Duration::from_secs(30)),
            sweep_interval: Duration::from_secs(1),
        }
    }
}
