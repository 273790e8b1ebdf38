use crate::model::envelope::Envelope;
use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

/// Frames a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayRequest {
    /// Join a room. Must be the first frame on a connection.
    Room { name: String },

    /// Deliver `envelope` verbatim to the member addressed by `to`.
    Forward { to: PeerId, envelope: Envelope },

    /// Keeps idle connections open through proxies.
    Ping,
}
