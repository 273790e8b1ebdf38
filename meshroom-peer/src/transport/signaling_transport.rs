use crate::error::TransportError;
use meshroom_core::{Envelope, PeerId};

/// Outbound half of the channel to the signaling relay.
///
/// Sends only enqueue, so they are safe to call from inside a dispatch turn.
/// Inbound frames reach the session as raw text on an mpsc channel.
pub trait SignalingTransport: Send + Sync {
    /// Ask the relay to put this connection into `room`.
    fn join(&self, room: &str) -> Result<(), TransportError>;

    /// Deliver `envelope` to `target` through the relay.
    fn send_to(&self, target: &PeerId, envelope: Envelope) -> Result<(), TransportError>;
}
