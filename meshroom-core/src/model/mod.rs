mod envelope;
mod peer;
mod relay;
mod signaling;

pub use envelope::{Envelope, IceCandidate, PeerBody, SdpType, SessionDescription};
pub use peer::PeerId;
pub use relay::RelayRequest;
pub use signaling::{DEFAULT_STUN_SERVERS, IceServerConfig};
