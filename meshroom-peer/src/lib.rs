//! Peer side of a meshroom call: keeps one media connection per room member
//! and drives offer/answer/candidate exchange with each of them through the
//! signaling relay.

mod error;
mod negotiator;
mod presence;
mod registry;
mod router;
mod session;
mod transport;

pub use error::*;
pub use negotiator::*;
pub use presence::*;
pub use registry::*;
pub use router::*;
pub use session::*;
pub use transport::*;

pub use meshroom_core::{Envelope, IceCandidate, IceServerConfig, PeerBody, PeerId};
