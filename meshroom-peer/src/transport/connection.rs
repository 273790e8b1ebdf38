use crate::error::ConnectionError;
use crate::transport::{ConnectionEvents, LocalMedia};
use async_trait::async_trait;
use meshroom_core::{IceCandidate, PeerId, SessionDescription};
use std::sync::Arc;

/// One media connection to one remote peer.
///
/// Every call is awaited by that peer's connection driver, one at a time, so
/// implementations never see overlapping negotiation steps.
#[async_trait]
pub trait PeerConnection: Send + Sync + 'static {
    /// Create a local offer, set it as the local description and return its SDP.
    async fn create_offer(&self) -> Result<String, ConnectionError>;

    /// Create a local answer, set it as the local description and return its SDP.
    async fn create_answer(&self) -> Result<String, ConnectionError>;

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), ConnectionError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), ConnectionError>;

    async fn close(&self) -> Result<(), ConnectionError>;
}

/// Builds connections with the local media attached.
///
/// Connections report candidates, remote tracks and state changes through
/// `events`; those reports are already tagged with the peer and epoch.
#[async_trait]
pub trait ConnectionFactory: Send + Sync + 'static {
    async fn connect(
        &self,
        peer: &PeerId,
        media: &LocalMedia,
        events: ConnectionEvents,
    ) -> Result<Arc<dyn PeerConnection>, ConnectionError>;
}
