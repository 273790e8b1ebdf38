use crate::error::TransportError;
use crate::presence::Outbox;
use crate::registry::PeerRegistry;
use crate::transport::{PeerObserver, SignalingTransport};
use meshroom_core::PeerId;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reacts to room membership and owns our relay-assigned identity.
pub struct PresenceController {
    room: String,
    joined: bool,
    outbox: Outbox,
    observer: Arc<dyn PeerObserver>,
}

impl PresenceController {
    pub fn new(
        room: impl Into<String>,
        transport: Arc<dyn SignalingTransport>,
        observer: Arc<dyn PeerObserver>,
    ) -> Self {
        Self {
            room: room.into(),
            joined: false,
            outbox: Outbox::new(transport),
            observer,
        }
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn has_joined(&self) -> bool {
        self.joined
    }

    pub fn local_identity(&self) -> Option<&PeerId> {
        self.outbox.local_identity()
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn outbox_mut(&mut self) -> &mut Outbox {
        &mut self.outbox
    }

    pub fn observer(&self) -> &dyn PeerObserver {
        self.observer.as_ref()
    }

    /// Send the room join. Call once local media is ready and the relay
    /// connection is open; it has to be the first frame on the connection.
    pub fn on_room_join_required(&mut self) -> Result<bool, TransportError> {
        if self.joined {
            debug!("Already joined {}", self.room);
            return Ok(false);
        }

        info!("Joining room {}", self.room);
        self.outbox.transport().join(&self.room)?;
        self.joined = true;
        Ok(true)
    }

    pub fn assign_identity(&mut self, identity: PeerId) {
        match self.outbox.local_identity() {
            None => {
                info!("Relay assigned us {}", identity);
                self.outbox.assign(identity);
            }
            Some(current) if *current == identity => {
                debug!("Duplicate identity assignment {}", identity);
            }
            Some(current) => {
                warn!(
                    "Ignoring identity {} from relay, already known as {}",
                    identity, current
                );
            }
        }
    }

    /// A member joined the room after us; we make the first move.
    pub fn on_peer_added(&mut self, peer: &PeerId, registry: &mut PeerRegistry) {
        if self.local_identity() == Some(peer) {
            debug!("Ignoring add for ourselves");
            return;
        }
        if registry.contains(peer) {
            debug!("Ignoring duplicate add for {}", peer);
            return;
        }

        info!("Peer {} joined {}", peer, self.room);
        registry.get_or_create(peer).negotiator_mut().initiate();
    }

    pub fn on_peer_removed(&mut self, peer: &PeerId, registry: &mut PeerRegistry) {
        if registry.remove(peer) {
            info!("Peer {} left {}", peer, self.room);
            self.observer.on_peer_left(peer);
        } else {
            debug!("Ignoring remove for unknown peer {}", peer);
        }
    }

    pub fn on_connection_lost(&mut self, peer: &PeerId, registry: &mut PeerRegistry) {
        let announced = registry.get(peer).is_some_and(|entry| entry.is_announced());
        if !registry.remove(peer) {
            return;
        }

        if announced {
            warn!("Dropped connection to {}", peer);
            self.observer.on_peer_left(peer);
        } else {
            debug!("Discarded connection to {} that never negotiated", peer);
        }
    }

    /// Offer collision rule: the side with the greater identity yields and
    /// answers; the other keeps its own offer.
    pub fn is_polite_towards(&self, remote: &PeerId) -> bool {
        match self.local_identity() {
            Some(local) => local > remote,
            None => true,
        }
    }
}
