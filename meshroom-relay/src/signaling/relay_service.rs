use crate::room::{Departure, RoomRegistry};
use dashmap::DashMap;
use meshroom_core::{Envelope, PeerId, RelayRequest};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

struct RelayInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<String>>,
    rooms: RoomRegistry,
}

/// Connected members and the rooms they are in.
///
/// Each member is represented by the sender half of its socket writer;
/// everything written to it is a complete JSON text frame.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RelayInner {
                peers: DashMap::new(),
                rooms: RoomRegistry::new(),
            }),
        }
    }

    /// Register a new connection under a freshly generated identity.
    pub fn connect(&self, tx: mpsc::UnboundedSender<String>) -> PeerId {
        let peer_id = PeerId::random();
        self.add_peer(peer_id.clone(), tx);
        peer_id
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<String>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn is_connected(&self, peer_id: &PeerId) -> bool {
        self.inner.peers.contains_key(peer_id)
    }

    pub fn room_members(&self, room: &str) -> Vec<PeerId> {
        self.inner.rooms.members(room)
    }

    pub fn room_of(&self, peer_id: &PeerId) -> Option<String> {
        self.inner.rooms.room_of(peer_id)
    }

    pub fn handle_text(&self, peer_id: &PeerId, text: &str) {
        match serde_json::from_str::<RelayRequest>(text) {
            Ok(request) => self.handle_request(peer_id, request),
            Err(e) => warn!("Invalid relay frame from {}: {}", peer_id, e),
        }
    }

    pub fn handle_request(&self, peer_id: &PeerId, request: RelayRequest) {
        match request {
            RelayRequest::Room { name } => self.join(peer_id, &name),
            RelayRequest::Forward { to, envelope } => self.forward(peer_id, &to, &envelope),
            RelayRequest::Ping => debug!("Ping from {}", peer_id),
        }
    }

    /// Tell the member who it is, then announce it to the rest of the room.
    pub fn join(&self, peer_id: &PeerId, room: &str) {
        info!("Peer {} joins room {}", peer_id, room);

        self.send_envelope(
            peer_id,
            &Envelope::You {
                url: peer_id.clone(),
            },
        );

        let outcome = self.inner.rooms.join(peer_id, room);
        if let Some(departure) = outcome.left {
            self.announce_departure(peer_id, departure);
        }

        let announcement = Envelope::Add {
            url: peer_id.clone(),
        };
        for member in outcome.existing {
            self.send_envelope(&member, &announcement);
        }
    }

    pub fn leave(&self, peer_id: &PeerId) {
        if let Some(departure) = self.inner.rooms.leave(peer_id) {
            info!("Peer {} leaves room {}", peer_id, departure.room);
            self.announce_departure(peer_id, departure);
        }
    }

    pub fn disconnect(&self, peer_id: &PeerId) {
        self.leave(peer_id);
        self.inner.peers.remove(peer_id);
    }

    /// Pass a peer envelope through unchanged. The envelope must name its
    /// actual sender.
    pub fn forward(&self, from: &PeerId, to: &PeerId, envelope: &Envelope) {
        match envelope {
            Envelope::Peer { url, .. } if url == from => {}
            _ => {
                warn!("Refusing to forward envelope from {} to {}", from, to);
                return;
            }
        }

        if !self.is_connected(to) {
            warn!("Dropping envelope from {} for unknown peer {}", from, to);
            return;
        }

        self.send_envelope(to, envelope);
    }

    fn announce_departure(&self, peer_id: &PeerId, departure: Departure) {
        let announcement = Envelope::Remove {
            url: peer_id.clone(),
        };
        for member in departure.remaining {
            self.send_envelope(&member, &announcement);
        }
    }

    pub fn send_envelope(&self, peer_id: &PeerId, envelope: &Envelope) {
        if let Some(peer) = self.inner.peers.get(peer_id) {
            match serde_json::to_string(envelope) {
                Ok(json) => {
                    if let Err(e) = peer.send(json) {
                        error!("Failed to send WS message to {}: {:?}", peer_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize envelope: {}", e),
            }
        } else {
            warn!("Attempted to send envelope to disconnected peer {}", peer_id);
        }
    }
}
