use crate::error::RouteError;
use crate::presence::PresenceController;
use crate::registry::PeerRegistry;
use meshroom_core::{Envelope, PeerBody, PeerId};
use serde_json::Value;
use tracing::{debug, info, warn};

const KNOWN_TYPES: [&str; 4] = ["you", "add", "remove", "peer"];

/// Turns relay frames into presence and negotiation actions.
#[derive(Debug, Default)]
pub struct MessageRouter {
    dropped: usize,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames rejected so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn classify(text: &str) -> Result<Envelope, RouteError> {
        let value: Value = serde_json::from_str(text)?;

        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(RouteError::MissingType)?
            .to_owned();

        if !KNOWN_TYPES.contains(&tag.as_str()) {
            return Err(RouteError::UnknownType(tag));
        }

        serde_json::from_value(value).map_err(|source| RouteError::Malformed { tag, source })
    }

    pub fn route(
        &mut self,
        text: &str,
        presence: &mut PresenceController,
        registry: &mut PeerRegistry,
    ) {
        match Self::classify(text) {
            Ok(envelope) => self.dispatch(envelope, presence, registry),
            Err(e) => {
                self.dropped += 1;
                warn!("Dropping relay frame: {}", e);
            }
        }
    }

    pub fn dispatch(
        &mut self,
        envelope: Envelope,
        presence: &mut PresenceController,
        registry: &mut PeerRegistry,
    ) {
        match envelope {
            Envelope::You { url } => presence.assign_identity(url),
            Envelope::Add { url } => presence.on_peer_added(&url, registry),
            Envelope::Remove { url } => presence.on_peer_removed(&url, registry),
            Envelope::Peer { url, body } => {
                if presence.local_identity() == Some(&url) {
                    self.dropped += 1;
                    warn!("Dropping {} that claims to come from us", body.kind());
                    return;
                }
                route_peer_body(url, body, presence, registry);
            }
        }
    }
}

fn route_peer_body(
    from: PeerId,
    body: PeerBody,
    presence: &mut PresenceController,
    registry: &mut PeerRegistry,
) {
    match body {
        PeerBody::Offer { sdp } => {
            let colliding = registry
                .get(&from)
                .is_some_and(|entry| entry.state().has_local_offer());

            let entry = if colliding {
                if presence.is_polite_towards(&from) {
                    info!("Offer collision with {}, rolling back our offer", from);
                    registry.replace(&from)
                } else {
                    info!("Offer collision with {}, keeping our offer", from);
                    return;
                }
            } else {
                registry.get_or_create(&from)
            };

            entry.negotiator_mut().handle_offer(sdp);
        }

        PeerBody::Answer { sdp } => {
            registry.get_or_create(&from).negotiator_mut().handle_answer(sdp);
        }

        PeerBody::Candidate(candidate) => {
            debug!("Candidate from {}", from);
            registry
                .get_or_create(&from)
                .negotiator_mut()
                .handle_candidate(candidate);
        }

        // Chat never opens a connection.
        PeerBody::Chat { message } => {
            debug!("Chat from {}", from);
            presence.observer().on_chat(&from, &message);
        }
    }
}
