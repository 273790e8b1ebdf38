use crate::negotiator::{NegotiationInput, NegotiationRole, NegotiationState};
use crate::presence::Outbox;
use crate::transport::{ConnectionHandle, NegotiationStep};
use meshroom_core::{IceCandidate, PeerBody, PeerId};
use tracing::{debug, info, warn};

/// Offer/answer state machine for one remote peer.
///
/// Owns the peer's connection handle. Inputs that are not valid for the
/// current state are logged and ignored.
#[derive(Debug)]
pub struct Negotiator {
    peer: PeerId,
    role: Option<NegotiationRole>,
    state: NegotiationState,
    connection: ConnectionHandle,
    /// Remote candidates that arrived before any remote description.
    pending_remote: Vec<IceCandidate>,
    /// Local candidates held back until our description went out.
    pending_local: Vec<IceCandidate>,
    remote_description_requested: bool,
    local_description_sent: bool,
}

impl Negotiator {
    pub fn new(peer: PeerId, connection: ConnectionHandle) -> Self {
        Self {
            peer,
            role: None,
            state: NegotiationState::New,
            connection,
            pending_remote: Vec::new(),
            pending_local: Vec::new(),
            remote_description_requested: false,
            local_description_sent: false,
        }
    }

    pub fn peer(&self) -> &PeerId {
        &self.peer
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn role(&self) -> Option<NegotiationRole> {
        self.role
    }

    /// Remote candidates waiting for a remote description.
    pub fn buffered_candidates(&self) -> usize {
        self.pending_remote.len()
    }

    fn transition(&mut self, input: NegotiationInput) -> bool {
        match self.state.next(input) {
            Some(next) => {
                if next != self.state {
                    debug!("Negotiation with {}: {} -> {}", self.peer, self.state, next);
                }
                self.state = next;
                true
            }
            None => false,
        }
    }

    fn assign_role(&mut self, role: NegotiationRole) {
        debug_assert!(self.role.is_none(), "negotiation role is set once");
        self.role.get_or_insert(role);
    }

    /// Start negotiating as the offerer.
    pub fn initiate(&mut self) -> bool {
        if !self.transition(NegotiationInput::Initiate) {
            warn!("Ignoring initiate for {} in state {}", self.peer, self.state);
            return false;
        }

        info!("Sending offer to {}", self.peer);
        self.assign_role(NegotiationRole::Offerer);
        self.connection.create_offer();
        true
    }

    pub fn handle_offer(&mut self, sdp: String) -> bool {
        if !self.transition(NegotiationInput::RemoteOffer) {
            warn!("Ignoring offer from {} in state {}", self.peer, self.state);
            return false;
        }

        info!("Accepting offer from {}", self.peer);
        self.assign_role(NegotiationRole::Answerer);
        self.connection.accept_offer(sdp);
        self.flush_remote_candidates();
        true
    }

    pub fn handle_answer(&mut self, sdp: String) -> bool {
        if !self.transition(NegotiationInput::RemoteAnswer) {
            warn!("Ignoring answer from {} in state {}", self.peer, self.state);
            return false;
        }

        self.connection.apply_answer(sdp);
        self.flush_remote_candidates();
        true
    }

    pub fn handle_candidate(&mut self, candidate: IceCandidate) {
        if self.state.is_closed() {
            debug!("Dropping candidate from closed peer {}", self.peer);
        } else if self.remote_description_requested {
            self.connection.add_candidate(candidate);
        } else {
            debug!("Buffering early candidate from {}", self.peer);
            self.pending_remote.push(candidate);
        }
    }

    // The connection executes commands in order, so candidates queued right
    // behind the remote description are applied after it.
    fn flush_remote_candidates(&mut self) {
        self.remote_description_requested = true;
        for candidate in self.pending_remote.drain(..) {
            self.connection.add_candidate(candidate);
        }
    }

    pub fn on_offer_created(&mut self, sdp: String, outbox: &mut Outbox) {
        if !self.transition(NegotiationInput::LocalOfferReady) {
            debug!("Discarding offer for {} in state {}", self.peer, self.state);
            return;
        }

        outbox.emit(&self.peer, PeerBody::Offer { sdp });
        self.flush_local_candidates(outbox);
    }

    pub fn on_answer_created(&mut self, sdp: String, outbox: &mut Outbox) {
        if !self.transition(NegotiationInput::LocalAnswerReady) {
            debug!("Discarding answer for {} in state {}", self.peer, self.state);
            return;
        }

        info!("Sending answer to {}", self.peer);
        outbox.emit(&self.peer, PeerBody::Answer { sdp });
        self.flush_local_candidates(outbox);
    }

    pub fn on_answer_applied(&mut self) {
        if self.transition(NegotiationInput::RemoteAnswerApplied) {
            info!("Answer from {} applied", self.peer);
        }
    }

    pub fn on_transport_connected(&mut self) {
        if self.transition(NegotiationInput::TransportConnected) {
            info!("Connected to {}", self.peer);
        }
    }

    /// Relay one locally discovered candidate to the peer.
    pub fn on_local_candidate(&mut self, candidate: IceCandidate, outbox: &mut Outbox) {
        if self.state.is_closed() {
            return;
        }

        if self.local_description_sent {
            outbox.emit(&self.peer, PeerBody::Candidate(candidate));
        } else {
            self.pending_local.push(candidate);
        }
    }

    fn flush_local_candidates(&mut self, outbox: &mut Outbox) {
        self.local_description_sent = true;
        for candidate in self.pending_local.drain(..) {
            outbox.emit(&self.peer, PeerBody::Candidate(candidate));
        }
    }

    pub fn on_step_failed(&mut self, step: NegotiationStep, error: &str) {
        warn!(
            "Negotiation with {} stalled in {} ({} failed: {})",
            self.peer, self.state, step, error
        );
    }

    /// Release the connection and anything buffered. Idempotent.
    pub fn close(&mut self) -> bool {
        if !self.transition(NegotiationInput::Close) {
            return false;
        }

        self.pending_remote.clear();
        self.pending_local.clear();
        self.connection.close();
        true
    }
}
