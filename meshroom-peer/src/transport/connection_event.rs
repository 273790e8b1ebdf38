use crate::transport::RemoteTrack;
use meshroom_core::{IceCandidate, PeerId};
use std::fmt;
use tokio::sync::mpsc;

/// Something a peer's connection reported back to the session loop.
#[derive(Debug)]
pub struct ConnectionEvent {
    pub peer: PeerId,
    /// Epoch of the registry entry whose connection produced the event.
    pub epoch: u64,
    pub kind: ConnectionEventKind,
}

#[derive(Debug)]
pub enum ConnectionEventKind {
    OfferCreated(String),
    AnswerCreated(String),
    AnswerApplied,
    LocalCandidate(IceCandidate),
    RemoteTrack(RemoteTrack),
    StateChanged(ConnectionState),
    StepFailed {
        step: NegotiationStep,
        error: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationStep {
    Connect,
    CreateOffer,
    AcceptOffer,
    ApplyAnswer,
}

impl fmt::Display for NegotiationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationStep::Connect => write!(f, "connect"),
            NegotiationStep::CreateOffer => write!(f, "create offer"),
            NegotiationStep::AcceptOffer => write!(f, "accept offer"),
            NegotiationStep::ApplyAnswer => write!(f, "apply answer"),
        }
    }
}

/// Sender half handed to a connection, pre-tagged with its peer and epoch.
#[derive(Clone)]
pub struct ConnectionEvents {
    peer: PeerId,
    epoch: u64,
    tx: mpsc::UnboundedSender<ConnectionEvent>,
}

impl ConnectionEvents {
    pub fn new(peer: PeerId, epoch: u64, tx: mpsc::UnboundedSender<ConnectionEvent>) -> Self {
        Self { peer, epoch, tx }
    }

    pub fn peer(&self) -> &PeerId {
        &self.peer
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The session may already be gone; nothing is listening then.
    pub fn emit(&self, kind: ConnectionEventKind) {
        let _ = self.tx.send(ConnectionEvent {
            peer: self.peer.clone(),
            epoch: self.epoch,
            kind,
        });
    }

    pub fn local_candidate(&self, candidate: IceCandidate) {
        self.emit(ConnectionEventKind::LocalCandidate(candidate));
    }

    pub fn remote_track(&self, track: RemoteTrack) {
        self.emit(ConnectionEventKind::RemoteTrack(track));
    }

    pub fn state_changed(&self, state: ConnectionState) {
        self.emit(ConnectionEventKind::StateChanged(state));
    }
}
