use meshroom_core::{Envelope, PeerBody, PeerId};
use meshroom_peer::{SignalingTransport, TransportError};
use std::sync::{Arc, Mutex};

/// Mock SignalingTransport that records every join and forwarded envelope.
#[derive(Clone, Default)]
pub struct MockTransport {
    joins: Arc<Mutex<Vec<String>>>,
    sent: Arc<Mutex<Vec<(PeerId, Envelope)>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn joins(&self) -> Vec<String> {
        self.joins.lock().unwrap().clone()
    }

    /// All forwarded envelopes, oldest first.
    pub fn sent(&self) -> Vec<(PeerId, Envelope)> {
        self.sent.lock().unwrap().clone()
    }

    /// Remove and return the envelopes forwarded to `target`.
    pub fn take_sent_to(&self, target: &PeerId) -> Vec<Envelope> {
        let mut sent = self.sent.lock().unwrap();
        let (taken, kept): (Vec<_>, Vec<_>) = sent.drain(..).partition(|(to, _)| to == target);
        *sent = kept;
        taken.into_iter().map(|(_, envelope)| envelope).collect()
    }

    /// Bodies sent to `target`, oldest first.
    pub fn bodies_to(&self, target: &PeerId) -> Vec<PeerBody> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| to == target)
            .filter_map(|(_, envelope)| match envelope {
                Envelope::Peer { body, .. } => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn count_to(&self, target: &PeerId, kind: &str) -> usize {
        self.bodies_to(target)
            .iter()
            .filter(|body| body.kind() == kind)
            .count()
    }
}

impl SignalingTransport for MockTransport {
    fn join(&self, room: &str) -> Result<(), TransportError> {
        tracing::debug!("[MockTransport] join {}", room);
        self.joins.lock().unwrap().push(room.to_string());
        Ok(())
    }

    fn send_to(&self, target: &PeerId, envelope: Envelope) -> Result<(), TransportError> {
        tracing::debug!("[MockTransport] send to {}", target);
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), envelope));
        Ok(())
    }
}
