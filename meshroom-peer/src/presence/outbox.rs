use crate::transport::SignalingTransport;
use meshroom_core::{Envelope, PeerBody, PeerId};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outbound gate for peer envelopes.
///
/// Every `peer` envelope names its sender, so nothing leaves before the
/// relay has assigned our identity. Until then envelopes are queued and
/// later flushed in the order they were emitted.
pub struct Outbox {
    transport: Arc<dyn SignalingTransport>,
    local: Option<PeerId>,
    deferred: VecDeque<(PeerId, PeerBody)>,
}

impl Outbox {
    pub fn new(transport: Arc<dyn SignalingTransport>) -> Self {
        Self {
            transport,
            local: None,
            deferred: VecDeque::new(),
        }
    }

    pub fn local_identity(&self) -> Option<&PeerId> {
        self.local.as_ref()
    }

    pub fn deferred(&self) -> usize {
        self.deferred.len()
    }

    pub(crate) fn transport(&self) -> &dyn SignalingTransport {
        self.transport.as_ref()
    }

    pub fn emit(&mut self, target: &PeerId, body: PeerBody) {
        match &self.local {
            Some(local) => deliver(self.transport.as_ref(), local, target, body),
            None => {
                debug!(
                    "Deferring {} for {} until our identity is assigned",
                    body.kind(),
                    target
                );
                self.deferred.push_back((target.clone(), body));
            }
        }
    }

    /// Set the identity once and flush anything deferred. Returns `false`
    /// if an identity was already assigned.
    pub(crate) fn assign(&mut self, identity: PeerId) -> bool {
        if self.local.is_some() {
            return false;
        }

        if !self.deferred.is_empty() {
            info!(
                "Flushing {} deferred envelopes as {}",
                self.deferred.len(),
                identity
            );
        }
        for (target, body) in self.deferred.drain(..) {
            deliver(self.transport.as_ref(), &identity, &target, body);
        }
        self.local = Some(identity);
        true
    }
}

fn deliver(transport: &dyn SignalingTransport, local: &PeerId, target: &PeerId, body: PeerBody) {
    let kind = body.kind();
    let envelope = Envelope::Peer {
        url: local.clone(),
        body,
    };

    if let Err(e) = transport.send_to(target, envelope) {
        warn!("Failed to send {} to {}: {}", kind, target, e);
    }
}
