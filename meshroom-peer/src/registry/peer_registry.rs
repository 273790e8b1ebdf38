use crate::negotiator::{NegotiationState, Negotiator};
use crate::registry::PeerEntry;
use crate::transport::{ConnectionEvent, ConnectionFactory, ConnectionHandle, LocalMedia};
use meshroom_core::PeerId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::info;

/// Authoritative map of remote peers. At most one entry per identity.
///
/// Only touched from the session loop. Creating an entry spawns its
/// connection driver, so the registry must live inside a tokio runtime.
pub struct PeerRegistry {
    entries: HashMap<PeerId, PeerEntry>,
    next_epoch: u64,
    factory: Arc<dyn ConnectionFactory>,
    media: LocalMedia,
    events: mpsc::UnboundedSender<ConnectionEvent>,
}

impl PeerRegistry {
    pub fn new(
        factory: Arc<dyn ConnectionFactory>,
        media: LocalMedia,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Self {
        Self {
            entries: HashMap::new(),
            next_epoch: 1,
            factory,
            media,
            events,
        }
    }

    pub fn get_or_create(&mut self, identity: &PeerId) -> &mut PeerEntry {
        match self.entries.entry(identity.clone()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(slot) => {
                let epoch = self.next_epoch;
                self.next_epoch += 1;

                info!("Creating connection for {} (epoch {})", identity, epoch);
                let connection = ConnectionHandle::spawn(
                    identity.clone(),
                    epoch,
                    Arc::clone(&self.factory),
                    self.media.clone(),
                    self.events.clone(),
                );
                let negotiator = Negotiator::new(identity.clone(), connection);
                slot.insert(PeerEntry::new(identity.clone(), epoch, negotiator))
            }
        }
    }

    pub fn get(&self, identity: &PeerId) -> Option<&PeerEntry> {
        self.entries.get(identity)
    }

    pub fn get_mut(&mut self, identity: &PeerId) -> Option<&mut PeerEntry> {
        self.entries.get_mut(identity)
    }

    pub fn contains(&self, identity: &PeerId) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn identities(&self) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = self.entries.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Close and forget a peer. Returns `false` if it was not known.
    pub fn remove(&mut self, identity: &PeerId) -> bool {
        match self.entries.remove(identity) {
            Some(mut entry) => {
                info!("Removing {} (epoch {})", identity, entry.epoch());
                entry.close();
                true
            }
            None => false,
        }
    }

    /// Drop whatever exists for `identity` and start over with a fresh
    /// connection under a new epoch.
    pub fn replace(&mut self, identity: &PeerId) -> &mut PeerEntry {
        self.remove(identity);
        self.get_or_create(identity)
    }

    /// Peers that have not reached `Connected` within `timeout`.
    pub fn stalled(&self, now: Instant, timeout: Duration) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = self
            .entries
            .values()
            .filter(|entry| entry.state() != NegotiationState::Connected)
            .filter(|entry| now.saturating_duration_since(entry.created_at()) >= timeout)
            .map(|entry| entry.identity().clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn clear(&mut self) {
        for (_, mut entry) in self.entries.drain() {
            entry.close();
        }
    }
}
