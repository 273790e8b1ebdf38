use crate::negotiator::{NegotiationState, Negotiator};
use crate::transport::{PeerObserver, RemoteTrack, TrackSink};
use meshroom_core::PeerId;
use tokio::time::Instant;
use tracing::debug;

/// Everything the session knows about one remote peer.
pub struct PeerEntry {
    identity: PeerId,
    epoch: u64,
    negotiator: Negotiator,
    remote_track_sink: Option<Box<dyn TrackSink>>,
    created_at: Instant,
}

impl PeerEntry {
    pub(crate) fn new(identity: PeerId, epoch: u64, negotiator: Negotiator) -> Self {
        Self {
            identity,
            epoch,
            negotiator,
            remote_track_sink: None,
            created_at: Instant::now(),
        }
    }

    pub fn identity(&self) -> &PeerId {
        &self.identity
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn negotiator(&self) -> &Negotiator {
        &self.negotiator
    }

    pub fn negotiator_mut(&mut self) -> &mut Negotiator {
        &mut self.negotiator
    }

    pub fn state(&self) -> NegotiationState {
        self.negotiator.state()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn has_track_sink(&self) -> bool {
        self.remote_track_sink.is_some()
    }

    /// Whether the UI has heard of this peer: we offered to it, accepted
    /// its offer, or rendered one of its tracks. Entries opened by a stray
    /// answer or candidate are not.
    pub fn is_announced(&self) -> bool {
        self.negotiator.role().is_some() || self.has_track_sink()
    }

    /// The sink is requested from the observer on the first track only.
    pub fn render_remote_track(&mut self, track: &RemoteTrack, observer: &dyn PeerObserver) {
        if self.negotiator.state().is_closed() {
            return;
        }

        let identity = &self.identity;
        let sink = self.remote_track_sink.get_or_insert_with(|| {
            debug!("Attaching track sink for {}", identity);
            observer.attach(identity)
        });
        sink.render(track);
    }

    pub(crate) fn close(&mut self) {
        self.negotiator.close();
        if let Some(mut sink) = self.remote_track_sink.take() {
            sink.detach();
        }
    }
}
