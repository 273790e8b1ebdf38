use crate::error::SessionError;
use crate::negotiator::NegotiationState;
use crate::presence::PresenceController;
use crate::registry::PeerRegistry;
use crate::router::MessageRouter;
use crate::session::SessionConfig;
use crate::transport::{
    ConnectionEvent, ConnectionEventKind, ConnectionFactory, ConnectionState, MediaSource,
    NegotiationStep, PeerObserver, SignalingTransport,
};
use meshroom_core::{PeerBody, PeerId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// One participant's view of a room.
///
/// Owns the registry, the presence controller and the router, and mutates
/// them from a single task: every relay frame, connection event and sweep
/// tick is handled to completion before the next one is looked at.
pub struct Session {
    config: SessionConfig,
    presence: PresenceController,
    registry: PeerRegistry,
    router: MessageRouter,
    inbound: mpsc::Receiver<String>,
    events: mpsc::UnboundedReceiver<ConnectionEvent>,
    sweep: Interval,
}

impl Session {
    /// Acquire local media, then join the room. Media failure is the only
    /// error surfaced here; nothing is sent to the relay in that case.
    pub async fn start(
        config: SessionConfig,
        media: &dyn MediaSource,
        transport: Arc<dyn SignalingTransport>,
        inbound: mpsc::Receiver<String>,
        factory: Arc<dyn ConnectionFactory>,
        observer: Arc<dyn PeerObserver>,
    ) -> Result<Self, SessionError> {
        let media = media.acquire().await?;
        info!("Acquired {} local tracks", media.len());

        let (events_tx, events) = mpsc::unbounded_channel();
        let registry = PeerRegistry::new(factory, media, events_tx);

        let mut presence = PresenceController::new(config.room.clone(), transport, observer);
        presence.on_room_join_required()?;

        let mut sweep = time::interval(config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Self {
            config,
            presence,
            registry,
            router: MessageRouter::new(),
            inbound,
            events,
            sweep,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn local_identity(&self) -> Option<&PeerId> {
        self.presence.local_identity()
    }

    pub fn presence(&self) -> &PresenceController {
        &self.presence
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub fn router(&self) -> &MessageRouter {
        &self.router
    }

    pub fn negotiation_state(&self, peer: &PeerId) -> Option<NegotiationState> {
        self.registry.get(peer).map(|entry| entry.state())
    }

    /// Handle one unit of work. Returns `false` once the relay side is gone.
    pub async fn step(&mut self) -> bool {
        tokio::select! {
            frame = self.inbound.recv() => match frame {
                Some(text) => {
                    self.handle_frame(&text);
                    true
                }
                None => false,
            },
            Some(event) = self.events.recv() => {
                self.handle_connection_event(event);
                true
            }
            now = self.sweep.tick() => {
                self.expire_stalled(now);
                true
            }
        }
    }

    pub async fn run(mut self) {
        while self.step().await {}

        info!("Relay connection closed, leaving {}", self.presence.room());
        self.shutdown();
    }

    pub fn handle_frame(&mut self, text: &str) {
        self.router.route(text, &mut self.presence, &mut self.registry);
    }

    pub fn handle_connection_event(&mut self, event: ConnectionEvent) {
        let ConnectionEvent { peer, epoch, kind } = event;

        let Some(entry) = self.registry.get_mut(&peer) else {
            debug!("Dropping {:?} for departed peer {}", kind, peer);
            return;
        };
        if entry.epoch() != epoch {
            debug!(
                "Dropping stale event for {} (epoch {}, live {})",
                peer,
                epoch,
                entry.epoch()
            );
            return;
        }

        let lost = match kind {
            ConnectionEventKind::OfferCreated(sdp) => {
                entry.negotiator_mut().on_offer_created(sdp, self.presence.outbox_mut());
                false
            }
            ConnectionEventKind::AnswerCreated(sdp) => {
                entry.negotiator_mut().on_answer_created(sdp, self.presence.outbox_mut());
                false
            }
            ConnectionEventKind::AnswerApplied => {
                entry.negotiator_mut().on_answer_applied();
                false
            }
            ConnectionEventKind::LocalCandidate(candidate) => {
                entry.negotiator_mut().on_local_candidate(candidate, self.presence.outbox_mut());
                false
            }
            ConnectionEventKind::RemoteTrack(track) => {
                info!("Remote {:?} track {} from {}", track.kind, track.track_id, peer);
                entry.render_remote_track(&track, self.presence.observer());
                false
            }
            ConnectionEventKind::StateChanged(state) => match state {
                ConnectionState::Connected => {
                    entry.negotiator_mut().on_transport_connected();
                    false
                }
                ConnectionState::Disconnected => {
                    warn!("Connection to {} interrupted", peer);
                    false
                }
                ConnectionState::Failed | ConnectionState::Closed => true,
                ConnectionState::Connecting => false,
            },
            ConnectionEventKind::StepFailed {
                step: NegotiationStep::Connect,
                error,
            } => {
                warn!("Could not open a connection to {}: {}", peer, error);
                true
            }
            ConnectionEventKind::StepFailed { step, error } => {
                entry.negotiator_mut().on_step_failed(step, &error);
                false
            }
        };

        if lost {
            self.presence.on_connection_lost(&peer, &mut self.registry);
        }
    }

    /// Tear down peers stuck short of connected for longer than the
    /// configured timeout.
    pub fn expire_stalled(&mut self, now: Instant) {
        let Some(timeout) = self.config.negotiation_timeout else {
            return;
        };

        for peer in self.registry.stalled(now, timeout) {
            warn!("Negotiation with {} timed out after {:?}", peer, timeout);
            self.presence.on_connection_lost(&peer, &mut self.registry);
        }
    }

    /// Address a chat line to every known peer. Returns the number of
    /// recipients; before our identity is assigned the lines are deferred.
    pub fn send_chat(&mut self, message: &str) -> usize {
        let peers = self.registry.identities();
        for peer in &peers {
            self.presence.outbox_mut().emit(
                peer,
                PeerBody::Chat {
                    message: message.to_owned(),
                },
            );
        }
        peers.len()
    }

    pub fn shutdown(&mut self) {
        if !self.registry.is_empty() {
            info!("Closing {} peer connections", self.registry.len());
        }
        self.registry.clear();
    }
}
