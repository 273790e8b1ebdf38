use crate::error::ConnectionError;
use crate::transport::{
    ConnectionEvent, ConnectionEventKind, ConnectionEvents, ConnectionFactory, LocalMedia,
    NegotiationStep, PeerConnection,
};
use meshroom_core::{IceCandidate, PeerId, SdpType, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

#[derive(Debug)]
enum ConnectionCommand {
    CreateOffer,
    AcceptOffer(String),
    ApplyAnswer(String),
    AddCandidate(IceCandidate),
    Close,
}

/// Handle to the task that owns one peer's connection.
///
/// Commands are executed strictly in the order they were issued. Results come
/// back to the session loop as [`ConnectionEvent`]s.
#[derive(Debug)]
pub struct ConnectionHandle {
    peer: PeerId,
    epoch: u64,
    commands: mpsc::UnboundedSender<ConnectionCommand>,
}

impl ConnectionHandle {
    /// Spawn the driver. Must be called from within a tokio runtime.
    pub fn spawn(
        peer: PeerId,
        epoch: u64,
        factory: Arc<dyn ConnectionFactory>,
        media: LocalMedia,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let events = ConnectionEvents::new(peer.clone(), epoch, events);

        tokio::spawn(drive(factory, media, events, command_rx));

        Self {
            peer,
            epoch,
            commands,
        }
    }

    pub fn peer(&self) -> &PeerId {
        &self.peer
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn create_offer(&self) {
        self.send(ConnectionCommand::CreateOffer);
    }

    /// Set the remote offer, then create and set the local answer.
    pub fn accept_offer(&self, sdp: String) {
        self.send(ConnectionCommand::AcceptOffer(sdp));
    }

    pub fn apply_answer(&self, sdp: String) {
        self.send(ConnectionCommand::ApplyAnswer(sdp));
    }

    pub fn add_candidate(&self, candidate: IceCandidate) {
        self.send(ConnectionCommand::AddCandidate(candidate));
    }

    pub fn close(&self) {
        self.send(ConnectionCommand::Close);
    }

    fn send(&self, command: ConnectionCommand) {
        if let Err(e) = self.commands.send(command) {
            debug!(
                "Connection driver for {} (epoch {}) is gone, dropping {:?}",
                self.peer, self.epoch, e.0
            );
        }
    }
}

async fn drive(
    factory: Arc<dyn ConnectionFactory>,
    media: LocalMedia,
    events: ConnectionEvents,
    mut commands: mpsc::UnboundedReceiver<ConnectionCommand>,
) {
    let peer = events.peer().clone();

    let connection = match factory.connect(&peer, &media, events.clone()).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Failed to create connection for {}: {}", peer, e);
            events.emit(ConnectionEventKind::StepFailed {
                step: NegotiationStep::Connect,
                error: e.to_string(),
            });
            return;
        }
    };

    while let Some(command) = commands.recv().await {
        match command {
            ConnectionCommand::CreateOffer => match connection.create_offer().await {
                Ok(sdp) => events.emit(ConnectionEventKind::OfferCreated(sdp)),
                Err(e) => step_failed(&events, NegotiationStep::CreateOffer, e),
            },

            ConnectionCommand::AcceptOffer(sdp) => {
                match accept_offer(connection.as_ref(), sdp).await {
                    Ok(answer) => events.emit(ConnectionEventKind::AnswerCreated(answer)),
                    Err(e) => step_failed(&events, NegotiationStep::AcceptOffer, e),
                }
            }

            ConnectionCommand::ApplyAnswer(sdp) => {
                let description = SessionDescription {
                    sdp_type: SdpType::Answer,
                    sdp,
                };
                match connection.set_remote_description(description).await {
                    Ok(()) => events.emit(ConnectionEventKind::AnswerApplied),
                    Err(e) => step_failed(&events, NegotiationStep::ApplyAnswer, e),
                }
            }

            ConnectionCommand::AddCandidate(candidate) => {
                if let Err(e) = connection.add_ice_candidate(candidate).await {
                    warn!("Dropping ICE candidate from {}: {}", peer, e);
                }
            }

            ConnectionCommand::Close => break,
        }
    }

    // Reached on an explicit close and when every handle was dropped.
    if let Err(e) = connection.close().await {
        warn!("Failed to close connection to {}: {}", peer, e);
    }
    debug!("Connection driver for {} (epoch {}) finished", peer, events.epoch());
}

async fn accept_offer(
    connection: &dyn PeerConnection,
    sdp: String,
) -> Result<String, ConnectionError> {
    connection
        .set_remote_description(SessionDescription {
            sdp_type: SdpType::Offer,
            sdp,
        })
        .await?;
    connection.create_answer().await
}

fn step_failed(events: &ConnectionEvents, step: NegotiationStep, error: ConnectionError) {
    warn!("Failed to {} for {}: {}", step, events.peer(), error);
    events.emit(ConnectionEventKind::StepFailed {
        step,
        error: error.to_string(),
    });
}
