use crate::error::ConnectionError;
use crate::transport::{
    ConnectionEvents, ConnectionFactory, ConnectionState, LocalMedia, PeerConnection, RemoteTrack,
    TransportConfig,
};
use anyhow::Context;
use async_trait::async_trait;
use meshroom_core::{IceCandidate, PeerId, SdpType, SessionDescription};
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::{API, APIBuilder};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Builds [`ConnectionWrapper`]s from one shared WebRTC API object.
pub struct WebRtcConnectionFactory {
    api: API,
    config: TransportConfig,
}

impl WebRtcConnectionFactory {
    pub fn new(config: TransportConfig) -> anyhow::Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self { api, config })
    }
}

#[async_trait]
impl ConnectionFactory for WebRtcConnectionFactory {
    async fn connect(
        &self,
        peer: &PeerId,
        media: &LocalMedia,
        events: ConnectionEvents,
    ) -> Result<Arc<dyn PeerConnection>, ConnectionError> {
        let connection =
            ConnectionWrapper::new(&self.api, &self.config, peer.clone(), media, events).await?;
        Ok(Arc::new(connection))
    }
}

pub struct ConnectionWrapper {
    peer_id: PeerId,
    peer_connection: Arc<RTCPeerConnection>,
}

impl ConnectionWrapper {
    /// Create the connection, hook its callbacks into `events` and attach
    /// every local track.
    pub async fn new(
        api: &API,
        config: &TransportConfig,
        peer_id: PeerId,
        media: &LocalMedia,
        events: ConnectionEvents,
    ) -> anyhow::Result<Self> {
        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .with_context(|| format!("failed to create peer connection for {peer_id}"))?,
        );

        let state_events = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let events = state_events.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", events.peer(), s);
                    let state = match s {
                        RTCPeerConnectionState::Connected => ConnectionState::Connected,
                        RTCPeerConnectionState::Disconnected => ConnectionState::Disconnected,
                        RTCPeerConnectionState::Failed => ConnectionState::Failed,
                        RTCPeerConnectionState::Closed => ConnectionState::Closed,
                        _ => ConnectionState::Connecting,
                    };
                    events.state_changed(state);
                })
            },
        ));

        let ice_events = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let events = ice_events.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                events.local_candidate(IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                });
            })
        }));

        let track_events = events.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let events = track_events.clone();

            Box::pin(async move {
                events.remote_track(RemoteTrack::from_remote(track));
            })
        }));

        for track in media.tracks() {
            debug!("Adding track {} for {}", track.id(), peer_id);
            peer_connection
                .add_track(Arc::clone(track))
                .await
                .with_context(|| format!("failed to add track {} for {peer_id}", track.id()))?;
        }

        Ok(Self {
            peer_id,
            peer_connection,
        })
    }
}

fn backend(e: webrtc::Error) -> ConnectionError {
    match e {
        webrtc::Error::ErrNoRemoteDescription => ConnectionError::NoRemoteDescription,
        webrtc::Error::ErrConnectionClosed => ConnectionError::Closed,
        other => ConnectionError::Backend(other.into()),
    }
}

#[async_trait]
impl PeerConnection for ConnectionWrapper {
    async fn create_offer(&self) -> Result<String, ConnectionError> {
        let offer = self.peer_connection.create_offer(None).await.map_err(backend)?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .map_err(backend)?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String, ConnectionError> {
        let answer = self.peer_connection.create_answer(None).await.map_err(backend)?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .map_err(backend)?;
        Ok(answer.sdp)
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> Result<(), ConnectionError> {
        let desc = match description.sdp_type {
            SdpType::Offer => RTCSessionDescription::offer(description.sdp),
            SdpType::Answer => RTCSessionDescription::answer(description.sdp),
        }
        .map_err(backend)?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .map_err(backend)
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), ConnectionError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .map_err(backend)
    }

    async fn close(&self) -> Result<(), ConnectionError> {
        debug!("Closing peer connection for {}", self.peer_id);
        self.peer_connection.close().await.map_err(backend)
    }
}
