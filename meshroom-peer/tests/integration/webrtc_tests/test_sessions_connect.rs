use meshroom_core::{Envelope, PeerId};
use meshroom_peer::{
    LocalMedia, LocalTrack, NegotiationRole, NegotiationState, Session, TransportConfig,
    WebRtcConnectionFactory,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout};
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

use crate::integration::init_tracing;
use crate::utils::{MockTransport, RecordingObserver, add, untimed_config, you};

/// A session on the real WebRTC stack. The test plays the relay.
struct WebRtcPeer {
    id: PeerId,
    session: Session,
    inbound: mpsc::Sender<String>,
    transport: MockTransport,
    observer: RecordingObserver,
}

impl WebRtcPeer {
    async fn start(id: &str) -> Self {
        let (inbound, inbound_rx) = mpsc::channel(256);
        let transport = MockTransport::new();
        let observer = RecordingObserver::new();
        let factory = WebRtcConnectionFactory::new(TransportConfig {
            ice_servers: Vec::new(),
        })
        .expect("Failed to set up WebRTC API");

        let session = Session::start(
            untimed_config(),
            &opus_only(id),
            Arc::new(transport.clone()),
            inbound_rx,
            Arc::new(factory),
            Arc::new(observer.clone()),
        )
        .await
        .expect("Failed to start session");

        let peer = Self {
            id: PeerId::from(id),
            session,
            inbound,
            transport,
            observer,
        };
        peer.push(&you(id)).await;
        peer
    }

    async fn push(&self, envelope: &Envelope) {
        let text = serde_json::to_string(envelope).expect("Failed to encode envelope");
        self.inbound
            .send(text)
            .await
            .expect("Session inbound closed");
    }

    /// Let the event loop work for a short slice.
    async fn pump(&mut self) {
        let session = &mut self.session;
        let _ = timeout(Duration::from_millis(20), async {
            while session.step().await {}
        })
        .await;
    }

    fn state_towards(&self, other: &WebRtcPeer) -> Option<NegotiationState> {
        self.session.negotiation_state(&other.id)
    }

    fn role_towards(&self, other: &WebRtcPeer) -> Option<NegotiationRole> {
        self.session
            .registry()
            .get(&other.id)
            .and_then(|entry| entry.negotiator().role())
    }
}

fn opus_only(id: &str) -> LocalMedia {
    let audio: LocalTrack = Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            clock_rate: 48000,
            channels: 2,
            ..Default::default()
        },
        format!("audio-{id}"),
        format!("stream-{id}"),
    ));
    LocalMedia::new(vec![audio])
}

/// Forward what `from` sent to `to`, like the relay would.
async fn hand_over(from: &WebRtcPeer, to: &WebRtcPeer) -> usize {
    let envelopes = from.transport.take_sent_to(&to.id);
    for envelope in &envelopes {
        to.push(envelope).await;
    }
    envelopes.len()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_sessions_connect_over_webrtc() {
    init_tracing();

    let mut alice = WebRtcPeer::start("A").await;
    let mut bob = WebRtcPeer::start("B").await;
    alice.push(&add("B")).await;

    let deadline = Instant::now() + Duration::from_secs(20);
    let mut relayed = 0;
    loop {
        alice.pump().await;
        bob.pump().await;
        relayed += hand_over(&alice, &bob).await;
        relayed += hand_over(&bob, &alice).await;

        let connected = alice.state_towards(&bob) == Some(NegotiationState::Connected)
            && bob.state_towards(&alice) == Some(NegotiationState::Connected);
        if connected {
            break;
        }
        assert!(
            Instant::now() < deadline,
            "Sessions did not connect: A->B {:?}, B->A {:?}",
            alice.state_towards(&bob),
            bob.state_towards(&alice)
        );
    }

    // An offer, an answer and at least one candidate each way.
    assert!(relayed >= 4, "Only {relayed} envelopes were relayed");
    assert_eq!(alice.role_towards(&bob), Some(NegotiationRole::Offerer));
    assert_eq!(bob.role_towards(&alice), Some(NegotiationRole::Answerer));
    assert!(!alice.observer.has_left(&bob.id));
    assert!(!bob.observer.has_left(&alice.id));

    alice.session.shutdown();
    bob.session.shutdown();
    assert!(alice.session.registry().is_empty());
}
