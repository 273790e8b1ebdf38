use meshroom_core::{Envelope, PeerBody, PeerId, SdpType, SessionDescription};
use meshroom_peer::{NegotiationRole, NegotiationState};

use crate::integration::init_tracing;
use crate::utils::{TestPeer, offer};

#[tokio::test]
async fn test_offer_from_unknown_peer_is_answered() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    let b = PeerId::from("B");

    peer.frame(&offer("B", "remote-offer")).await;

    assert_eq!(peer.session.registry().len(), 1);
    assert_eq!(peer.state("B"), Some(NegotiationState::AnswerSent));
    assert_eq!(peer.factory.attempts().await, 1);

    let entry = peer.session.registry().get(&b).expect("Entry for B");
    assert_eq!(entry.negotiator().role(), Some(NegotiationRole::Answerer));

    let connection = peer.factory.latest_for(&b).await.expect("Connection for B");
    assert_eq!(
        connection.remote_descriptions().await,
        vec![SessionDescription {
            sdp_type: SdpType::Offer,
            sdp: "remote-offer".to_string(),
        }]
    );

    let sent = peer.transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0].1,
        Envelope::Peer { url, body: PeerBody::Answer { .. } } if url == &PeerId::from("A")
    ));
}
