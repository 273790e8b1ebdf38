use meshroom_core::{Envelope, PeerBody, PeerId};
use meshroom_peer::NegotiationState;

use crate::integration::init_tracing;
use crate::utils::{TestPeer, add, you};

#[tokio::test]
async fn test_offer_is_held_until_identity_arrives() {
    init_tracing();

    let mut peer = TestPeer::new().await;
    peer.frame(&add("B")).await;

    assert_eq!(peer.state("B"), Some(NegotiationState::OfferSent));
    assert!(
        peer.transport.sent().is_empty(),
        "Nothing may leave before the relay names us"
    );
    assert_eq!(peer.session.presence().outbox().deferred(), 1);

    peer.frame(&you("A")).await;

    let sent = peer.transport.sent();
    assert_eq!(sent.len(), 1);
    let (target, envelope) = &sent[0];
    assert_eq!(target, &PeerId::from("B"));
    assert!(matches!(
        envelope,
        Envelope::Peer { url, body: PeerBody::Offer { .. } } if url == &PeerId::from("A")
    ));
    assert_eq!(peer.session.presence().outbox().deferred(), 0);
}
