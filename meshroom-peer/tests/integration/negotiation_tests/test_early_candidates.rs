use meshroom_core::PeerId;
use meshroom_peer::NegotiationState;

use crate::integration::init_tracing;
use crate::utils::{TestPeer, candidate, ice, offer};

#[tokio::test]
async fn test_candidate_before_offer_is_applied_after_it() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    let b = PeerId::from("B");

    peer.frame(&candidate("B", ice(1))).await;

    assert_eq!(peer.state("B"), Some(NegotiationState::New));
    let entry = peer.session.registry().get(&b).expect("Entry for B");
    assert_eq!(entry.negotiator().buffered_candidates(), 1);
    let connection = peer.factory.latest_for(&b).await.expect("Connection for B");
    assert!(connection.applied_candidates().await.is_empty());

    peer.frame(&offer("B", "remote-offer")).await;
    peer.frame(&candidate("B", ice(2))).await;

    assert_eq!(peer.state("B"), Some(NegotiationState::AnswerSent));
    assert_eq!(connection.applied_candidates().await, vec![ice(1), ice(2)]);
    assert_eq!(connection.rejected_candidates().await, 0);
    assert_eq!(
        peer.session
            .registry()
            .get(&b)
            .map(|entry| entry.negotiator().buffered_candidates()),
        Some(0)
    );
}
