use meshroom_core::PeerId;
use meshroom_peer::{NegotiationState, SessionConfig};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{
    MockConnectionConfig, TEST_ROOM, TestPeer, add, answer, candidate, ice, offer, you,
};

fn short_timeout() -> SessionConfig {
    SessionConfig {
        negotiation_timeout: Some(Duration::from_millis(500)),
        sweep_interval: Duration::from_millis(50),
        ..SessionConfig::new(TEST_ROOM)
    }
}

#[tokio::test]
async fn test_stalled_peer_is_torn_down() {
    init_tracing();

    let mut peer = TestPeer::start(
        short_timeout(),
        MockConnectionConfig {
            auto_connect: true,
            ..Default::default()
        },
    )
    .await;
    peer.frame(&you("A")).await;

    // B never answers; C's offer is answered and connects.
    peer.frame(&add("B")).await;
    peer.frame(&offer("C", "remote-offer")).await;
    assert_eq!(peer.state("C"), Some(NegotiationState::Connected));

    peer.run_for(Duration::from_millis(800)).await;

    let b = PeerId::from("B");
    assert!(!peer.session.registry().contains(&b));
    assert!(peer.observer.has_left(&b));
    assert_eq!(
        peer.factory
            .latest_for(&b)
            .await
            .expect("Connection for B")
            .close_count()
            .await,
        1
    );
    assert_eq!(peer.state("C"), Some(NegotiationState::Connected));
}

#[tokio::test]
async fn test_stray_entries_expire_without_telling_the_observer() {
    init_tracing();

    let mut peer = TestPeer::start(short_timeout(), MockConnectionConfig::default()).await;
    peer.frame(&you("A")).await;

    // Nobody announced B or C; D was added by the relay.
    peer.frame(&candidate("B", ice(1))).await;
    peer.frame(&answer("C", "unsolicited")).await;
    peer.frame(&add("D")).await;

    peer.run_for(Duration::from_millis(800)).await;

    assert!(peer.session.registry().is_empty());
    assert!(!peer.observer.has_left(&PeerId::from("B")));
    assert!(!peer.observer.has_left(&PeerId::from("C")));
    assert!(peer.observer.has_left(&PeerId::from("D")));
    for id in ["B", "C", "D"] {
        let connection = peer
            .factory
            .latest_for(&PeerId::from(id))
            .await
            .expect("Connection");
        assert_eq!(connection.close_count().await, 1);
    }
}

#[tokio::test]
async fn test_timeout_can_be_disabled() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    peer.frame(&add("B")).await;

    let later = tokio::time::Instant::now() + Duration::from_secs(3600);
    peer.session.expire_stalled(later);

    assert_eq!(peer.state("B"), Some(NegotiationState::OfferSent));
}
