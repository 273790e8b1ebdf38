use meshroom_core::PeerId;
use meshroom_peer::NegotiationState;

use crate::integration::init_tracing;
use crate::utils::{TestPeer, add, chat};

#[tokio::test]
async fn test_chat_reaches_observer_without_opening_a_connection() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    peer.frame(&chat("B", "hello")).await;

    assert_eq!(
        peer.observer.chats(),
        vec![(PeerId::from("B"), "hello".to_string())]
    );
    assert!(peer.session.registry().is_empty());
    assert!(peer.transport.sent().is_empty());
    assert_eq!(peer.factory.attempts().await, 0);
}

#[tokio::test]
async fn test_chat_leaves_negotiation_alone() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    peer.frame(&add("B")).await;
    peer.frame(&chat("B", "are you there?")).await;

    assert_eq!(peer.state("B"), Some(NegotiationState::OfferSent));
    assert_eq!(peer.observer.chats().len(), 1);
    assert_eq!(peer.factory.attempts().await, 1);
}

#[tokio::test]
async fn test_chat_claiming_to_be_us_is_dropped() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    peer.frame(&chat("A", "echo")).await;

    assert!(peer.observer.chats().is_empty());
    assert_eq!(peer.session.router().dropped(), 1);
}
