use meshroom_core::PeerId;

use crate::integration::init_tracing;
use crate::utils::{ObserverEvent, TestPeer, add, remove};

#[tokio::test]
async fn test_add_then_remove_closes_once() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    let b = PeerId::from("B");

    peer.frame(&add("B")).await;
    peer.frame(&remove("B")).await;

    assert!(!peer.session.registry().contains(&b));
    let connection = peer.factory.latest_for(&b).await.expect("Connection for B");
    assert_eq!(connection.close_count().await, 1);
    assert!(peer.observer.has_left(&b));

    peer.frame(&remove("B")).await;
    assert_eq!(connection.close_count().await, 1);
    assert_eq!(
        peer.observer
            .count(|e| matches!(e, ObserverEvent::Left(_))),
        1
    );
}

#[tokio::test]
async fn test_remove_unknown_peer_is_noop() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    peer.frame(&remove("B")).await;

    assert!(peer.session.registry().is_empty());
    assert!(peer.transport.sent().is_empty());
    assert!(peer.observer.events().is_empty());
    assert_eq!(peer.factory.attempts().await, 0);
}
