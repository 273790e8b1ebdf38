use crate::integration::init_tracing;
use crate::utils::{TestPeer, offer};

#[tokio::test]
async fn test_malformed_frames_change_nothing() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;

    peer.raw("not json at all").await;
    peer.raw(r#"{"type":"shout","url":"B"}"#).await;
    peer.raw(r#"{"type":"peer","url":"B","body":{"sdp":"v=0"}}"#).await;
    peer.raw(r#"{"type":"add"}"#).await;
    peer.raw("42").await;

    assert!(peer.session.registry().is_empty());
    assert!(peer.transport.sent().is_empty());
    assert_eq!(peer.session.router().dropped(), 5);
}

#[tokio::test]
async fn test_peer_envelope_from_ourselves_is_dropped() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    peer.frame(&offer("A", "echo")).await;

    assert!(peer.session.registry().is_empty());
    assert_eq!(peer.session.router().dropped(), 1);
}
