use crate::integration::init_tracing;
use crate::utils::{TEST_ROOM, TestPeer};

#[tokio::test]
async fn test_join_is_sent_once_before_anything_else() {
    init_tracing();

    let mut peer = TestPeer::new().await;
    peer.settle().await;

    assert_eq!(peer.transport.joins(), vec![TEST_ROOM.to_string()]);
    assert!(peer.transport.sent().is_empty());
    assert!(peer.session.presence().has_joined());
    assert!(peer.session.local_identity().is_none());
}
