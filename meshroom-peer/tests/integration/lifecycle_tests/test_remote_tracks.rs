use meshroom_core::PeerId;
use meshroom_peer::{RemoteTrack, TrackKind};

use crate::integration::init_tracing;
use crate::utils::{ObserverEvent, TestPeer, add, remove};

fn track(id: &str, kind: TrackKind) -> RemoteTrack {
    RemoteTrack::new(id, "stream-b", kind)
}

#[tokio::test]
async fn test_tracks_render_into_one_sink_until_peer_leaves() {
    init_tracing();

    let mut peer = TestPeer::with_identity("A").await;
    let b = PeerId::from("B");

    peer.frame(&add("B")).await;
    let connection = peer.factory.latest_for(&b).await.expect("Connection for B");
    connection.events().remote_track(track("audio", TrackKind::Audio));
    connection.events().remote_track(track("video", TrackKind::Video));
    peer.settle().await;

    assert!(
        peer.session
            .registry()
            .get(&b)
            .is_some_and(|entry| entry.has_track_sink())
    );

    peer.frame(&remove("B")).await;

    assert_eq!(
        peer.observer.events(),
        vec![
            ObserverEvent::Attached(b.clone()),
            ObserverEvent::Rendered(b.clone(), track("audio", TrackKind::Audio)),
            ObserverEvent::Rendered(b.clone(), track("video", TrackKind::Video)),
            ObserverEvent::Detached(b.clone()),
            ObserverEvent::Left(b.clone()),
        ]
    );
}
