use crate::error::MediaError;
use async_trait::async_trait;
use meshroom_core::PeerId;
use std::fmt;
use std::sync::Arc;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

pub type LocalTrack = Arc<dyn TrackLocal + Send + Sync>;

/// Local tracks shared, read-only, by every peer connection.
#[derive(Clone, Default)]
pub struct LocalMedia {
    tracks: Arc<[LocalTrack]>,
}

impl LocalMedia {
    pub fn new(tracks: Vec<LocalTrack>) -> Self {
        Self {
            tracks: tracks.into(),
        }
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl fmt::Debug for LocalMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tracks.iter().map(|track| track.id()))
            .finish()
    }
}

/// Supplies the local capture. Acquired once, before any peer work starts.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<LocalMedia, MediaError>;
}

#[async_trait]
impl MediaSource for LocalMedia {
    async fn acquire(&self) -> Result<LocalMedia, MediaError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
    Unknown,
}

impl From<RTPCodecType> for TrackKind {
    fn from(kind: RTPCodecType) -> Self {
        match kind {
            RTPCodecType::Audio => Self::Audio,
            RTPCodecType::Video => Self::Video,
            _ => Self::Unknown,
        }
    }
}

/// A track a remote peer started sending.
///
/// Carries the live receiving end when it came from a real connection, so a
/// sink can read RTP from it. Two tracks compare equal when their ids and
/// kind match.
#[derive(Clone)]
pub struct RemoteTrack {
    pub track_id: String,
    pub stream_id: String,
    pub kind: TrackKind,
    media: Option<Arc<TrackRemote>>,
}

impl RemoteTrack {
    /// A track known only by its description.
    pub fn new(track_id: impl Into<String>, stream_id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            track_id: track_id.into(),
            stream_id: stream_id.into(),
            kind,
            media: None,
        }
    }

    pub fn from_remote(track: Arc<TrackRemote>) -> Self {
        Self {
            track_id: track.id(),
            stream_id: track.stream_id(),
            kind: track.kind().into(),
            media: Some(track),
        }
    }

    pub fn media(&self) -> Option<&Arc<TrackRemote>> {
        self.media.as_ref()
    }
}

impl PartialEq for RemoteTrack {
    fn eq(&self, other: &Self) -> bool {
        self.track_id == other.track_id
            && self.stream_id == other.stream_id
            && self.kind == other.kind
    }
}

impl Eq for RemoteTrack {}

impl fmt::Debug for RemoteTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTrack")
            .field("track_id", &self.track_id)
            .field("stream_id", &self.stream_id)
            .field("kind", &self.kind)
            .field("live", &self.media.is_some())
            .finish()
    }
}

/// Rendering target for one remote peer.
pub trait TrackSink: Send {
    fn render(&mut self, track: &RemoteTrack);

    fn detach(&mut self);
}

/// UI side of the mesh.
pub trait PeerObserver: Send + Sync {
    /// Called the first time a peer produces a remote track.
    fn attach(&self, peer: &PeerId) -> Box<dyn TrackSink>;

    /// Called after a known peer was removed from the registry.
    fn on_peer_left(&self, _peer: &PeerId) {}

    /// A chat line arrived from `peer`.
    fn on_chat(&self, _peer: &PeerId, _message: &str) {}
}
