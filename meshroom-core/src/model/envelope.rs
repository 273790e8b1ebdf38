use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};

/// Signaling messages exchanged through the relay.
///
/// `You`, `Add` and `Remove` are produced by the relay itself. `Peer` is sent
/// by one member to another; `url` always names the sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    You { url: PeerId },
    Add { url: PeerId },
    Remove { url: PeerId },
    Peer { url: PeerId, body: PeerBody },
}

impl Envelope {
    pub fn identity(&self) -> &PeerId {
        match self {
            Self::You { url } | Self::Add { url } | Self::Remove { url } | Self::Peer { url, .. } => {
                url
            }
        }
    }
}

/// Payload of a `peer` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireBody", into = "WireBody")]
pub enum PeerBody {
    Offer { sdp: String },
    Answer { sdp: String },
    Candidate(IceCandidate),
    /// Free text typed by the remote user. Not part of negotiation.
    Chat { message: String },
}

impl PeerBody {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::Candidate(_) => "candidate",
            Self::Chat { .. } => "chat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
}

/// Browser-shaped session description (`RTCSessionDescriptionInit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    pub sdp: String,
}

/// Browser-shaped ICE candidate (`RTCIceCandidateInit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    pub candidate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,
    #[serde(
        default,
        rename = "sdpMLineIndex",
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }
}

// On the wire a candidate is told apart from a description only by its
// `candidate` field, so it must be tried first.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireBody {
    Candidate(IceCandidate),
    Description(SessionDescription),
    Text(TextBody),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TextBody {
    Chat { message: String },
}

impl From<WireBody> for PeerBody {
    fn from(body: WireBody) -> Self {
        match body {
            WireBody::Candidate(candidate) => Self::Candidate(candidate),
            WireBody::Text(TextBody::Chat { message }) => Self::Chat { message },
            WireBody::Description(SessionDescription {
                sdp_type: SdpType::Offer,
                sdp,
            }) => Self::Offer { sdp },
            WireBody::Description(SessionDescription {
                sdp_type: SdpType::Answer,
                sdp,
            }) => Self::Answer { sdp },
        }
    }
}

impl From<PeerBody> for WireBody {
    fn from(body: PeerBody) -> Self {
        match body {
            PeerBody::Offer { sdp } => Self::Description(SessionDescription {
                sdp_type: SdpType::Offer,
                sdp,
            }),
            PeerBody::Answer { sdp } => Self::Description(SessionDescription {
                sdp_type: SdpType::Answer,
                sdp,
            }),
            PeerBody::Candidate(candidate) => Self::Candidate(candidate),
            PeerBody::Chat { message } => Self::Text(TextBody::Chat { message }),
        }
    }
}
