use std::fmt;

/// Where one peer's offer/answer exchange stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    New,
    /// Local offer requested or emitted; waiting for the answer.
    OfferSent,
    /// Remote answer handed to the connection, not applied yet.
    AnswerPending,
    /// Remote offer handed to the connection; local answer being created.
    OfferReceived,
    AnswerSent,
    Connected,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationInput {
    Initiate,
    RemoteOffer,
    LocalOfferReady,
    RemoteAnswer,
    RemoteAnswerApplied,
    LocalAnswerReady,
    TransportConnected,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Offerer,
    Answerer,
}

impl NegotiationState {
    /// Transition table. `None` means the input is not valid in this state.
    pub fn next(self, input: NegotiationInput) -> Option<Self> {
        use NegotiationInput as I;
        use NegotiationState as S;

        match (self, input) {
            (S::Closed, _) => None,
            (_, I::Close) => Some(S::Closed),

            (S::New, I::Initiate) => Some(S::OfferSent),
            (S::New, I::RemoteOffer) => Some(S::OfferReceived),

            (S::OfferSent, I::LocalOfferReady) => Some(S::OfferSent),
            (S::OfferSent, I::RemoteAnswer) => Some(S::AnswerPending),
            (S::AnswerPending, I::RemoteAnswerApplied) => Some(S::Connected),
            (S::AnswerPending, I::TransportConnected) => Some(S::Connected),

            (S::OfferReceived, I::LocalAnswerReady) => Some(S::AnswerSent),
            (S::AnswerSent, I::TransportConnected) => Some(S::Connected),

            _ => None,
        }
    }

    /// A local offer is outstanding; an incoming offer now is a collision.
    pub fn has_local_offer(self) -> bool {
        matches!(self, Self::OfferSent | Self::AnswerPending)
    }

    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

impl fmt::Display for NegotiationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NegotiationState::New => "new",
            NegotiationState::OfferSent => "offer-sent",
            NegotiationState::AnswerPending => "answer-pending",
            NegotiationState::OfferReceived => "offer-received",
            NegotiationState::AnswerSent => "answer-sent",
            NegotiationState::Connected => "connected",
            NegotiationState::Closed => "closed",
        };
        f.write_str(name)
    }
}
