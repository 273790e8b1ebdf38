use thiserror::Error;

/// Failures reported by an underlying media connection.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("remote description is not set")]
    NoRemoteDescription,

    #[error("connection is closed")]
    Closed,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("relay connection is closed")]
    Closed,

    #[error("websocket error: {0}")]
    WebSocket(String),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("local media is unavailable: {0}")]
    Unavailable(String),
}

/// Reasons an inbound relay frame is dropped.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame has no \"type\" tag")]
    MissingType,

    #[error("unrecognized envelope type \"{0}\"")]
    UnknownType(String),

    #[error("malformed \"{tag}\" envelope: {source}")]
    Malformed {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
