use meshroom_core::PeerId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    WebRtc(#[from] webrtc::Error),
    #[error("malformed signal: {0}")]
    MalformedSignal(#[from] serde_json::Error),
    #[error("negotiation failed: {0}")]
    Negotiation(String),
    #[error("transport for {0} is closed")]
    Closed(PeerId),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("signaling connection closed")]
    SignalingClosed,
    #[error("server did not send a welcome frame in time")]
    NoWelcome,
    #[error("no local media stream available")]
    NoLocalMedia,
    #[error("answer from {0} without a pending offer")]
    UnexpectedAnswer(PeerId),
    #[error("offer from {0} collides with an outbound link")]
    OfferCollision(PeerId),
    #[error("session task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
