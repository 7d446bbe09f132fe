pub mod config;
pub mod error;
pub mod peer;
pub mod session;
pub mod signaling;
pub mod transport;

pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use peer::{LinkRole, LinkSnapshot, LinkState, PeerLink, PeerLinkManager};
pub use session::MeshSession;
pub use signaling::{SignalingConnection, SignalingSink, WsSignaling};
pub use transport::{
    LocalStream, PeerTransport, RemoteTrack, TransportConfig, TransportEvent, TransportFactory,
    WebRtcTransport, WebRtcTransportFactory,
};
