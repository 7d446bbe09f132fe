use crate::transport::media::RemoteTrack;
use meshroom_core::{PeerId, Signal};

/// Events a transport reports back to the link manager.
#[derive(Debug)]
pub enum TransportEvent {
    /// Local negotiation payload that must reach the remote side.
    NegotiationPayload(PeerId, Signal),

    /// Media can flow.
    Connected(PeerId),

    /// Remote side started sending a track.
    RemoteTrack(PeerId, RemoteTrack),

    /// Negotiation or connectivity failed for good.
    Failed(PeerId, String),

    /// Transport shut down.
    Closed(PeerId),
}
