use crate::error::TransportError;
use crate::peer::LinkRole;
use crate::transport::media::LocalStream;
use crate::transport::transport_event::TransportEvent;
use async_trait::async_trait;
use meshroom_core::{IceServerConfig, PeerId, Signal};
use tokio::sync::mpsc;

/// One negotiation-and-media session with a single remote participant.
///
/// Implementations never block the caller on negotiation: results come back
/// as [`TransportEvent`]s.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Hands a relayed payload to the transport. Payloads are applied in the
    /// order they are fed.
    async fn feed_signal(&self, signal: Signal) -> Result<(), TransportError>;

    /// Stops negotiation and releases every resource held for the link.
    async fn close(&self) -> Result<(), TransportError>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        peer_id: PeerId,
        role: LinkRole,
        local_stream: &LocalStream,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn PeerTransport>, TransportError>;

    /// Called when the server announces its ICE setup.
    fn update_ice_servers(&self, _ice_servers: Vec<IceServerConfig>) {}
}
