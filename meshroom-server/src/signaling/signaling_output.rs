use async_trait::async_trait;
use meshroom_core::{PeerId, ServerMessage};

/// Outbound side of the signaling connections, as seen by the hub.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Queue `msg` for one connection. Returns `false` when the connection
    /// is not (or no longer) registered; the frame is dropped in that case.
    async fn send_signal(&self, peer_id: &PeerId, msg: ServerMessage) -> bool;
}
