use crate::error::ClientError;
use meshroom_core::ClientMessage;

/// Outbound half of the signaling channel as seen by the link manager.
///
/// `send` only queues the frame; delivery happens on the connection's
/// writer task.
pub trait SignalingSink: Send + Sync {
    fn send(&self, msg: ClientMessage) -> Result<(), ClientError>;
}
