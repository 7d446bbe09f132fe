use meshroom_core::{ClientMessage, PeerId, RoomId, Signal};
use tokio::sync::oneshot;

/// Commands fed into the signaling hub by the WebSocket tasks.
#[derive(Debug)]
pub enum RoomCommand {
    /// The connection asked to enter a room.
    JoinRoom { peer_id: PeerId, room: RoomId },

    /// Offer to relay to `target`. `caller` is forwarded as the sender wrote it.
    Offer {
        peer_id: PeerId,
        target: PeerId,
        caller: PeerId,
        signal: Signal,
    },

    /// Answer to relay to `target`, stamped with the sender's own id.
    Answer {
        peer_id: PeerId,
        target: PeerId,
        signal: Signal,
    },

    /// The WebSocket closed.
    Disconnect { peer_id: PeerId },

    /// Read-only view of a room's members, in join order.
    Snapshot {
        room: RoomId,
        reply: oneshot::Sender<Vec<PeerId>>,
    },
}

impl RoomCommand {
    pub fn from_client(peer_id: PeerId, msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::JoinRoom(room) => Self::JoinRoom { peer_id, room },
            ClientMessage::Offer {
                target,
                caller,
                signal,
            } => Self::Offer {
                peer_id,
                target,
                caller,
                signal,
            },
            ClientMessage::Answer { target, signal } => Self::Answer {
                peer_id,
                target,
                signal,
            },
        }
    }
}
