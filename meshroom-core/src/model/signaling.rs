use crate::model::peer::PeerId;
use crate::model::room::RoomId;
use crate::model::signal::Signal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Frames a participant sends to the signaling server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinRoom(RoomId),
    Offer {
        target: PeerId,
        caller: PeerId,
        signal: Signal,
    },
    Answer {
        target: PeerId,
        signal: Signal,
    },
}

/// Frames the signaling server pushes to a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// First frame on every connection: the identifier the server assigned.
    Welcome { id: PeerId },
    IceConfig { ice_servers: Vec<IceServerConfig> },
    /// Reply to `join-room`, in join order, never containing the joiner.
    OtherParticipants(Vec<PeerId>),
    Offer { signal: Signal, caller: PeerId },
    Answer { signal: Signal, caller: PeerId },
    ParticipantDeparted(PeerId),
}
