mod peer;
mod room;
mod signal;
mod signaling;

pub use peer::PeerId;
pub use room::RoomId;
pub use signal::Signal;
pub use signaling::{ClientMessage, IceServerConfig, ServerMessage};
