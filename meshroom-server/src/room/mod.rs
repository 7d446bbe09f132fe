mod room_command;
mod room_registry;
mod signaling_hub;

pub use room_command::*;
pub use room_registry::*;
pub use signaling_hub::*;
