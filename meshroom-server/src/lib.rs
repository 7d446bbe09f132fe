pub mod config;
mod room;
mod server;
mod signaling;

pub use config::{ConfigError, ServerConfig};
pub use room::*;
pub use server::*;
pub use signaling::*;
