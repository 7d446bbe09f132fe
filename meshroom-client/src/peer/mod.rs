mod peer_link;
mod peer_link_manager;

pub use peer_link::*;
pub use peer_link_manager::*;
