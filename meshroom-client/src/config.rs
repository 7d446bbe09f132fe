use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8000/ws";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the signaling server.
    pub server_url: String,
    /// How long to wait for the `welcome` frame after connecting.
    pub welcome_timeout: Duration,
    /// Capacity of the channel transports report their events on.
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_owned(),
            welcome_timeout: Duration::from_secs(5),
            event_buffer: 256,
        }
    }
}

impl ClientConfig {
    pub fn with_server_url(url: impl Into<String>) -> Self {
        Self {
            server_url: url.into(),
            ..Self::default()
        }
    }
}
