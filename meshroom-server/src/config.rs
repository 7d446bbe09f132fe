use meshroom_core::IceServerConfig;
use meshroom_core::utils::default_ice_servers;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_COMMAND_BUFFER: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),
    #[error("invalid HOST value '{0}'")]
    InvalidHost(String),
}

/// Settings for the signaling server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Handed to every client in the `ice-config` frame.
    pub ice_servers: Vec<IceServerConfig>,
    /// Capacity of the hub's command channel.
    pub command_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            ice_servers: default_ice_servers(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `STUN_URL`, `TURN_URL`, `TURN_USERNAME` and
    /// `TURN_CREDENTIAL` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host.parse().map_err(|_| ConfigError::InvalidHost(host))?;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }

        if let Some(stun_url) = lookup("STUN_URL") {
            config.ice_servers = vec![IceServerConfig {
                urls: vec![stun_url],
                username: None,
                credential: None,
            }];
        }
        if let Some(turn_url) = lookup("TURN_URL") {
            config.ice_servers.push(IceServerConfig {
                urls: vec![turn_url],
                username: lookup("TURN_USERNAME"),
                credential: lookup("TURN_CREDENTIAL"),
            });
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Swaps the STUN entries for `urls`. TURN entries are left alone.
    pub fn replace_stun_servers(&mut self, urls: Vec<String>) {
        if urls.is_empty() {
            return;
        }

        self.ice_servers.retain(|server| !is_stun_only(server));
        let stun = urls.into_iter().map(|url| IceServerConfig {
            urls: vec![url],
            username: None,
            credential: None,
        });
        self.ice_servers.splice(0..0, stun);
    }
}

fn is_stun_only(server: &IceServerConfig) -> bool {
    !server.urls.is_empty()
        && server
            .urls
            .iter()
            .all(|url| url.starts_with("stun:") || url.starts_with("stuns:"))
}
