//! Server-side configuration shared by the hosting loop and the server binary.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use serde::{Deserialize, Serialize};

const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 5001));

#[derive(thiserror::Error, Debug)]
pub enum ServerConfigError {
    #[error("invalid listen_addr '{addr}': {source}")]
    InvalidListenAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid CORS origin '{0}'")]
    InvalidOrigin(String),
    #[error("invalid CORS method '{0}'")]
    InvalidMethod(String),
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP address to bind, `"127.0.0.1:0"` for an ephemeral port.
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

impl ServerConfig {
    /// # Errors
    /// Returns [`ServerConfigError::InvalidListenAddr`] if the address does not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerConfigError> {
        self.listen_addr
            .parse()
            .map_err(|source| ServerConfigError::InvalidListenAddr {
                addr: self.listen_addr.clone(),
                source,
            })
    }
}

/// CORS settings for browser (gRPC-Web) callers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `["*"]` allows any origin.
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    /// Preflight cache lifetime; `0` omits the header.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_owned()],
            allowed_methods: vec!["POST".to_owned(), "OPTIONS".to_owned()],
            max_age_seconds: 600,
        }
    }
}
