//! Client configuration passed explicitly to every client constructor.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::web::GrpcWebMode;

/// Which binding a client speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Native gRPC over HTTP/2.
    #[default]
    Grpc,
    /// gRPC-Web over plain HTTP.
    GrpcWeb,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ClientConfigError {
    #[error("server_url is not configured")]
    MissingServerUrl,
    #[error("server_url '{0}' must start with http:// or https://")]
    InvalidServerUrl(String),
}

/// Configuration of a calculator client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the server, e.g. `http://localhost:5001`.
    pub server_url: String,
    pub transport: TransportKind,
    /// Framing used by the gRPC-Web client.
    pub web_mode: GrpcWebMode,
    pub connect_timeout_ms: u64,
    pub rpc_timeout_ms: u64,
    /// Extra attempts after the first one, for connects and retryable calls.
    pub max_retries: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Compute locally when the server is unreachable.
    pub fallback: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            transport: TransportKind::default(),
            web_mode: GrpcWebMode::default(),
            connect_timeout_ms: 5_000,
            rpc_timeout_ms: 10_000,
            max_retries: 1,
            base_backoff_ms: 100,
            max_backoff_ms: 2_000,
            fallback: true,
        }
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub fn with_web_mode(mut self, mode: GrpcWebMode) -> Self {
        self.web_mode = mode;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = duration_to_u64_ms(timeout);
        self
    }

    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout_ms = duration_to_u64_ms(timeout);
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff_ms = duration_to_u64_ms(base);
        self.max_backoff_ms = duration_to_u64_ms(max);
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled;
        self
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    #[must_use]
    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    #[must_use]
    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    #[must_use]
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Server URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    /// # Errors
    /// Returns an error if the server URL is empty or has no http(s) scheme.
    pub fn validate(&self) -> Result<(), ClientConfigError> {
        let url = self.server_url.trim();
        if url.is_empty() {
            return Err(ClientConfigError::MissingServerUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientConfigError::InvalidServerUrl(url.to_owned()));
        }
        Ok(())
    }
}

pub(crate) fn duration_to_u64_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.transport, TransportKind::Grpc);
        assert_eq!(cfg.web_mode, GrpcWebMode::Text);
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.rpc_timeout(), Duration::from_secs(10));
        assert!(cfg.fallback);
        assert!(cfg.max_backoff() >= cfg.base_backoff());
    }

    #[test]
    fn test_config_builder() {
        let cfg = ClientConfig::new("http://localhost:5001/")
            .with_transport(TransportKind::GrpcWeb)
            .with_web_mode(GrpcWebMode::Binary)
            .with_max_retries(0)
            .with_connect_timeout(Duration::from_millis(250))
            .with_rpc_timeout(Duration::from_secs(2))
            .with_fallback(false);

        assert_eq!(cfg.base_url(), "http://localhost:5001");
        assert_eq!(cfg.transport, TransportKind::GrpcWeb);
        assert_eq!(cfg.web_mode, GrpcWebMode::Binary);
        assert_eq!(cfg.max_retries, 0);
        assert_eq!(cfg.connect_timeout_ms, 250);
        assert_eq!(cfg.rpc_timeout_ms, 2_000);
        assert!(!cfg.fallback);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            ClientConfig::default().validate(),
            Err(ClientConfigError::MissingServerUrl)
        );
        assert!(matches!(
            ClientConfig::new("localhost:5001").validate(),
            Err(ClientConfigError::InvalidServerUrl(_))
        ));
        let cfg = ClientConfig::new("https://calc.example.com");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial() {
        let cfg: ClientConfig = serde_json::from_value(serde_json::json!({
            "server_url": "http://127.0.0.1:5001",
            "transport": "grpc_web",
            "web_mode": "binary",
            "fallback": false
        }))
        .unwrap();

        assert_eq!(cfg.transport, TransportKind::GrpcWeb);
        assert_eq!(cfg.web_mode, GrpcWebMode::Binary);
        assert!(!cfg.fallback);
        assert_eq!(cfg.rpc_timeout_ms, ClientConfig::default().rpc_timeout_ms);
    }
}
