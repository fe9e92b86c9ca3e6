//! Layered server configuration:
//! 1) defaults -> 2) YAML (if provided) -> 3) env (`CALCULATOR_SERVER__*`) -> 4) CLI overrides

use std::path::Path;

use anyhow::Context;
use calculator::api::web::build_cors_layer;
use calculator::{CorsConfig, ServerConfig};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

pub const ENV_PREFIX: &str = "CALCULATOR_SERVER__";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load defaults, then the YAML file if given, then environment overrides.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        figment
            .extract()
            .context("failed to load calculator server configuration")
    }

    /// Apply `--port` and `-v` flags.
    ///
    /// # Errors
    /// Returns an error if `--port` is given but `listen_addr` does not parse.
    pub fn apply_cli_overrides(&mut self, port: Option<u16>, verbose: u8) -> anyhow::Result<()> {
        if let Some(port) = port {
            let mut addr = self.server.socket_addr()?;
            addr.set_port(port);
            self.server.listen_addr = addr.to_string();
        }

        match verbose {
            0 => {}
            1 => "info".clone_into(&mut self.logging.level),
            2 => "debug".clone_into(&mut self.logging.level),
            _ => "trace".clone_into(&mut self.logging.level),
        }
        Ok(())
    }

    /// Check everything the server needs before binding.
    ///
    /// # Errors
    /// Returns the first invalid setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server.socket_addr()?;
        build_cors_layer(&self.cors)?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use figment::Jail;

    use super::*;
    use crate::logging::LogFormat;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.listen_addr, "0.0.0.0:5001");
        assert_eq!(cfg.cors.allowed_origins, vec!["*"]);
        assert_eq!(cfg.logging.level, "info");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_yaml_then_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "server.yaml",
                r#"
server:
  listen_addr: "127.0.0.1:6000"
cors:
  max_age_seconds: 30
logging:
  format: json
"#,
            )?;
            jail.set_env("CALCULATOR_SERVER__LOGGING__LEVEL", "debug");

            let cfg = AppConfig::load(Some(Path::new("server.yaml"))).map_err(|e| e.to_string())?;
            assert_eq!(cfg.server.listen_addr, "127.0.0.1:6000");
            assert_eq!(cfg.cors.max_age_seconds, 30);
            assert_eq!(cfg.cors.allowed_methods, vec!["POST", "OPTIONS"]);
            assert_eq!(cfg.logging.format, LogFormat::Json);
            assert_eq!(cfg.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_cli_overrides() {
        let mut cfg = AppConfig::default();
        cfg.apply_cli_overrides(Some(7000), 2).unwrap();
        assert_eq!(cfg.server.listen_addr, "0.0.0.0:7000");
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn test_port_override_needs_valid_addr() {
        let mut cfg = AppConfig::default();
        cfg.server.listen_addr = "not-an-addr".to_owned();
        assert!(cfg.apply_cli_overrides(Some(7000), 0).is_err());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_print_config_is_json() {
        let json = AppConfig::default().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["server"]["listen_addr"], "0.0.0.0:5001");
    }
}
