//! Client configuration:
//! 1) defaults -> 2) YAML (if present) -> 3) env (`CALCULATOR__*`) -> 4) `SERVER_URL`

use std::path::Path;

use anyhow::Context;
use calculator_sdk::ClientConfig;
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;

pub const DEFAULT_CONFIG_FILE: &str = "calculator-cli.yaml";
pub const ENV_PREFIX: &str = "CALCULATOR__";
pub const SERVER_URL_ENV: &str = "SERVER_URL";

/// Load the client configuration.
///
/// `path` must exist when given; otherwise [`DEFAULT_CONFIG_FILE`] is read if
/// present in the working directory.
///
/// # Errors
/// Returns an error if a value is malformed or no server URL is configured.
pub fn load(path: Option<&Path>) -> anyhow::Result<ClientConfig> {
    let mut figment = Figment::from(Serialized::defaults(ClientConfig::default()));

    match path {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file_exact(path));
        }
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            if default.is_file() {
                figment = figment.merge(Yaml::file_exact(default));
            }
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Ok(url) = std::env::var(SERVER_URL_ENV) {
        let url = url.trim();
        if !url.is_empty() {
            figment = figment.merge(Serialized::default("server_url", url));
        }
    }

    let cfg: ClientConfig = figment
        .extract()
        .context("failed to load calculator client configuration")?;

    if cfg.server_url.trim().is_empty() {
        anyhow::bail!(
            "Server URL not configured. Please set either:\n\
             1. Environment variable '{SERVER_URL_ENV}', or\n\
             2. 'server_url' in {DEFAULT_CONFIG_FILE} (or the file passed with --config)"
        );
    }
    cfg.validate()?;
    Ok(cfg)
}
