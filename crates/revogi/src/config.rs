//! CLI configuration: thin wrapper around `revogi_config`.
//!
//! Loads the file named by `--config` (or the platform default) and layers
//! `GlobalOpts` flag overrides on top before building the client.

use std::path::PathBuf;

use revogi_api::RevogiClient;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use revogi_config::{Config, config_path};

/// The config file this invocation reads and writes.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load the config file and apply CLI flag overrides.
///
/// Flags win over environment variables, which win over the file.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = revogi_config::load_config_from(&config_file(global))?;

    if let Some(ref username) = global.username {
        cfg.username = Some(username.clone());
    }
    if let Some(ref api_url) = global.api_url {
        cfg.api_url.clone_from(api_url);
    }
    if global.insecure {
        cfg.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    if let Some(max_retries) = global.max_retries {
        cfg.max_retries = max_retries;
    }
    if let Some(cooldown) = global.cooldown {
        cfg.cooldown = cooldown;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Resolve credentials and build a relay client.
pub fn build_client(cfg: &Config) -> Result<RevogiClient, CliError> {
    let password = revogi_config::resolve_password(cfg)?;
    let client_config = cfg.client_config(password)?;
    Ok(RevogiClient::new(client_config)?)
}

/// Display name for a device: config alias, then relay name, then serial.
pub fn device_label(cfg: &Config, sn: &str, relay_name: &str) -> String {
    cfg.device(sn)
        .and_then(|d| d.alias.clone())
        .or_else(|| Some(relay_name.to_owned()).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| sn.to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use revogi_config::DeviceOverrides;

    use super::*;

    #[test]
    fn label_prefers_alias() {
        let mut cfg = Config::default();
        cfg.devices.insert(
            "SWW1".into(),
            DeviceOverrides {
                alias: Some("desk".into()),
                ports: Vec::new(),
            },
        );

        assert_eq!(device_label(&cfg, "SWW1", "SmartStrip"), "desk");
        assert_eq!(device_label(&cfg, "SWW2", "SmartStrip"), "SmartStrip");
        assert_eq!(device_label(&cfg, "SWW3", ""), "SWW3");
    }
}
