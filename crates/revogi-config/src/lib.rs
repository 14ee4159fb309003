//! Shared configuration for the revogi CLI.
//!
//! TOML config file, `REVOGI_*` environment overrides, password resolution
//! (env + keyring + plaintext), per-device port overrides, and translation
//! to `revogi_api::ClientConfig`. The CLI layers its flag overrides on top.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use revogi_api::{ClientConfig, DEFAULT_API_URL, PortState, TlsMode, TransportConfig};

/// Keyring service under which passwords are stored, keyed by username.
pub const KEYRING_SERVICE: &str = "revogi";

/// Environment variable that always wins for the password.
pub const PASSWORD_ENV: &str = "REVOGI_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no username configured")]
    NoUsername,

    #[error("no password found for '{username}'")]
    NoPassword { username: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Account username (e-mail address).
    pub username: Option<String>,

    /// Password (plaintext; prefer the keyring or `REVOGI_PASSWORD`).
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    pub password_env: Option<String>,

    /// Relay base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Seconds between polls in `watch`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Session renewals allowed after an expired token.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds to wait after the relay reports a server error.
    #[serde(default = "default_cooldown")]
    pub cooldown: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub insecure: bool,

    /// Extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,

    /// Per-device overrides, keyed by serial number.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceOverrides>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            password_env: None,
            api_url: default_api_url(),
            poll_interval: default_poll_interval(),
            max_retries: default_max_retries(),
            cooldown: default_cooldown(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
            devices: BTreeMap::new(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_poll_interval() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_cooldown() -> u64 {
    10
}
fn default_timeout() -> u64 {
    30
}

/// Overrides for one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeviceOverrides {
    /// Local name shown instead of the relay's device name.
    pub alias: Option<String>,

    #[serde(default)]
    pub ports: Vec<PortOverride>,
}

impl DeviceOverrides {
    pub fn port(&self, port: u8) -> Option<&PortOverride> {
        self.ports.iter().find(|p| p.port == port)
    }
}

/// Desired state and/or draw ceiling for a single 1-based port.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PortOverride {
    pub port: u8,

    /// State `apply` enforces.
    pub state: Option<PortState>,

    /// Draw above which `watch` warns.
    pub max_watts: Option<i64>,
}

impl Config {
    /// Check values figment cannot type-check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_url()?;

        if self.poll_interval == 0 {
            return Err(invalid("poll_interval", "must be at least 1 second"));
        }
        if self.timeout == 0 {
            return Err(invalid("timeout", "must be at least 1 second"));
        }

        for (sn, overrides) in &self.devices {
            let mut seen = BTreeSet::new();
            for port in &overrides.ports {
                if port.port == 0 {
                    return Err(invalid(
                        &format!("devices.{sn}.ports"),
                        "ports are numbered from 1",
                    ));
                }
                if !seen.insert(port.port) {
                    return Err(invalid(
                        &format!("devices.{sn}.ports"),
                        format!("port {} listed twice", port.port),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn api_url(&self) -> Result<url::Url, ConfigError> {
        self.api_url
            .parse()
            .map_err(|e| invalid("api_url", format!("{e}: {}", self.api_url)))
    }

    pub fn username(&self) -> Result<&str, ConfigError> {
        self.username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::NoUsername)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn device(&self, sn: &str) -> Option<&DeviceOverrides> {
        self.devices.get(sn)
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = if self.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.timeout),
        }
    }

    /// Build the client config with an already resolved password.
    pub fn client_config(&self, password: SecretString) -> Result<ClientConfig, ConfigError> {
        self.validate()?;
        Ok(ClientConfig::new(self.username()?, password)
            .with_api_url(self.api_url()?)
            .with_max_retries(self.max_retries)
            .with_cooldown(Duration::from_secs(self.cooldown))
            .with_transport(self.transport()))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("net", "revogi", "revogi").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("revogi");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` + environment.
///
/// A missing file is not an error; defaults and `REVOGI_*` variables still
/// apply. Nested keys use a double underscore, e.g.
/// `REVOGI_DEVICES__SWW1__ALIAS`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REVOGI_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to pretty TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the account password.
///
/// Order: `REVOGI_PASSWORD`, the variable named by `password_env`, the
/// system keyring, then plaintext `password`.
pub fn resolve_password(cfg: &Config) -> Result<SecretString, ConfigError> {
    let username = cfg.username()?;

    // 1. Env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    // 2. Named env var
    if let Some(ref env_name) = cfg.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, username) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = cfg.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoPassword {
        username: username.into(),
    })
}

/// Store a password in the system keyring.
pub fn store_password(username: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, username)?;
    entry.set_password(password)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.poll_interval, 30);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.cooldown, 10);
        assert!(config.devices.is_empty());
    }

    #[test]
    fn loads_device_overrides() {
        let (_dir, path) = write_config(
            r#"
            username = "me@example.com"
            poll_interval = 15
            max_retries = 5

            [devices.SWW6010040000001]
            alias = "desk"

            [[devices.SWW6010040000001.ports]]
            port = 1
            state = "on"

            [[devices.SWW6010040000001.ports]]
            port = 3
            state = "off"
            max_watts = 150
            "#,
        );

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.username().unwrap(), "me@example.com");
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.max_retries, 5);

        let desk = config.device("SWW6010040000001").unwrap();
        assert_eq!(desk.alias.as_deref(), Some("desk"));
        assert_eq!(desk.port(1).unwrap().state, Some(PortState::On));
        assert_eq!(desk.port(3).unwrap().max_watts, Some(150));
        assert_eq!(desk.port(2), None);
    }

    #[test]
    fn rejects_duplicate_port_override() {
        let (_dir, path) = write_config(
            r"
            [[devices.SWW1.ports]]
            port = 2
            [[devices.SWW1.ports]]
            port = 2
            ",
        );

        let err = load_config_from(&path).unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation { ref field, .. } if field == "devices.SWW1.ports"),
            "got: {err:?}"
        );
    }

    #[test]
    fn rejects_bad_api_url() {
        let config = Config {
            api_url: "not a url".into(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config {
            username: Some("me@example.com".into()),
            cooldown: 2,
            ..Config::default()
        };
        config.devices.insert(
            "SWW1".into(),
            DeviceOverrides {
                alias: None,
                ports: vec![PortOverride {
                    port: 4,
                    state: Some(PortState::Off),
                    max_watts: None,
                }],
            },
        );

        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn client_config_carries_policy() {
        let config = Config {
            username: Some("me@example.com".into()),
            api_url: "http://127.0.0.1:9000".into(),
            max_retries: 7,
            cooldown: 4,
            insecure: true,
            ..Config::default()
        };

        let client = config
            .client_config(SecretString::from("pw".to_owned()))
            .unwrap();

        assert_eq!(client.username, "me@example.com");
        assert_eq!(client.password.expose_secret(), "pw");
        assert_eq!(client.api_url.as_str(), "http://127.0.0.1:9000/");
        assert_eq!(client.max_retries, 7);
        assert_eq!(client.cooldown, Duration::from_secs(4));
        assert!(matches!(client.transport.tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn client_config_requires_username() {
        let err = Config::default()
            .client_config(SecretString::from("pw".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::NoUsername));
    }
}
