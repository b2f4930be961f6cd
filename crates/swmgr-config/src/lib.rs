//! Configuration for the swmgr CLI.
//!
//! TOML device inventory, community resolution (env + plaintext), and
//! translation to `swmgr_core::DeviceConfig`. The core crate never reads
//! files; everything disk-related lives here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use swmgr_core::config::{
    DEFAULT_COMMUNITY, DEFAULT_POLL_INTERVAL, DEFAULT_PORT, DEFAULT_RETRIES, DEFAULT_TIMEOUT,
    DEFAULT_UPTIME_POLL_INTERVAL,
};
use swmgr_core::{CustomOids, DeviceConfig, DeviceEndpoint, OidField, RuleConfig, parse_oid};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no device named '{name}' in config")]
    UnknownDevice { name: String },

    #[error("no devices configured")]
    NoDevices,

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

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Global defaults applied to every device.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named devices.
    #[serde(default)]
    pub devices: BTreeMap<String, DeviceEntry>,

    /// Classification and rename rules shared by all devices.
    #[serde(default)]
    pub rules: RuleConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_community")]
    pub community: String,

    /// Per-request timeout in seconds; fractions allowed.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,

    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Background poll cadence. Zero disables the poll task.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_uptime_poll_interval_secs")]
    pub uptime_poll_interval_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            port: default_port(),
            community: default_community(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            poll_interval_secs: default_poll_interval_secs(),
            uptime_poll_interval_secs: default_uptime_poll_interval_secs(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_community() -> String {
    DEFAULT_COMMUNITY.into()
}
fn default_timeout_secs() -> f64 {
    DEFAULT_TIMEOUT.as_secs_f64()
}
fn default_retries() -> u32 {
    DEFAULT_RETRIES
}
fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}
fn default_uptime_poll_interval_secs() -> u64 {
    DEFAULT_UPTIME_POLL_INTERVAL.as_secs()
}

/// One polled switch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DeviceEntry {
    /// Hostname or IP address.
    pub host: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Community string (plaintext; prefer `community_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community: Option<String>,

    /// Environment variable holding the community string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_community: Option<String>,

    /// Display name; replaces the hostname the device reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_poll_interval_secs: Option<u64>,

    /// Field name (`manufacturer`, `model`, `firmware`, `hostname`,
    /// `uptime`) to dotted OID.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_oids: BTreeMap<String, String>,
}

impl DeviceEntry {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "swmgr", "swmgr").map_or_else(
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
    p.push("swmgr");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from an explicit file, layered as defaults → file → `SWMGR_` env.
///
/// Nested env keys use a double underscore:
/// `SWMGR_DEFAULTS__COMMUNITY=private`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SWMGR_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to pretty TOML, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Device resolution ───────────────────────────────────────────────

/// Resolve the community string: named env var, then the device's
/// plaintext value, then the global default.
pub fn resolve_community(entry: &DeviceEntry, defaults: &Defaults) -> SecretString {
    if let Some(val) = entry
        .community_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return SecretString::from(val);
    }
    SecretString::from(
        entry
            .community
            .clone()
            .unwrap_or_else(|| defaults.community.clone()),
    )
}

/// Validate a device's custom OID table.
pub fn custom_oids(name: &str, entry: &DeviceEntry) -> Result<CustomOids, ConfigError> {
    let mut oids = CustomOids::default();
    for (key, raw) in &entry.custom_oids {
        let field = OidField::from_str(key).map_err(|_| ConfigError::Validation {
            field: format!("devices.{name}.custom_oids"),
            reason: format!(
                "unknown field '{key}' (expected manufacturer, model, firmware, hostname or uptime)"
            ),
        })?;
        if raw.trim().is_empty() {
            continue;
        }
        let oid = parse_oid(raw).map_err(|e| ConfigError::Validation {
            field: format!("devices.{name}.custom_oids.{key}"),
            reason: e.to_string(),
        })?;
        oids.set(field, Some(oid));
    }
    Ok(oids)
}

fn duration_secs(field: &str, secs: f64) -> Result<Duration, ConfigError> {
    match Duration::try_from_secs_f64(secs) {
        Ok(d) if !d.is_zero() => Ok(d),
        _ => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected a positive number of seconds, got {secs}"),
        }),
    }
}

/// Build a `DeviceConfig` for one named entry.
pub fn device_to_config(
    name: &str,
    entry: &DeviceEntry,
    defaults: &Defaults,
    rules: &RuleConfig,
) -> Result<DeviceConfig, ConfigError> {
    let host = entry.host.trim();
    if host.is_empty() {
        return Err(ConfigError::Validation {
            field: format!("devices.{name}.host"),
            reason: "host must not be empty".into(),
        });
    }

    let endpoint = DeviceEndpoint {
        host: host.to_owned(),
        port: entry.port.unwrap_or(defaults.port),
        community: resolve_community(entry, defaults),
        override_port: entry.override_port,
        override_community: entry.override_community.clone().map(SecretString::from),
    };

    let timeout = duration_secs(
        &format!("devices.{name}.timeout_secs"),
        entry.timeout_secs.unwrap_or(defaults.timeout_secs),
    )?;

    Ok(DeviceConfig {
        name: entry
            .override_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(ToOwned::to_owned),
        endpoint,
        custom_oids: custom_oids(name, entry)?,
        timeout,
        retries: defaults.retries,
        poll_interval: Duration::from_secs(defaults.poll_interval_secs),
        uptime_poll_interval: Duration::from_secs(
            entry
                .uptime_poll_interval_secs
                .unwrap_or(defaults.uptime_poll_interval_secs),
        ),
        rules: rules.clone(),
    })
}

impl Config {
    /// Resolve one named device.
    pub fn device(&self, name: &str) -> Result<DeviceConfig, ConfigError> {
        let entry = self
            .devices
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDevice { name: name.into() })?;
        device_to_config(name, entry, &self.defaults, &self.rules)
    }

    /// Resolve every configured device, keyed by config name.
    pub fn all_devices(&self) -> Result<Vec<(String, DeviceConfig)>, ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::NoDevices);
        }
        self.devices
            .keys()
            .map(|name| Ok((name.clone(), self.device(name)?)))
            .collect()
    }
}
