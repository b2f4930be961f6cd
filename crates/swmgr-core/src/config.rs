// ── Runtime device configuration ──
//
// These types describe which device to poll and how to present it.
// They carry the community string and rule sets, but never touch disk.
// The CLI (via swmgr-config) constructs a `DeviceConfig` and hands it in.

use std::collections::BTreeSet;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::oid::{Oid, parse_oid};

pub const DEFAULT_PORT: u16 = 161;
pub const DEFAULT_COMMUNITY: &str = "public";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1500);
pub const DEFAULT_RETRIES: u32 = 1;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_UPTIME_POLL_INTERVAL: Duration = Duration::from_secs(300);
pub const MIN_UPTIME_POLL_INTERVAL: Duration = Duration::from_secs(30);
pub const MAX_UPTIME_POLL_INTERVAL: Duration = Duration::from_secs(3600);

// ── Endpoint ─────────────────────────────────────────────────────────

/// Where the agent lives and how to authenticate to it.
#[derive(Debug, Clone)]
pub struct DeviceEndpoint {
    pub host: String,
    pub port: u16,
    pub community: SecretString,
    /// Per-device overrides; they win over `port` / `community`.
    pub override_port: Option<u16>,
    pub override_community: Option<SecretString>,
}

impl DeviceEndpoint {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            community: SecretString::from(DEFAULT_COMMUNITY.to_owned()),
            override_port: None,
            override_community: None,
        }
    }

    pub fn effective_port(&self) -> u16 {
        self.override_port.unwrap_or(self.port)
    }

    pub fn effective_community(&self) -> &SecretString {
        self.override_community.as_ref().unwrap_or(&self.community)
    }

    /// `host:port`, bracketing bare IPv6 literals.
    pub fn target(&self) -> String {
        let port = self.effective_port();
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{port}", self.host)
        } else {
            format!("{}:{port}", self.host)
        }
    }
}

// ── Custom OIDs ──────────────────────────────────────────────────────

/// Identity fields that accept a user-supplied OID.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OidField {
    Manufacturer,
    Model,
    Firmware,
    Hostname,
    Uptime,
}

/// Per-field OID overrides. A configured field wins over every other
/// source whenever the device returns a non-empty value for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomOids {
    #[serde(skip_serializing_if = "Option::is_none", with = "crate::oid::dotted")]
    pub manufacturer: Option<Oid>,
    #[serde(skip_serializing_if = "Option::is_none", with = "crate::oid::dotted")]
    pub model: Option<Oid>,
    #[serde(skip_serializing_if = "Option::is_none", with = "crate::oid::dotted")]
    pub firmware: Option<Oid>,
    #[serde(skip_serializing_if = "Option::is_none", with = "crate::oid::dotted")]
    pub hostname: Option<Oid>,
    #[serde(skip_serializing_if = "Option::is_none", with = "crate::oid::dotted")]
    pub uptime: Option<Oid>,
}

impl CustomOids {
    pub fn get(&self, field: OidField) -> Option<&Oid> {
        match field {
            OidField::Manufacturer => self.manufacturer.as_ref(),
            OidField::Model => self.model.as_ref(),
            OidField::Firmware => self.firmware.as_ref(),
            OidField::Hostname => self.hostname.as_ref(),
            OidField::Uptime => self.uptime.as_ref(),
        }
    }

    pub fn set(&mut self, field: OidField, oid: Option<Oid>) {
        let slot = match field {
            OidField::Manufacturer => &mut self.manufacturer,
            OidField::Model => &mut self.model,
            OidField::Firmware => &mut self.firmware,
            OidField::Hostname => &mut self.hostname,
            OidField::Uptime => &mut self.uptime,
        };
        *slot = oid;
    }

    /// Build from raw text, skipping blank and malformed entries.
    pub fn from_raw<'a>(entries: impl IntoIterator<Item = (OidField, &'a str)>) -> Self {
        let mut oids = Self::default();
        for (field, raw) in entries {
            if raw.trim().is_empty() {
                continue;
            }
            match parse_oid(raw) {
                Ok(oid) => oids.set(field, Some(oid)),
                Err(e) => warn!(%field, error = %e, "ignoring custom OID"),
            }
        }
        oids
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

// ── Rule configuration ───────────────────────────────────────────────

/// Substring rules per match mode. Matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchRules {
    pub starts_with: Vec<String>,
    pub contains: Vec<String>,
    pub ends_with: Vec<String>,
}

impl MatchRules {
    /// The first rule matching `name`, rendered as `mode:needle`.
    pub fn matching(&self, name: &str) -> Option<String> {
        let name = name.to_lowercase();
        let modes: [(&str, &Vec<String>, fn(&str, &str) -> bool); 3] = [
            ("starts_with", &self.starts_with, |n, s| n.starts_with(s)),
            ("contains", &self.contains, |n, s| n.contains(s)),
            ("ends_with", &self.ends_with, |n, s| n.ends_with(s)),
        ];
        modes.into_iter().find_map(|(mode, needles, test)| {
            needles
                .iter()
                .map(|needle| needle.trim().to_lowercase())
                .find(|needle| !needle.is_empty() && test(&name, needle))
                .map(|needle| format!("{mode}:{needle}"))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.starts_with.is_empty() && self.contains.is_empty() && self.ends_with.is_empty()
    }
}

/// A user rename rule: regex pattern, replacement, optional note.
///
/// Replacements may reference groups as `$1`, `${name}` or `\1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameRuleSpec {
    pub pattern: String,
    pub replace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Everything the classification engine reads. Read-only during a
/// refresh pass; replacing it triggers re-discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Built-in vendor inclusion rule ids to switch off.
    pub disabled_vendor_rules: BTreeSet<String>,
    /// Built-in rename rule ids to switch off.
    pub disabled_rename_rules: BTreeSet<String>,
    /// User rename rules, applied before the built-in ones.
    pub rename: Vec<RenameRuleSpec>,
    pub include: MatchRules,
    pub exclude: MatchRules,
}

// ── Device configuration ─────────────────────────────────────────────

/// Configuration for one polled device.
///
/// Built by the CLI, passed to `Coordinator` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Display name; falls back to the reported hostname, then the host.
    pub name: Option<String>,
    pub endpoint: DeviceEndpoint,
    pub custom_oids: CustomOids,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries per request after the first attempt.
    pub retries: u32,
    /// Background poll cadence.
    pub poll_interval: Duration,
    /// Minimum spacing between uptime reads. Clamped on use.
    pub uptime_poll_interval: Duration,
    pub rules: RuleConfig,
}

impl DeviceConfig {
    pub fn new(endpoint: DeviceEndpoint) -> Self {
        Self {
            name: None,
            endpoint,
            custom_oids: CustomOids::default(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            poll_interval: DEFAULT_POLL_INTERVAL,
            uptime_poll_interval: DEFAULT_UPTIME_POLL_INTERVAL,
            rules: RuleConfig::default(),
        }
    }

    /// Uptime interval bounded to [30s, 3600s].
    pub fn uptime_interval(&self) -> Duration {
        self.uptime_poll_interval
            .clamp(MIN_UPTIME_POLL_INTERVAL, MAX_UPTIME_POLL_INTERVAL)
    }
}
