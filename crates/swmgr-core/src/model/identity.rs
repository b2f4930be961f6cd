// ── Device identity ──

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::vendor::VendorTag;

/// Who the device says it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub firmware: Option<String>,
    pub hostname: Option<String>,
    /// sysDescr as last read.
    pub system_description: Option<String>,
    pub vendor: Option<VendorTag>,
}

/// System uptime. Standard sysUpTime is TimeTicks; a custom uptime OID
/// may return arbitrary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Uptime {
    /// Hundredths of a second.
    Ticks(u64),
    Text(String),
}

impl Uptime {
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Ticks(ticks) => Some(Duration::from_millis(ticks.saturating_mul(10))),
            Self::Text(_) => None,
        }
    }

    /// `"{d}d {h}h {m}m {s}s"` for ticks, the raw text otherwise.
    pub fn human(&self) -> String {
        match self {
            Self::Ticks(ticks) => {
                let secs = ticks / 100;
                let (days, rest) = (secs / 86_400, secs % 86_400);
                let (hours, rest) = (rest / 3600, rest % 3600);
                let (minutes, seconds) = (rest / 60, rest % 60);
                format!("{days}d {hours}h {minutes}m {seconds}s")
            }
            Self::Text(text) => text.clone(),
        }
    }
}
