// ── Interface domain types ──

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// ifAdminStatus.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AdminStatus {
    Up,
    Down,
    Testing,
}

impl AdminStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Up),
            2 => Some(Self::Down),
            3 => Some(Self::Testing),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => 2,
            Self::Testing => 3,
        }
    }
}

/// ifOperStatus.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OperStatus {
    Up,
    Down,
    Testing,
    Unknown,
    Dormant,
    NotPresent,
    LowerLayerDown,
}

impl OperStatus {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Up),
            2 => Some(Self::Down),
            3 => Some(Self::Testing),
            4 => Some(Self::Unknown),
            5 => Some(Self::Dormant),
            6 => Some(Self::NotPresent),
            7 => Some(Self::LowerLayerDown),
            _ => None,
        }
    }
}

/// One IPv4 address attached to an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Assignment {
    pub address: Ipv4Addr,
    pub netmask: Option<Ipv4Addr>,
    pub prefix_len: Option<u8>,
}

impl Ipv4Assignment {
    /// `address/prefix`, or the bare address when the mask is unknown.
    pub fn cidr(&self) -> String {
        match self.prefix_len {
            Some(prefix) => format!("{}/{prefix}", self.address),
            None => self.address.to_string(),
        }
    }
}

/// Merged view of one interface, keyed by the device's ifIndex.
///
/// Admin and oper state are exactly what the device reported (`None`
/// until read). VLAN and IPv4 are annotations that may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub if_index: u32,
    /// ifName.
    pub name: Option<String>,
    /// ifDescr.
    pub description: Option<String>,
    /// ifAlias, user-settable.
    pub alias: Option<String>,
    pub admin: Option<AdminStatus>,
    pub oper: Option<OperStatus>,
    pub speed_bps: Option<u64>,
    /// Untagged VLAN (PVID) of the bridge port.
    pub vlan_id: Option<u16>,
    /// Unordered; callers must not rely on position.
    pub ipv4: Vec<Ipv4Assignment>,
    /// Name after classification renaming.
    pub display_name: String,
}

impl InterfaceRecord {
    pub fn new(if_index: u32) -> Self {
        Self {
            if_index,
            name: None,
            description: None,
            alias: None,
            admin: None,
            oper: None,
            speed_bps: None,
            vlan_id: None,
            ipv4: Vec::new(),
            display_name: format!("ifIndex {if_index}"),
        }
    }

    /// ifName, else ifDescr, else `ifIndex N`.
    pub fn raw_name(&self) -> String {
        [self.name.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map_or_else(|| format!("ifIndex {}", self.if_index), ToOwned::to_owned)
    }

    pub fn has_alias(&self) -> bool {
        self.alias.as_deref().is_some_and(|a| !a.trim().is_empty())
    }

    pub fn has_ipv4(&self) -> bool {
        !self.ipv4.is_empty()
    }

    /// The address when exactly one is attached.
    pub fn primary_ipv4(&self) -> Option<&Ipv4Assignment> {
        match self.ipv4.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn is_oper_up(&self) -> bool {
        self.oper == Some(OperStatus::Up)
    }

    pub fn is_admin_down(&self) -> bool {
        self.admin == Some(AdminStatus::Down)
    }
}

/// Human-readable link speed: `1.0 Gbps`, `100.0 Mbps`, `10.0 Kbps`.
pub fn format_speed(bps: u64) -> String {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    let value = bps as f64;
    if bps >= 1_000_000_000 {
        format!("{:.1} Gbps", value / 1e9)
    } else if bps >= 1_000_000 {
        format!("{:.1} Mbps", value / 1e6)
    } else if bps >= 1_000 {
        format!("{:.1} Kbps", value / 1e3)
    } else {
        format!("{bps} bps")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_name_falls_back_in_order() {
        let mut record = InterfaceRecord::new(7);
        assert_eq!(record.raw_name(), "ifIndex 7");
        record.description = Some("GigabitEthernet1/0/7".into());
        assert_eq!(record.raw_name(), "GigabitEthernet1/0/7");
        record.name = Some("  ".into());
        assert_eq!(record.raw_name(), "GigabitEthernet1/0/7");
        record.name = Some("gi7".into());
        assert_eq!(record.raw_name(), "gi7");
    }

    #[test]
    fn unknown_status_codes_are_not_invented() {
        assert_eq!(AdminStatus::from_code(0), None);
        assert_eq!(OperStatus::from_code(8), None);
        assert_eq!(OperStatus::from_code(7), Some(OperStatus::LowerLayerDown));
        assert_eq!(OperStatus::LowerLayerDown.to_string(), "lower_layer_down");
    }

    #[test]
    fn primary_ipv4_only_for_single_address() {
        let mut record = InterfaceRecord::new(1);
        let a = Ipv4Assignment {
            address: Ipv4Addr::new(10, 0, 0, 1),
            netmask: Some(Ipv4Addr::new(255, 255, 255, 0)),
            prefix_len: Some(24),
        };
        record.ipv4.push(a.clone());
        assert_eq!(record.primary_ipv4().map(Ipv4Assignment::cidr).as_deref(), Some("10.0.0.1/24"));
        record.ipv4.push(a);
        assert!(record.primary_ipv4().is_none());
    }

    #[test]
    fn speed_formatting() {
        assert_eq!(format_speed(1_000_000_000), "1.0 Gbps");
        assert_eq!(format_speed(2_500_000_000), "2.5 Gbps");
        assert_eq!(format_speed(100_000_000), "100.0 Mbps");
        assert_eq!(format_speed(64_000), "64.0 Kbps");
        assert_eq!(format_speed(10), "10 bps");
    }
}
