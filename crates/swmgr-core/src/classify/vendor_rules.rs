// ── Built-in vendor inclusion rules ──
//
// Ordered per vendor. The first enabled rule whose predicate holds
// includes the interface; when none holds the vendor drops it.

use crate::model::InterfaceRecord;
use crate::vendor::VendorTag;

/// One built-in inclusion predicate, switchable by `id`.
pub struct VendorRule {
    pub id: &'static str,
    pub vendor: VendorTag,
    pub description: &'static str,
    predicate: fn(&InterfaceRecord, &str) -> bool,
}

impl VendorRule {
    /// `lowered` is the interface's raw name in lower case.
    pub fn matches(&self, record: &InterfaceRecord, lowered: &str) -> bool {
        (self.predicate)(record, lowered)
    }
}

impl std::fmt::Debug for VendorRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorRule")
            .field("id", &self.id)
            .field("vendor", &self.vendor)
            .finish_non_exhaustive()
    }
}

pub static VENDOR_RULES: &[VendorRule] = &[
    // ── Cisco small business ──
    VendorRule {
        id: "cisco_physical_ports",
        vendor: VendorTag::Cisco,
        description: "Physical ports by name prefix (gi, fa, te, tw, hu)",
        predicate: |_, name| starts_with_any(name, &["gi", "fa", "te", "tw", "hu"]),
    },
    VendorRule {
        id: "cisco_vlan_interfaces",
        vendor: VendorTag::Cisco,
        description: "VLAN interfaces that are up or admin-down and have an IPv4 address",
        predicate: |record, name| {
            is_vlan(name) && (record.is_oper_up() || record.is_admin_down()) && record.has_ipv4()
        },
    },
    VendorRule {
        id: "cisco_port_channels",
        vendor: VendorTag::Cisco,
        description: "Port-channels that are up or admin-down",
        predicate: |record, name| {
            is_aggregate(name) && (record.is_oper_up() || record.is_admin_down())
        },
    },
    VendorRule {
        id: "cisco_addressed_interfaces",
        vendor: VendorTag::Cisco,
        description: "Any other interface with an IPv4 address",
        predicate: |record, _| record.has_ipv4(),
    },
    // ── Zyxel ──
    VendorRule {
        id: "zyxel_physical_ports",
        vendor: VendorTag::Zyxel,
        description: "Numbered front-panel ports (1, 2, port3, ...)",
        predicate: |_, name| {
            let digits = name.strip_prefix("port").unwrap_or(name).trim();
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        },
    },
    VendorRule {
        id: "zyxel_port_trunks",
        vendor: VendorTag::Zyxel,
        description: "Trunks that are up or admin-down",
        predicate: |record, name| {
            is_aggregate(name) && (record.is_oper_up() || record.is_admin_down())
        },
    },
    VendorRule {
        id: "zyxel_addressed_interfaces",
        vendor: VendorTag::Zyxel,
        description: "Any other interface with an IPv4 address",
        predicate: |record, _| record.has_ipv4(),
    },
    // ── MikroTik ──
    VendorRule {
        id: "mikrotik_ethernet_ports",
        vendor: VendorTag::Mikrotik,
        description: "Ethernet, SFP and combo ports",
        predicate: |_, name| starts_with_any(name, &["ether", "sfp", "qsfp", "combo"]),
    },
    VendorRule {
        id: "mikrotik_bonds",
        vendor: VendorTag::Mikrotik,
        description: "Bonding interfaces that are up or admin-down",
        predicate: |record, name| {
            is_aggregate(name) && (record.is_oper_up() || record.is_admin_down())
        },
    },
    VendorRule {
        id: "mikrotik_addressed_interfaces",
        vendor: VendorTag::Mikrotik,
        description: "Any other interface (bridge, VLAN, tunnel) with an IPv4 address",
        predicate: |record, _| record.has_ipv4(),
    },
];

/// Built-in rules for `vendor`, in evaluation order.
pub fn rules_for(vendor: VendorTag) -> impl Iterator<Item = &'static VendorRule> {
    VENDOR_RULES.iter().filter(move |rule| rule.vendor == vendor)
}

/// Link-aggregate / port-channel names.
pub fn is_aggregate(lowered: &str) -> bool {
    starts_with_any(
        lowered,
        &["port-channel", "portchannel", "link aggregate", "lag", "bond", "trk", "trunk"],
    ) || lowered
        .strip_prefix("po")
        .and_then(|rest| rest.trim_start().chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}

fn is_vlan(lowered: &str) -> bool {
    lowered.starts_with("vlan")
        || lowered
            .strip_prefix("vl")
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
}

fn starts_with_any(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn rule_ids_are_unique() {
        let ids: HashSet<&str> = VENDOR_RULES.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), VENDOR_RULES.len());
    }

    #[test]
    fn every_vendor_has_rules() {
        use strum::IntoEnumIterator;
        for vendor in VendorTag::iter() {
            assert!(rules_for(vendor).next().is_some(), "{vendor} has no rules");
        }
    }

    #[test]
    fn aggregate_names() {
        for name in ["port-channel1", "po2", "po 3", "lag 1", "bond0", "trk1", "link aggregate 1"] {
            assert!(is_aggregate(name), "{name}");
        }
        for name in ["port1", "gi1/0/1", "power", "vlan1"] {
            assert!(!is_aggregate(name), "{name}");
        }
    }

    #[test]
    fn vlan_names() {
        assert!(is_vlan("vlan1"));
        assert!(is_vlan("vl100"));
        assert!(!is_vlan("vlink"));
    }
}
