// ── Vendor detection ──
//
// Single source of truth for "which vendor family is this device".
// The identity resolver uses it to gate vendor OID reads and the
// classification engine uses it to pick a built-in rule set.

use serde::{Deserialize, Serialize};

/// Vendor families with dedicated identity OIDs and inclusion rules.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum VendorTag {
    /// Cisco small-business switches (CBS / SG series).
    Cisco,
    Zyxel,
    Mikrotik,
}

impl VendorTag {
    /// Manufacturer name as printed for users.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cisco => "Cisco",
            Self::Zyxel => "Zyxel",
            Self::Mikrotik => "MikroTik",
        }
    }
}

/// Classify a device from its manufacturer hint and system description.
///
/// Matching is case-insensitive. MikroTik and Zyxel are recognised by
/// name; Cisco small-business gear by name or by a `CBSnnn` / `SGnnn`
/// model token.
pub fn detect_vendor(
    manufacturer: Option<&str>,
    system_description: Option<&str>,
) -> Option<VendorTag> {
    let haystack = [manufacturer, system_description]
        .into_iter()
        .flatten()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ");
    if haystack.trim().is_empty() {
        return None;
    }

    if haystack.contains("mikrotik") || haystack.contains("routeros") {
        return Some(VendorTag::Mikrotik);
    }
    if haystack.contains("zyxel") {
        return Some(VendorTag::Zyxel);
    }
    let model_token = haystack
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|token| has_model_prefix(token, "cbs") || has_model_prefix(token, "sg"));
    if haystack.contains("cisco") || model_token {
        return Some(VendorTag::Cisco);
    }
    None
}

fn has_model_prefix(token: &str, prefix: &str) -> bool {
    token
        .strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_digit())
}
