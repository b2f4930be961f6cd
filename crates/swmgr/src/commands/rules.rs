//! `rules`: built-in vendor and rename rule catalogs.
//!
//! Ids printed here are what `disabled_vendor_rules` and
//! `disabled_rename_rules` in the config refer to.

use std::str::FromStr;

use serde::Serialize;
use tabled::Tabled;

use swmgr_core::classify::{BUILTIN_RENAMES, VENDOR_RULES};
use swmgr_core::{ClassificationEngine, RuleConfig, VendorTag};

use crate::cli::{GlobalOpts, RulesArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct RuleView {
    kind: &'static str,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<VendorTag>,
    description: String,
    enabled: bool,
}

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Enabled")]
    enabled: &'static str,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&RuleView> for RuleRow {
    fn from(v: &RuleView) -> Self {
        Self {
            kind: v.kind,
            id: v.id.clone(),
            vendor: v.vendor.map_or_else(|| "-".into(), |t| t.label().to_owned()),
            enabled: if v.enabled { "yes" } else { "no" },
            description: v.description.clone(),
        }
    }
}

fn catalog(rules: &RuleConfig, vendor: Option<VendorTag>) -> Vec<RuleView> {
    let vendor_rules = VENDOR_RULES
        .iter()
        .filter(|r| vendor.is_none_or(|v| r.vendor == v))
        .map(|r| RuleView {
            kind: "vendor",
            id: r.id.to_owned(),
            vendor: Some(r.vendor),
            description: r.description.to_owned(),
            enabled: !rules.disabled_vendor_rules.contains(r.id),
        });

    let user_renames = rules.rename.iter().enumerate().map(|(i, r)| RuleView {
        kind: "rename (user)",
        id: r
            .description
            .clone()
            .unwrap_or_else(|| format!("user rule {}", i + 1)),
        vendor: None,
        description: format!("{} -> {}", r.pattern, r.replace),
        enabled: true,
    });

    let builtin_renames = BUILTIN_RENAMES.iter().map(|r| RuleView {
        kind: "rename",
        id: r.id.to_owned(),
        vendor: None,
        description: r.description.to_owned(),
        enabled: !rules.disabled_rename_rules.contains(r.id),
    });

    vendor_rules.chain(user_renames).chain(builtin_renames).collect()
}

pub fn handle(args: RulesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let vendor = args
        .vendor
        .as_deref()
        .map(|raw| {
            VendorTag::from_str(raw).map_err(|_| CliError::Validation {
                field: "vendor".into(),
                reason: format!("expected cisco, zyxel or mikrotik, got '{raw}'"),
            })
        })
        .transpose()?;

    let cfg = config::load(global)?;
    for diag in ClassificationEngine::new(&cfg.rules).diagnostics() {
        eprintln!("warning: rule '{}' will be skipped: {}", diag.rule, diag.reason);
    }

    let views = catalog(&cfg.rules, vendor);
    let out = output::render_list(&global.output, &views, |v| RuleRow::from(v), |v| v.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_rules_are_marked() {
        let mut rules = RuleConfig::default();
        rules
            .disabled_vendor_rules
            .insert("cisco_addressed_interfaces".into());
        rules.disabled_rename_rules.insert("vlan".into());

        let views = catalog(&rules, None);
        let enabled = |id: &str| views.iter().find(|v| v.id == id).map(|v| v.enabled);
        assert_eq!(enabled("cisco_addressed_interfaces"), Some(false));
        assert_eq!(enabled("cisco_physical_ports"), Some(true));
        assert_eq!(enabled("vlan"), Some(false));
    }

    #[test]
    fn vendor_filter_keeps_renames() {
        let views = catalog(&RuleConfig::default(), Some(VendorTag::Zyxel));
        assert!(
            views
                .iter()
                .filter(|v| v.kind == "vendor")
                .all(|v| v.vendor == Some(VendorTag::Zyxel))
        );
        assert!(views.iter().any(|v| v.kind == "rename"));
    }
}
