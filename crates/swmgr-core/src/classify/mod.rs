// ── Interface classification ──
//
// Decides, per interface, whether it is exposed and what it is called.
// The engine is compiled once from a `RuleConfig` and is pure from then
// on: the same record and rule set always produce the same result.
//
// Order of evaluation:
//   1. reserved pseudo-interfaces are dropped
//   2. user exclude rules drop
//   3. aggregates without alias or address are dropped
//   4. with a vendor: built-in vendor rules, then user include rules
//   5. without a vendor: everything left is included

mod rename;
mod vendor_rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{MatchRules, RuleConfig};
use crate::model::InterfaceRecord;
use crate::vendor::VendorTag;

pub use rename::{BUILTIN_RENAMES, BuiltinRename, RenameChain, RuleDiagnostic, synthesize_short_name};
pub use vendor_rules::{VENDOR_RULES, VendorRule, is_aggregate, rules_for};

/// Device-internal pseudo-interfaces that are never exposed.
pub const RESERVED_INTERFACE_NAMES: &[&str] = &["cpu"];

/// Why an interface was included or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    Reserved,
    Excluded { rule: String },
    UnconfiguredAggregate,
    VendorRule { id: String },
    UserInclude { rule: String },
    VendorDropped { vendor: VendorTag },
    NoVendorRules,
}

impl Decision {
    pub fn includes(&self) -> bool {
        matches!(
            self,
            Self::VendorRule { .. } | Self::UserInclude { .. } | Self::NoVendorRules
        )
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reserved => write!(f, "reserved interface"),
            Self::Excluded { rule } => write!(f, "excluded by {rule}"),
            Self::UnconfiguredAggregate => write!(f, "aggregate without alias or address"),
            Self::VendorRule { id } => write!(f, "vendor rule {id}"),
            Self::UserInclude { rule } => write!(f, "included by {rule}"),
            Self::VendorDropped { vendor } => write!(f, "no {} rule matched", vendor.label()),
            Self::NoVendorRules => write!(f, "no vendor rules"),
        }
    }
}

/// Outcome for one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub if_index: u32,
    pub included: bool,
    pub decision: Decision,
    pub display_name: String,
}

/// Compiled rule set.
#[derive(Debug, Clone)]
pub struct ClassificationEngine {
    include: MatchRules,
    exclude: MatchRules,
    disabled_vendor_rules: std::collections::BTreeSet<String>,
    renames: RenameChain,
    diagnostics: Vec<RuleDiagnostic>,
}

impl ClassificationEngine {
    /// Compile `rules`. Malformed rename patterns are skipped and kept
    /// in [`diagnostics`](Self::diagnostics).
    pub fn new(rules: &RuleConfig) -> Self {
        let (renames, diagnostics) = RenameChain::compile(rules);
        for diagnostic in &diagnostics {
            debug!(rule = %diagnostic.rule, reason = %diagnostic.reason, "rule skipped");
        }
        Self {
            include: rules.include.clone(),
            exclude: rules.exclude.clone(),
            disabled_vendor_rules: rules.disabled_vendor_rules.clone(),
            renames,
            diagnostics,
        }
    }

    pub fn diagnostics(&self) -> &[RuleDiagnostic] {
        &self.diagnostics
    }

    pub fn display_name(&self, raw: &str) -> String {
        self.renames.display_name(raw)
    }

    /// Inclusion decision for one interface.
    pub fn decide(&self, record: &InterfaceRecord, vendor: Option<VendorTag>) -> Decision {
        let raw = record.raw_name();
        let lowered = raw.trim().to_lowercase();

        if RESERVED_INTERFACE_NAMES
            .iter()
            .any(|reserved| lowered.eq_ignore_ascii_case(reserved))
        {
            return Decision::Reserved;
        }
        if let Some(rule) = self.exclude.matching(&lowered) {
            return Decision::Excluded { rule };
        }
        if is_aggregate(&lowered) && !record.has_alias() && !record.has_ipv4() {
            return Decision::UnconfiguredAggregate;
        }

        let Some(vendor) = vendor else {
            return Decision::NoVendorRules;
        };
        if let Some(rule) = rules_for(vendor)
            .filter(|rule| !self.disabled_vendor_rules.contains(rule.id))
            .find(|rule| rule.matches(record, &lowered))
        {
            return Decision::VendorRule {
                id: rule.id.to_owned(),
            };
        }
        match self.include.matching(&lowered) {
            Some(rule) => Decision::UserInclude { rule },
            None => Decision::VendorDropped { vendor },
        }
    }

    pub fn classify(&self, record: &InterfaceRecord, vendor: Option<VendorTag>) -> Classification {
        let decision = self.decide(record, vendor);
        Classification {
            if_index: record.if_index,
            included: decision.includes(),
            decision,
            display_name: self.display_name(&record.raw_name()),
        }
    }

    pub fn classify_all(
        &self,
        interfaces: &BTreeMap<u32, InterfaceRecord>,
        vendor: Option<VendorTag>,
    ) -> BTreeMap<u32, Classification> {
        interfaces
            .iter()
            .map(|(&index, record)| (index, self.classify(record, vendor)))
            .collect()
    }

    /// Classify and write display names back onto the records.
    pub fn apply(
        &self,
        interfaces: &mut BTreeMap<u32, InterfaceRecord>,
        vendor: Option<VendorTag>,
    ) -> BTreeMap<u32, Classification> {
        let classification = self.classify_all(interfaces, vendor);
        for (index, outcome) in &classification {
            if let Some(record) = interfaces.get_mut(index) {
                record.display_name.clone_from(&outcome.display_name);
            }
        }
        classification
    }
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(&RuleConfig::default())
    }
}
