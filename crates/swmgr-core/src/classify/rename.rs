// ── Display-name rewriting ──
//
// User regex rules run first in insertion order, then the built-in
// defaults in declaration order. The first rule that matches rewrites
// the name once and stops the chain. With no match, names that encode
// unit/slot/port are shortened to `Gi1/0/46`-style mnemonics.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::config::RuleConfig;

/// A built-in rename rule, switchable by `id`.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRename {
    pub id: &'static str,
    pub pattern: &'static str,
    pub replace: &'static str,
    pub description: &'static str,
}

pub static BUILTIN_RENAMES: &[BuiltinRename] = &[
    BuiltinRename {
        id: "gigabit_ethernet",
        pattern: r"(?i)^gigabitethernet\s*(\d+(?:/\d+)*)$",
        replace: "Gi$1",
        description: "GigabitEthernet1/0/1 -> Gi1/0/1",
    },
    BuiltinRename {
        id: "ten_gigabit_ethernet",
        pattern: r"(?i)^tengigabitethernet\s*(\d+(?:/\d+)*)$",
        replace: "Te$1",
        description: "TenGigabitEthernet1/0/1 -> Te1/0/1",
    },
    BuiltinRename {
        id: "twenty_five_gig_ethernet",
        pattern: r"(?i)^twentyfivegig(?:abit)?e(?:thernet)?\s*(\d+(?:/\d+)*)$",
        replace: "Tw$1",
        description: "TwentyFiveGigE1/0/1 -> Tw1/0/1",
    },
    BuiltinRename {
        id: "fast_ethernet",
        pattern: r"(?i)^fastethernet\s*(\d+(?:/\d+)*)$",
        replace: "Fa$1",
        description: "FastEthernet0/1 -> Fa0/1",
    },
    BuiltinRename {
        id: "port_channel",
        pattern: r"(?i)^port-?channel\s*(\d+)$",
        replace: "Po$1",
        description: "Port-channel1 -> Po1",
    },
    BuiltinRename {
        id: "link_aggregate",
        pattern: r"(?i)^link aggregate\s*(\d+)$",
        replace: "Po$1",
        description: "Link Aggregate 1 -> Po1",
    },
    BuiltinRename {
        id: "vlan",
        pattern: r"(?i)^vlan\s*(\d+)$",
        replace: "Vl$1",
        description: "Vlan100 -> Vl100",
    },
    BuiltinRename {
        id: "loopback",
        pattern: r"(?i)^loopback\s*(\d+)$",
        replace: "Lo$1",
        description: "Loopback0 -> Lo0",
    },
];

/// A rule problem found while compiling; the rule is left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDiagnostic {
    pub rule: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
struct CompiledRename {
    id: String,
    regex: Regex,
    replace: String,
}

/// Ordered, compiled rename rules.
#[derive(Debug, Clone, Default)]
pub struct RenameChain {
    rules: Vec<CompiledRename>,
}

impl RenameChain {
    /// Compile user rules followed by enabled built-ins. Rules that fail
    /// to compile are reported and skipped.
    pub fn compile(config: &RuleConfig) -> (Self, Vec<RuleDiagnostic>) {
        let mut rules = Vec::new();
        let mut diagnostics = Vec::new();

        for (position, spec) in config.rename.iter().enumerate() {
            let id = spec
                .description
                .clone()
                .unwrap_or_else(|| format!("user rule {}", position + 1));
            match Regex::new(&spec.pattern) {
                Ok(regex) => rules.push(CompiledRename {
                    id,
                    regex,
                    replace: normalize_replacement(&spec.replace),
                }),
                Err(e) => {
                    warn!(rule = %id, pattern = %spec.pattern, error = %e, "skipping malformed rename rule");
                    diagnostics.push(RuleDiagnostic {
                        rule: id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        for builtin in BUILTIN_RENAMES
            .iter()
            .filter(|b| !config.disabled_rename_rules.contains(b.id))
        {
            match Regex::new(builtin.pattern) {
                Ok(regex) => rules.push(CompiledRename {
                    id: builtin.id.to_owned(),
                    regex,
                    replace: builtin.replace.to_owned(),
                }),
                Err(e) => diagnostics.push(RuleDiagnostic {
                    rule: builtin.id.to_owned(),
                    reason: e.to_string(),
                }),
            }
        }

        (Self { rules }, diagnostics)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rewrite `raw` with the first matching rule, returning the rule id
    /// alongside the new name.
    pub fn apply<'a>(&'a self, raw: &str) -> Option<(&'a str, String)> {
        self.rules.iter().find(|r| r.regex.is_match(raw)).map(|rule| {
            let renamed = rule.regex.replace(raw, rule.replace.as_str());
            (rule.id.as_str(), renamed.trim().to_owned())
        })
    }

    /// Final display name for `raw`.
    pub fn display_name(&self, raw: &str) -> String {
        if let Some((_, renamed)) = self.apply(raw) {
            if !renamed.is_empty() {
                return renamed;
            }
        }
        synthesize_short_name(raw).unwrap_or_else(|| raw.trim().to_owned())
    }
}

/// Rewrite `\1` group references as `${1}` for the regex crate.
fn normalize_replacement(replace: &str) -> String {
    let mut out = String::with_capacity(replace.len());
    let mut chars = replace.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(digit) = chars.peek().copied().filter(char::is_ascii_digit) {
                chars.next();
                out.push_str("${");
                out.push(digit);
                while let Some(more) = chars.peek().copied().filter(char::is_ascii_digit) {
                    chars.next();
                    out.push(more);
                }
                out.push('}');
                continue;
            }
        }
        out.push(c);
    }
    out
}

// ── unit/slot/port shortening ────────────────────────────────────────

static UNIT_SLOT_PORT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\bunit\s*:?\s*(\d+)\W*slot\s*:?\s*(\d+)\W*port\s*:?\s*(\d+)").ok()
});

static SLASHED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z-]*)\s*(\d+)/(\d+)/(\d+)$").ok());

/// `Gi1/0/46` for names such as `Unit: 1 Slot: 0 Port: 46 Gigabit`
/// or `GigabitEthernet 1/0/46`.
pub fn synthesize_short_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Some(caps) = UNIT_SLOT_PORT.as_ref().and_then(|re| re.captures(trimmed)) {
        // only the text after the port number can name a speed
        let tail = caps.get(0).map_or("", |m| &trimmed[m.end()..]);
        let mnemonic = speed_hint(tail).unwrap_or("Gi");
        return Some(format!("{mnemonic}{}/{}/{}", &caps[1], &caps[2], &caps[3]));
    }
    if let Some(caps) = SLASHED.as_ref().and_then(|re| re.captures(trimmed)) {
        let mnemonic = token_mnemonic(&caps[1])
            .or_else(|| speed_hint(trimmed))
            .unwrap_or("Gi");
        return Some(format!("{mnemonic}{}/{}/{}", &caps[2], &caps[3], &caps[4]));
    }
    None
}

/// Mnemonic from an interface-type token such as `TenGigabitEthernet`.
fn token_mnemonic(token: &str) -> Option<&'static str> {
    let token = token.to_ascii_lowercase();
    let table: [(&str, &str); 9] = [
        ("hu", "Hu"),
        ("tw", "Tw"),
        ("te", "Te"),
        ("gi", "Gi"),
        ("fa", "Fa"),
        ("port-channel", "Po"),
        ("po", "Po"),
        ("lo", "Lo"),
        ("vl", "Vl"),
    ];
    table
        .iter()
        .find(|(prefix, _)| token.starts_with(prefix))
        .map(|(_, mnemonic)| *mnemonic)
}

/// Mnemonic from an embedded speed such as `10G` or `Gigabit`.
fn speed_hint(name: &str) -> Option<&'static str> {
    let lowered = name.to_ascii_lowercase();
    let compact: String = lowered.chars().filter(|c| !c.is_whitespace()).collect();
    let hints: [(&str, &str); 10] = [
        ("100g", "Hu"),
        ("25g", "Tw"),
        ("20g", "Tw"),
        ("10g", "Te"),
        ("tengig", "Te"),
        ("1000m", "Gi"),
        ("1g", "Gi"),
        ("gigabit", "Gi"),
        ("100m", "Fa"),
        ("fast", "Fa"),
    ];
    hints
        .iter()
        .find(|(hint, _)| compact.contains(hint))
        .map(|(_, mnemonic)| *mnemonic)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::RenameRuleSpec;

    fn user_rule(pattern: &str, replace: &str) -> RenameRuleSpec {
        RenameRuleSpec {
            pattern: pattern.into(),
            replace: replace.into(),
            description: None,
        }
    }

    #[test]
    fn unit_slot_port_is_shortened() {
        let (chain, _) = RenameChain::compile(&RuleConfig::default());
        assert_eq!(chain.display_name("Unit: 1 Slot: 0 Port: 46 Gigabit"), "Gi1/0/46");
        assert_eq!(chain.display_name("Unit: 2 Slot: 1 Port: 3 10G - Level"), "Te2/1/3");
        assert_eq!(chain.display_name("Unit: 1 Slot: 0 Port: 5"), "Gi1/0/5");
        assert_eq!(chain.display_name("Unit: 1 Slot: 0 Port: 10 Gigabit"), "Gi1/0/10");
    }

    #[test]
    fn builtin_rules_shorten_long_forms() {
        let (chain, _) = RenameChain::compile(&RuleConfig::default());
        assert_eq!(chain.display_name("GigabitEthernet1/0/1"), "Gi1/0/1");
        assert_eq!(chain.display_name("TenGigabitEthernet1/1/2"), "Te1/1/2");
        assert_eq!(chain.display_name("Port-channel4"), "Po4");
        assert_eq!(chain.display_name("Vlan100"), "Vl100");
        assert_eq!(chain.display_name("  eth0 "), "eth0");
    }

    #[test]
    fn user_rule_precedes_builtin() {
        let config = RuleConfig {
            rename: vec![user_rule(r"^Vlan(\d+)$", "VLAN $1")],
            ..RuleConfig::default()
        };
        let (chain, _) = RenameChain::compile(&config);
        assert_eq!(chain.display_name("Vlan100"), "VLAN 100");
    }

    #[test]
    fn only_first_occurrence_is_replaced() {
        let config = RuleConfig {
            rename: vec![user_rule("a", "b")],
            ..RuleConfig::default()
        };
        let (chain, _) = RenameChain::compile(&config);
        assert_eq!(chain.display_name("banana"), "bbnana");
    }

    #[test]
    fn backslash_groups_are_accepted() {
        let config = RuleConfig {
            rename: vec![user_rule(r"^ge-(\d+)/(\d+)/(\d+)$", r"Gi\1/\2/\3")],
            ..RuleConfig::default()
        };
        let (chain, _) = RenameChain::compile(&config);
        assert_eq!(chain.display_name("ge-0/0/12"), "Gi0/0/12");
    }

    #[test]
    fn malformed_rule_is_skipped() {
        let config = RuleConfig {
            rename: vec![user_rule("([unclosed", "x"), user_rule("^eth", "Eth")],
            ..RuleConfig::default()
        };
        let (chain, diagnostics) = RenameChain::compile(&config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, "user rule 1");
        assert_eq!(chain.display_name("eth3"), "Eth3");
    }

    #[test]
    fn disabled_builtin_is_not_applied() {
        let config = RuleConfig {
            disabled_rename_rules: ["vlan".to_owned()].into(),
            ..RuleConfig::default()
        };
        let (chain, _) = RenameChain::compile(&config);
        assert_eq!(chain.display_name("Vlan100"), "Vlan100");
        assert_eq!(chain.len(), BUILTIN_RENAMES.len() - 1);
    }

    #[test]
    fn slashed_names_use_token_mnemonic() {
        assert_eq!(synthesize_short_name("Te 1/0/1").as_deref(), Some("Te1/0/1"));
        assert_eq!(synthesize_short_name("ge 1/0/1").as_deref(), Some("Gi1/0/1"));
        assert_eq!(synthesize_short_name("eth0"), None);
    }

    #[test]
    fn backslash_normalization() {
        assert_eq!(normalize_replacement(r"Gi\1/\12"), "Gi${1}/${12}");
        assert_eq!(normalize_replacement(r"a\b"), r"a\b");
        assert_eq!(normalize_replacement("$1"), "$1");
    }
}
