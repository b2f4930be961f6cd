// ── Object identifiers ──
//
// `async_snmp::Oid` is used end to end, from config to the wire. This
// module adds the strict dotted-decimal parse for user-supplied OIDs,
// instance suffixes below a table column, and serde as dotted text.

pub use async_snmp::Oid;

use crate::error::CoreError;

/// Parse `1.3.6.1.2.1.1.5.0`, with or without a leading dot.
///
/// `Oid::parse` skips empty arcs and accepts the empty string; configured
/// OIDs must be plain dotted decimal instead.
pub fn parse_oid(input: &str) -> Result<Oid, CoreError> {
    let invalid = || CoreError::InvalidOid {
        input: input.to_owned(),
    };
    let trimmed = input.trim();
    let body = trimmed.strip_prefix('.').unwrap_or(trimmed);
    if body.is_empty() {
        return Err(invalid());
    }
    body.split('.')
        .map(|arc| {
            if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            arc.parse::<u32>().map_err(|_| invalid())
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Oid::new)
}

pub trait OidExt {
    /// Instance arcs below `base`, or `None` when this OID lies outside it.
    fn suffix(&self, base: &Oid) -> Option<&[u32]>;
}

impl OidExt for Oid {
    fn suffix(&self, base: &Oid) -> Option<&[u32]> {
        self.arcs().strip_prefix(base.arcs())
    }
}

/// `#[serde(serialize_with = "crate::oid::serialize_dotted")]` for `Oid` fields.
pub fn serialize_dotted<S: serde::Serializer>(oid: &Oid, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(oid)
}

/// `#[serde(with = "crate::oid::dotted")]` for `Option<Oid>` fields.
pub mod dotted {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{Oid, parse_oid};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(oid: &Option<Oid>, serializer: S) -> Result<S::Ok, S::Error> {
        match oid {
            Some(oid) => serializer.collect_str(oid),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Oid>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_oid(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[test]
    fn parse_accepts_leading_dot() {
        let oid = parse_oid(".1.3.6.1.2.1.1.5.0").unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1, 1, 5, 0]);
        assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.5.0");
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", ".", "1..3", "1.3.x", "1.3.", "-1.3", "1.3 .6"] {
            assert!(parse_oid(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn ordering_matches_getnext() {
        let parent = parse_oid("1.3.6.1.2.1.2.2.1.2").unwrap();
        let first = parent.child(1);
        let tenth = parent.child(10);
        let next_column = parse_oid("1.3.6.1.2.1.2.2.1.3").unwrap();
        assert!(parent < first);
        assert!(first < tenth);
        assert!(tenth < next_column);
    }

    #[test]
    fn suffix_only_below_base() {
        let base = parse_oid("1.3.6.1.2.1.4.20.1.2").unwrap();
        let inst = parse_oid("1.3.6.1.2.1.4.20.1.2.10.0.0.5").unwrap();
        assert_eq!(OidExt::suffix(&inst, &base), Some(&[10, 0, 0, 5][..]));
        let sibling = parse_oid("1.3.6.1.2.1.4.20.1.3.10.0.0.5").unwrap();
        assert_eq!(OidExt::suffix(&sibling, &base), None);
        assert!(!sibling.starts_with(&base));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Holder {
        #[serde(with = "dotted", default)]
        oid: Option<Oid>,
    }

    #[test]
    fn serde_uses_dotted_text() {
        let holder = Holder {
            oid: Some(parse_oid("1.3.6.1.4.1.890.1.15.3.1.6.0").unwrap()),
        };
        let json = serde_json::to_string(&holder).unwrap();
        assert_eq!(json, r#"{"oid":"1.3.6.1.4.1.890.1.15.3.1.6.0"}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back, holder);

        assert!(serde_json::from_str::<Holder>(r#"{"oid":"1..3"}"#).is_err());
        assert_eq!(serde_json::from_str::<Holder>("{}").unwrap(), Holder { oid: None });
    }
}
