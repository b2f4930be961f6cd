// ── Transport adapter ──
//
// GET / GETNEXT / SET against a single SNMP v2c endpoint. Values are
// decoded into `SnmpValue`; failures come back as `SnmpError`. The
// agent exceptions noSuchObject, noSuchInstance and endOfMibView are
// reported as `Ok(None)`, so an absent field is never confused with a
// failed read.

mod mock;
mod session;
mod walk;

use std::fmt;
use std::future::Future;
use std::net::Ipv4Addr;

use serde::Serialize;
use thiserror::Error;

use crate::oid::Oid;

pub use mock::{MockAgent, MockFault};
pub use session::{SessionOptions, SnmpSession};
pub use walk::Walk;

// ── Trait ────────────────────────────────────────────────────────────

/// One SNMP endpoint. Implementations serialize their own requests;
/// callers may share a transport between tasks freely.
pub trait SnmpTransport: Send + Sync {
    /// `host:port` of the agent, used in diagnostics.
    fn target(&self) -> &str;

    fn get(
        &self,
        oid: &Oid,
    ) -> impl Future<Output = Result<Option<SnmpValue>, SnmpError>> + Send;

    /// The lexicographic successor of `oid`, or `None` once the agent
    /// has nothing further to return.
    fn get_next(
        &self,
        oid: &Oid,
    ) -> impl Future<Output = Result<Option<VarBind>, SnmpError>> + Send;

    fn set(&self, oid: &Oid, value: SnmpValue)
    -> impl Future<Output = Result<(), SnmpError>> + Send;

    /// Iterate every binding under `base`.
    fn walk(&self, base: Oid) -> Walk<'_, Self>
    where
        Self: Sized,
    {
        Walk::new(self, base)
    }
}

// ── Values ───────────────────────────────────────────────────────────

/// Decoded SNMP value. Counter and gauge flavours collapse into
/// `Unsigned`; nothing in discovery distinguishes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SnmpValue {
    Integer(i64),
    Unsigned(u64),
    TimeTicks(u32),
    OctetString(Vec<u8>),
    IpAddress([u8; 4]),
    ObjectId(#[serde(serialize_with = "crate::oid::serialize_dotted")] Oid),
    Null,
}

impl SnmpValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::OctetString(value.into().into_bytes())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Unsigned(v) => i64::try_from(*v).ok(),
            Self::TimeTicks(v) => Some(i64::from(*v)),
            Self::OctetString(_) => self.as_text()?.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(v) => u64::try_from(*v).ok(),
            Self::Unsigned(v) => Some(*v),
            Self::TimeTicks(v) => Some(u64::from(*v)),
            Self::OctetString(_) => self.as_text()?.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        self.as_u64().and_then(|v| u32::try_from(v).ok())
    }

    /// Printable form. Octet strings are decoded lossily with trailing
    /// NULs removed.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::OctetString(bytes) => Some(
                String::from_utf8_lossy(bytes)
                    .trim_end_matches('\0')
                    .to_owned(),
            ),
            Self::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Trimmed text, `None` when empty.
    pub fn non_empty_text(&self) -> Option<String> {
        self.as_text()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
    }

    /// IPv4 address from an IpAddress value, a raw 4-octet string or
    /// dotted text. Any 4-octet string that is not all ASCII digits is
    /// taken as raw address bytes, so a 4-character label decodes too.
    pub fn as_ipv4(&self) -> Option<Ipv4Addr> {
        match self {
            Self::IpAddress(octets) => Some(Ipv4Addr::from(*octets)),
            Self::OctetString(bytes) => {
                if let Ok(octets) = <[u8; 4]>::try_from(bytes.as_slice()) {
                    if !octets.iter().all(u8::is_ascii_digit) {
                        return Some(Ipv4Addr::from(octets));
                    }
                }
                self.as_text()?.trim().parse().ok()
            }
            _ => None,
        }
    }
}

impl fmt::Display for SnmpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::TimeTicks(v) => write!(f, "{v}"),
            Self::OctetString(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
            Self::IpAddress(octets) => write!(f, "{}", Ipv4Addr::from(*octets)),
            Self::ObjectId(oid) => write!(f, "{oid}"),
            Self::Null => f.write_str("null"),
        }
    }
}

/// One (OID, value) pair returned by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarBind {
    #[serde(serialize_with = "crate::oid::serialize_dotted")]
    pub oid: Oid,
    pub value: SnmpValue,
}

impl VarBind {
    pub fn new(oid: Oid, value: SnmpValue) -> Self {
        Self { oid, value }
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// Transport-level failure for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnmpError {
    #[error("no response from {target} for {oid}")]
    Timeout { target: String, oid: Oid },

    #[error("{target} returned {status} for {oid}")]
    Protocol {
        target: String,
        oid: Oid,
        status: String,
    },

    #[error("{target} refused write to {oid} ({status})")]
    PermissionDenied {
        target: String,
        oid: Oid,
        status: String,
    },

    #[error("network error talking to {target}: {reason}")]
    Network { target: String, reason: String },
}

impl SnmpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_octets_decode_as_address() {
        let raw = SnmpValue::OctetString(vec![10, 0, 0, 5]);
        assert_eq!(raw.as_ipv4(), Some(Ipv4Addr::new(10, 0, 0, 5)));
        let dotted = SnmpValue::text("192.168.1.1");
        assert_eq!(dotted.as_ipv4(), Some(Ipv4Addr::new(192, 168, 1, 1)));
        assert_eq!(SnmpValue::text("eth0/1").as_ipv4(), None);
        assert_eq!(SnmpValue::text("").as_ipv4(), None);
        // four octets are always read as address bytes
        assert_eq!(
            SnmpValue::text("eth0").as_ipv4(),
            Some(Ipv4Addr::new(b'e', b't', b'h', b'0'))
        );
        // "1234" stays text and is not a dotted address
        assert_eq!(SnmpValue::text("1234").as_ipv4(), None);
    }

    #[test]
    fn text_is_trimmed_of_nul_padding() {
        let value = SnmpValue::OctetString(b"Gi1/0/1\0\0".to_vec());
        assert_eq!(value.as_text().as_deref(), Some("Gi1/0/1"));
        assert_eq!(SnmpValue::text("   ").non_empty_text(), None);
    }

    #[test]
    fn numeric_accessors_reject_out_of_range() {
        assert_eq!(SnmpValue::Integer(-1).as_u64(), None);
        assert_eq!(SnmpValue::Unsigned(u64::MAX).as_i64(), None);
        assert_eq!(SnmpValue::Unsigned(u64::from(u32::MAX) + 1).as_u32(), None);
        assert_eq!(SnmpValue::TimeTicks(42).as_u64(), Some(42));
        assert_eq!(SnmpValue::text(" 7 ").as_i64(), Some(7));
    }
}
