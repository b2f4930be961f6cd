// ── async-snmp session ──
//
// One v2c client per device endpoint. Requests take the session lock
// first, so tasks sharing a session queue instead of interleaving
// request/response pairs on the same socket.

use std::time::Duration;

use async_snmp::client::Retry;
use async_snmp::{Auth, Client, ErrorStatus, Value};
use secrecy::ExposeSecret;
use tokio::sync::Mutex;
use tracing::debug;

use super::{SnmpError, SnmpTransport, SnmpValue, VarBind};
use crate::config::{DEFAULT_RETRIES, DEFAULT_TIMEOUT, DeviceConfig};
use crate::oid::Oid;

/// Per-request timeout and retry budget.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub timeout: Duration,
    pub retries: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

/// Live SNMP v2c session against one agent.
pub struct SnmpSession {
    client: Client,
    target: String,
    lock: Mutex<()>,
}

impl SnmpSession {
    /// Bind a UDP socket for the device described by `config`.
    pub async fn connect(config: &DeviceConfig) -> Result<Self, SnmpError> {
        let target = config.endpoint.target();
        let options = SessionOptions {
            timeout: config.timeout,
            retries: config.retries,
        };
        let community = config.endpoint.effective_community().expose_secret().to_owned();

        debug!(%target, timeout = ?options.timeout, retries = options.retries, "opening SNMP session");
        let client = Client::builder(target.clone(), Auth::v2c(community))
            .timeout(options.timeout)
            .retry(Retry::fixed(options.retries, Duration::ZERO))
            .connect()
            .await
            .map_err(|e| SnmpError::Network {
                target: target.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            target,
            lock: Mutex::new(()),
        })
    }

    fn map_error(&self, oid: &Oid, err: &async_snmp::Error) -> SnmpError {
        match err {
            async_snmp::Error::Timeout { .. } => SnmpError::Timeout {
                target: self.target.clone(),
                oid: oid.clone(),
            },
            async_snmp::Error::Snmp { status, .. } => {
                let denied = matches!(
                    status,
                    ErrorStatus::NoAccess
                        | ErrorStatus::NotWritable
                        | ErrorStatus::ReadOnly
                        | ErrorStatus::AuthorizationError
                        | ErrorStatus::NoCreation
                );
                if denied {
                    SnmpError::PermissionDenied {
                        target: self.target.clone(),
                        oid: oid.clone(),
                        status: status.to_string(),
                    }
                } else {
                    SnmpError::Protocol {
                        target: self.target.clone(),
                        oid: oid.clone(),
                        status: status.to_string(),
                    }
                }
            }
            other => SnmpError::Network {
                target: self.target.clone(),
                reason: other.to_string(),
            },
        }
    }
}

impl SnmpTransport for SnmpSession {
    fn target(&self) -> &str {
        &self.target
    }

    async fn get(&self, oid: &Oid) -> Result<Option<SnmpValue>, SnmpError> {
        let _guard = self.lock.lock().await;
        let varbind = self
            .client
            .get(oid)
            .await
            .map_err(|e| self.map_error(oid, &e))?;
        Ok(decode(varbind.value))
    }

    async fn get_next(&self, oid: &Oid) -> Result<Option<VarBind>, SnmpError> {
        let _guard = self.lock.lock().await;
        let varbind = self
            .client
            .get_next(oid)
            .await
            .map_err(|e| self.map_error(oid, &e))?;
        Ok(decode(varbind.value).map(|value| VarBind::new(varbind.oid, value)))
    }

    async fn set(&self, oid: &Oid, value: SnmpValue) -> Result<(), SnmpError> {
        let encoded = encode(&value).ok_or_else(|| SnmpError::Protocol {
            target: self.target.clone(),
            oid: oid.clone(),
            status: format!("value {value} cannot be encoded"),
        })?;
        let _guard = self.lock.lock().await;
        self.client
            .set(oid, encoded)
            .await
            .map_err(|e| self.map_error(oid, &e))?;
        Ok(())
    }
}

// ── Value conversion ─────────────────────────────────────────────────

/// Exceptions (noSuchObject and friends) decode to `None`.
#[allow(unreachable_patterns)]
fn decode(value: Value) -> Option<SnmpValue> {
    match value {
        Value::Integer(v) => Some(SnmpValue::Integer(i64::from(v))),
        Value::OctetString(bytes) | Value::Opaque(bytes) => {
            Some(SnmpValue::OctetString(bytes.to_vec()))
        }
        Value::Null => Some(SnmpValue::Null),
        Value::ObjectIdentifier(oid) => Some(SnmpValue::ObjectId(oid)),
        Value::IpAddress(octets) => Some(SnmpValue::IpAddress(octets)),
        Value::Counter32(v) | Value::Gauge32(v) => Some(SnmpValue::Unsigned(u64::from(v))),
        Value::TimeTicks(v) => Some(SnmpValue::TimeTicks(v)),
        Value::Counter64(v) => Some(SnmpValue::Unsigned(v)),
        Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView => None,
        _ => None,
    }
}

fn encode(value: &SnmpValue) -> Option<Value> {
    Some(match value {
        SnmpValue::Integer(v) => Value::Integer(i32::try_from(*v).ok()?),
        SnmpValue::Unsigned(v) => Value::Gauge32(u32::try_from(*v).ok()?),
        SnmpValue::TimeTicks(v) => Value::TimeTicks(*v),
        SnmpValue::OctetString(bytes) => Value::from(bytes.as_slice()),
        SnmpValue::IpAddress(octets) => Value::IpAddress(*octets),
        SnmpValue::ObjectId(oid) => Value::ObjectIdentifier(oid.clone()),
        SnmpValue::Null => Value::Null,
    })
}
