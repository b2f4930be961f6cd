// ── Core error types ──
//
// User-facing errors from swmgr-core. Transport failures arrive as
// `SnmpError` and are translated by the `From` impl below; everything
// else originates in discovery, rule compilation or command routing.
// "Field absent" is never an error: reads return `Option`.

use thiserror::Error;

use crate::transport::SnmpError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport errors ─────────────────────────────────────────────
    #[error("SNMP request to {target} timed out ({oid})")]
    Timeout { target: String, oid: String },

    #[error("{target} reported {status} for {oid}")]
    Protocol {
        target: String,
        oid: String,
        status: String,
    },

    #[error("{target} refused to write {oid}: {status}")]
    PermissionDenied {
        target: String,
        oid: String,
        status: String,
    },

    #[error("Cannot reach {target}: {reason}")]
    Network { target: String, reason: String },

    // ── Identity errors ──────────────────────────────────────────────
    #[error("{target} did not report a system name")]
    DeviceUnidentified { target: String },

    // ── Rule errors ──────────────────────────────────────────────────
    #[error("Invalid rule '{rule}': {reason}")]
    MalformedRule { rule: String, reason: String },

    #[error("Invalid OID '{input}'")]
    InvalidOid { input: String },

    // ── Command errors ───────────────────────────────────────────────
    #[error("Interface {if_index} not found")]
    InterfaceNotFound { if_index: u32 },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Device has not completed initial discovery")]
    NotInitialized,

    #[error("Coordinator is not running")]
    CoordinatorStopped,

    // ── Configuration / internal ─────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Network { .. })
    }
}

impl From<SnmpError> for CoreError {
    fn from(err: SnmpError) -> Self {
        match err {
            SnmpError::Timeout { target, oid } => CoreError::Timeout {
                target,
                oid: oid.to_string(),
            },
            SnmpError::Protocol {
                target,
                oid,
                status,
            } => CoreError::Protocol {
                target,
                oid: oid.to_string(),
                status,
            },
            SnmpError::PermissionDenied {
                target,
                oid,
                status,
            } => CoreError::PermissionDenied {
                target,
                oid: oid.to_string(),
                status,
            },
            SnmpError::Network { target, reason } => CoreError::Network { target, reason },
        }
    }
}
