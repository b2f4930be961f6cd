//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use swmgr_config::ConfigError;
use swmgr_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach {target}: {reason}")]
    #[diagnostic(
        code(swmgr::connection_failed),
        help(
            "Check that the device is reachable over UDP and SNMP is enabled.\n\
             Target: {target}"
        )
    )]
    ConnectionFailed { target: String, reason: String },

    #[error("SNMP request to {target} timed out ({oid})")]
    #[diagnostic(
        code(swmgr::timeout),
        help(
            "Verify the community string, or raise the timeout with --timeout.\n\
             Agents silently drop requests with a wrong community."
        )
    )]
    Timeout { target: String, oid: String },

    #[error("{target} did not report a system name")]
    #[diagnostic(
        code(swmgr::unidentified),
        help("The agent answered but sysName is missing. Check the agent's view configuration.")
    )]
    Unidentified { target: String },

    // ── Device errors ────────────────────────────────────────────────

    #[error("{target} refused to write {oid}: {status}")]
    #[diagnostic(
        code(swmgr::write_denied),
        help("Writes need a read-write community. Set one with --community or override_community.")
    )]
    WriteDenied {
        target: String,
        oid: String,
        status: String,
    },

    #[error("{target} reported {status} for {oid}")]
    #[diagnostic(code(swmgr::snmp_error))]
    Snmp {
        target: String,
        oid: String,
        status: String,
    },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(swmgr::not_found),
        help("Run: swmgr {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(swmgr::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No devices configured")]
    #[diagnostic(
        code(swmgr::no_devices),
        help(
            "Add one with: swmgr config add-device <name> --host <address>\n\
             Or target a device directly with --host.\n\
             Config file: {path}"
        )
    )]
    NoDevices { path: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(swmgr::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(swmgr::config))]
    Config(Box<figment::Error>),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(swmgr::config_write))]
    ConfigWrite(String),

    // ── Internal ─────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(swmgr::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(swmgr::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(swmgr::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Unidentified { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::WriteDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { target, reason } => CliError::ConnectionFailed { target, reason },

            CoreError::Timeout { target, oid } => CliError::Timeout { target, oid },

            CoreError::DeviceUnidentified { target } => CliError::Unidentified { target },

            CoreError::PermissionDenied {
                target,
                oid,
                status,
            } => CliError::WriteDenied {
                target,
                oid,
                status,
            },

            CoreError::Protocol {
                target,
                oid,
                status,
            } => CliError::Snmp {
                target,
                oid,
                status,
            },

            CoreError::InterfaceNotFound { if_index } => CliError::NotFound {
                resource_type: "interface".into(),
                identifier: if_index.to_string(),
                list_command: "interfaces --all".into(),
            },

            CoreError::InvalidCommand { reason } => CliError::Validation {
                field: "command".into(),
                reason,
            },

            CoreError::InvalidOid { input } => CliError::Validation {
                field: "oid".into(),
                reason: format!("'{input}' is not a dotted numeric OID"),
            },

            CoreError::MalformedRule { rule, reason } => CliError::Validation {
                field: format!("rule '{rule}'"),
                reason,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::NotInitialized | CoreError::CoordinatorStopped => CliError::Internal {
                message: err.to_string(),
            },

            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownDevice { name } => CliError::NotFound {
                resource_type: "device".into(),
                identifier: name,
                list_command: "config show".into(),
            },
            ConfigError::NoDevices => CliError::NoDevices {
                path: swmgr_config::config_path().display().to_string(),
            },
            ConfigError::Figment(err) => CliError::Config(err),
            ConfigError::Serialization(err) => CliError::ConfigWrite(err.to_string()),
            ConfigError::Io(err) => CliError::Io(err),
        }
    }
}
