//! CLI configuration — thin wrapper around `swmgr_config` shared types.
//!
//! Adds target selection that respects `GlobalOpts` flag overrides
//! (--config, --device, --host, --community, --port, --timeout).

use std::path::PathBuf;

use secrecy::SecretString;

use swmgr_core::DeviceConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use swmgr_config::{
    Config, DeviceEntry, device_to_config, load_config_from, save_config_to,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Config file path: --config flag, else the platform default.
pub fn active_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(swmgr_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&active_path(global))?)
}

/// One device to talk to, labelled by its config key (or host for --host).
pub struct Target {
    pub label: String,
    pub config: DeviceConfig,
}

/// Resolve the devices a command should act on.
///
/// `--host` builds an ad-hoc device; otherwise `--device` names are
/// looked up, and with neither every configured device is used. CLI
/// flag overrides take priority over file values.
pub fn resolve_targets(global: &GlobalOpts) -> Result<Vec<Target>, CliError> {
    let cfg = load(global)?;

    let mut targets = if let Some(ref host) = global.host {
        let entry = DeviceEntry::new(host.clone());
        vec![Target {
            label: host.clone(),
            config: device_to_config(host, &entry, &cfg.defaults, &cfg.rules)?,
        }]
    } else if global.device.is_empty() {
        if cfg.devices.is_empty() {
            return Err(CliError::NoDevices {
                path: active_path(global).display().to_string(),
            });
        }
        cfg.all_devices()?
            .into_iter()
            .map(|(label, config)| Target { label, config })
            .collect()
    } else {
        global
            .device
            .iter()
            .map(|name| -> Result<Target, CliError> {
                Ok(Target {
                    label: name.clone(),
                    config: cfg.device(name)?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };

    for target in &mut targets {
        apply_overrides(&mut target.config, global);
    }
    Ok(targets)
}

/// Resolve exactly one device, for write commands.
pub fn resolve_single(global: &GlobalOpts) -> Result<Target, CliError> {
    let mut targets = resolve_targets(global)?;
    if targets.len() != 1 {
        return Err(CliError::Validation {
            field: "device".into(),
            reason: format!(
                "this command needs exactly one device, {} selected (use --device or --host)",
                targets.len()
            ),
        });
    }
    targets.pop().ok_or_else(|| CliError::Internal {
        message: "target list emptied unexpectedly".into(),
    })
}

fn apply_overrides(config: &mut DeviceConfig, global: &GlobalOpts) {
    if let Some(ref community) = global.community {
        config.endpoint.override_community = Some(SecretString::from(community.clone()));
    }
    if let Some(port) = global.port {
        config.endpoint.override_port = Some(port);
    }
    if let Some(timeout) = global.timeout {
        config.timeout = timeout;
    }
}
