//! Config subcommand handlers.

use std::str::FromStr;

use swmgr_core::{OidField, parse_oid};

use crate::cli::{AddDeviceArgs, ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, DeviceEntry};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking community strings.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    let d = &cfg.defaults;
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "port = {}", d.port);
    let _ = writeln!(out, "community = \"****\"");
    let _ = writeln!(out, "timeout_secs = {}", d.timeout_secs);
    let _ = writeln!(out, "retries = {}", d.retries);
    let _ = writeln!(out, "poll_interval_secs = {}", d.poll_interval_secs);
    let _ = writeln!(out, "uptime_poll_interval_secs = {}", d.uptime_poll_interval_secs);

    for (name, dev) in &cfg.devices {
        let _ = writeln!(out);
        let _ = writeln!(out, "[devices.{name}]");
        let _ = writeln!(out, "host = \"{}\"", dev.host);
        if let Some(port) = dev.port {
            let _ = writeln!(out, "port = {port}");
        }
        if dev.community.is_some() {
            let _ = writeln!(out, "community = \"****\"");
        }
        if let Some(ref env) = dev.community_env {
            let _ = writeln!(out, "community_env = \"{env}\"");
        }
        if let Some(port) = dev.override_port {
            let _ = writeln!(out, "override_port = {port}");
        }
        if dev.override_community.is_some() {
            let _ = writeln!(out, "override_community = \"****\"");
        }
        if let Some(ref display) = dev.override_name {
            let _ = writeln!(out, "override_name = \"{display}\"");
        }
        if let Some(timeout) = dev.timeout_secs {
            let _ = writeln!(out, "timeout_secs = {timeout}");
        }
        if let Some(uptime) = dev.uptime_poll_interval_secs {
            let _ = writeln!(out, "uptime_poll_interval_secs = {uptime}");
        }
        for (field, oid) in &dev.custom_oids {
            let _ = writeln!(out, "custom_oids.{field} = \"{oid}\"");
        }
    }

    // Rules carry no secrets.
    if let Ok(rules) = toml::to_string_pretty(&RulesSection { rules: &cfg.rules }) {
        let _ = writeln!(out);
        out.push_str(&rules);
    }

    out
}

#[derive(serde::Serialize)]
struct RulesSection<'a> {
    rules: &'a swmgr_core::RuleConfig,
}

/// Parse `field=oid` pairs from `--oid`.
fn parse_custom_oid(raw: &str) -> Result<(OidField, String), CliError> {
    let (field, oid) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "oid".into(),
        reason: format!("expected FIELD=OID, got '{raw}'"),
    })?;
    let field = OidField::from_str(field.trim()).map_err(|_| CliError::Validation {
        field: "oid".into(),
        reason: format!(
            "unknown field '{field}' (expected manufacturer, model, firmware, hostname or uptime)"
        ),
    })?;
    let oid = parse_oid(oid)?;
    Ok((field, oid.to_string()))
}

fn build_entry(args: &AddDeviceArgs) -> Result<DeviceEntry, CliError> {
    let mut entry = DeviceEntry::new(args.host.trim());
    entry.port = args.port;
    entry.community.clone_from(&args.community);
    entry.community_env.clone_from(&args.community_env);
    entry.override_name.clone_from(&args.display_name);
    for raw in &args.custom_oids {
        let (field, oid) = parse_custom_oid(raw)?;
        entry.custom_oids.insert(field.to_string(), oid);
    }
    Ok(entry)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_path(global);

    match args.command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            config::save_config_to(&Config::default(), &path)?;
            if !global.quiet {
                eprintln!("Wrote {}", path.display());
                eprintln!("Add a device with: swmgr config add-device <name> --host <address>");
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), false);
            Ok(())
        }

        ConfigCommand::AddDevice(add) => {
            let mut cfg = config::load(global)?;
            let entry = build_entry(&add)?;
            config::device_to_config(&add.name, &entry, &cfg.defaults, &cfg.rules)?;
            let replaced = cfg.devices.insert(add.name.clone(), entry).is_some();
            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                let verb = if replaced { "Updated" } else { "Added" };
                eprintln!("{verb} device '{}' in {}", add.name, path.display());
            }
            Ok(())
        }

        ConfigCommand::RemoveDevice { name } => {
            let mut cfg = config::load(global)?;
            if cfg.devices.remove(&name).is_none() {
                return Err(CliError::NotFound {
                    resource_type: "device".into(),
                    identifier: name,
                    list_command: "config show".into(),
                });
            }
            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("Removed device '{name}'");
            }
            Ok(())
        }
    }
}
