//! Clap derive structures for the `swmgr` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// swmgr -- inventory and port management for SNMP switches
#[derive(Debug, Parser)]
#[command(
    name = "swmgr",
    version,
    about = "Inventory SNMP switches and manage their ports",
    long_about = "Discovers interfaces, addresses and identity on SNMP v2c switches,\n\
        classifies which ports are worth showing, and writes port aliases\n\
        and admin status back to the device.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "SWMGR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Configured device to target (repeatable; defaults to all)
    #[arg(long, short = 'd', env = "SWMGR_DEVICE", global = true, value_delimiter = ',')]
    pub device: Vec<String>,

    /// Ad-hoc device host (bypasses the device inventory)
    #[arg(long = "host", short = 'H', env = "SWMGR_HOST", global = true, conflicts_with = "device")]
    pub host: Option<String>,

    /// SNMP community (overrides config)
    #[arg(long, short = 'c', env = "SWMGR_COMMUNITY", global = true, hide_env_values = true)]
    pub community: Option<String>,

    /// SNMP port (overrides config)
    #[arg(long, env = "SWMGR_PORT", global = true)]
    pub port: Option<u16>,

    /// Per-request timeout, e.g. "1500ms" or "3s"
    #[arg(long, env = "SWMGR_TIMEOUT", global = true, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SWMGR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

/// Parse a human duration ("10s", "1m30s", "1500ms").
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    humantime::parse_duration(raw).map_err(|e| e.to_string())
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run full discovery and summarise each device
    Discover,

    /// List interfaces
    #[command(alias = "if", alias = "ports")]
    Interfaces(InterfacesArgs),

    /// Show manufacturer, model, firmware, hostname and uptime
    #[command(alias = "id")]
    Identity,

    /// List IPv4 addresses and their owning interfaces
    #[command(alias = "addr")]
    Addresses,

    /// Poll devices and print interface status changes
    Watch(WatchArgs),

    /// Set an interface alias (ifAlias)
    SetAlias(SetAliasArgs),

    /// Set an interface admin status (ifAdminStatus)
    SetAdmin(SetAdminArgs),

    /// List built-in vendor and rename rules
    Rules(RulesArgs),

    /// Manage CLI configuration and devices
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Interfaces ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InterfacesArgs {
    /// Include dropped interfaces and show why each was kept or dropped
    #[arg(long, short = 'a')]
    pub all: bool,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval (overrides config), e.g. "5s"
    #[arg(long, short = 'i', value_parser = parse_duration)]
    pub interval: Option<Duration>,

    /// Stop after this many refreshes
    #[arg(long, short = 'n')]
    pub count: Option<u64>,
}

// ── Writes ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetAliasArgs {
    /// Interface ifIndex
    pub if_index: u32,

    /// New alias; an empty string clears it
    pub alias: String,
}

#[derive(Debug, Args)]
pub struct SetAdminArgs {
    /// Interface ifIndex
    pub if_index: u32,

    /// Desired admin status
    pub status: AdminArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AdminArg {
    Up,
    Down,
}

// ── Rules ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Only show vendor rules for this vendor (cisco, zyxel, mikrotik)
    #[arg(long)]
    pub vendor: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the current configuration (communities redacted)
    Show,

    /// Print the config file path
    Path,

    /// Add or replace a device
    AddDevice(AddDeviceArgs),

    /// Remove a device
    RemoveDevice {
        /// Device name
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct AddDeviceArgs {
    /// Device name (config key)
    pub name: String,

    /// Hostname or IP address
    #[arg(long)]
    pub host: String,

    /// SNMP port
    #[arg(long)]
    pub port: Option<u16>,

    /// Community string stored in plaintext
    #[arg(long, conflicts_with = "community_env")]
    pub community: Option<String>,

    /// Environment variable holding the community string
    #[arg(long)]
    pub community_env: Option<String>,

    /// Display name replacing the reported hostname
    #[arg(long)]
    pub display_name: Option<String>,

    /// Custom identity OID as field=oid (manufacturer, model, firmware, hostname, uptime)
    #[arg(long = "oid", value_name = "FIELD=OID")]
    pub custom_oids: Vec<String>,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
