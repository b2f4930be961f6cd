// ── Command types ──
//
// Writes and refresh requests routed through the coordinator's command
// channel, so they queue behind any refresh already in flight.

use crate::config::RuleConfig;
use crate::error::CoreError;
use crate::model::{AdminStatus, InterfaceRecord};

/// Envelope pairing a command with its response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

#[derive(Debug, Clone)]
pub enum Command {
    /// Write ifAlias.
    SetAlias { if_index: u32, alias: String },
    /// Write ifAdminStatus. Only `Up` and `Down` are accepted.
    SetAdminStatus { if_index: u32, status: AdminStatus },
    /// Dynamic refresh now.
    Refresh,
    /// Full refresh now.
    Rediscover,
    /// Swap the rule set and re-run discovery.
    UpdateRules(Box<RuleConfig>),
}

#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    /// The record after an optimistic update.
    Interface(Box<InterfaceRecord>),
    /// Revision of the snapshot committed by a refresh.
    Refreshed { revision: u64 },
}
