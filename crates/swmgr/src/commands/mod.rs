//! Command dispatch: bridges CLI args -> core Coordinator -> output formatting.

pub mod addresses;
pub mod config_cmd;
pub mod discover;
pub mod identity;
pub mod interfaces;
pub mod rules;
pub mod set_port;
pub mod util;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Discover => discover::handle(config::resolve_targets(global)?, global).await,
        Command::Interfaces(args) => {
            interfaces::handle(config::resolve_targets(global)?, args, global).await
        }
        Command::Identity => identity::handle(config::resolve_targets(global)?, global).await,
        Command::Addresses => addresses::handle(config::resolve_targets(global)?, global).await,
        Command::Watch(args) => watch::handle(config::resolve_targets(global)?, args, global).await,
        Command::SetAlias(args) => {
            set_port::handle_alias(config::resolve_single(global)?, args, global).await
        }
        Command::SetAdmin(args) => {
            set_port::handle_admin(config::resolve_single(global)?, args, global).await
        }
        // Rules, Config and Completions are handled before dispatch
        Command::Rules(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
