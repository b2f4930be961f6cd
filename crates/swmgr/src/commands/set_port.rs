//! `set-alias` / `set-admin`: single-interface writes.

use swmgr_core::{AdminStatus, Command as CoreCommand, CommandResult, InterfaceRecord};

use crate::cli::{AdminArg, GlobalOpts, SetAdminArgs, SetAliasArgs};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::interfaces::InterfaceView;
use super::util::{self, Discovered};

/// Run `command` through the coordinator's command queue.
async fn run_write(device: &Discovered, command: CoreCommand) -> Result<InterfaceRecord, CliError> {
    device.coordinator.start().await;
    let result = device.coordinator.execute(command).await;
    device.coordinator.shutdown().await;

    match result? {
        CommandResult::Interface(record) => Ok(*record),
        other => Err(CliError::Internal {
            message: format!("unexpected write result: {other:?}"),
        }),
    }
}

fn detail(v: &InterfaceView) -> String {
    [
        format!("Device: {}", v.device),
        format!("Index:  {}", v.if_index),
        format!("Name:   {}", v.name),
        format!("Alias:  {}", util::or_dash(v.alias.as_deref())),
        format!("Admin:  {}", v.admin.map_or_else(|| "-".into(), |a| a.to_string())),
        format!("Oper:   {}", v.oper.map_or_else(|| "-".into(), |o| o.to_string())),
    ]
    .join("\n")
}

fn print_record(device: &Discovered, record: &InterfaceRecord, global: &GlobalOpts) -> Result<(), CliError> {
    let included = device.coordinator.snapshot().is_exposed(record.if_index);
    let view = InterfaceView::new(&device.label, record, included);
    let out = output::render_single(&global.output, &view, detail, |v| {
        format!("{}\t{}", v.if_index, v.name)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle_alias(
    target: Target,
    args: SetAliasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let device = util::discover(target).await?;
    let record = run_write(
        &device,
        CoreCommand::SetAlias {
            if_index: args.if_index,
            alias: args.alias,
        },
    )
    .await?;
    if !global.quiet {
        eprintln!("Alias updated on {}", device.heading());
    }
    print_record(&device, &record, global)
}

pub async fn handle_admin(
    target: Target,
    args: SetAdminArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let status = match args.status {
        AdminArg::Up => AdminStatus::Up,
        AdminArg::Down => AdminStatus::Down,
    };
    let device = util::discover(target).await?;
    let record = run_write(
        &device,
        CoreCommand::SetAdminStatus {
            if_index: args.if_index,
            status,
        },
    )
    .await?;
    if !global.quiet {
        eprintln!("Admin status set to {status} on {}", device.heading());
    }
    print_record(&device, &record, global)
}
