//! `watch`: background polling with change reporting.
//!
//! Each device gets its own coordinator with the poll task running.
//! Every committed snapshot is diffed against the previous one and the
//! differences are printed as they arrive.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use swmgr_core::DeviceSnapshot;
use swmgr_core::config::DEFAULT_POLL_INTERVAL;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util::{self, Discovered};

// ── Change detection ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub device: String,
    pub at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub if_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
    pub field: &'static str,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Change {
    fn line(&self) -> String {
        let subject = self.interface.as_deref().unwrap_or("device");
        format!(
            "{} {} {subject}: {} {} -> {}",
            self.at.format("%H:%M:%S"),
            self.device,
            self.field,
            self.from.as_deref().unwrap_or("-"),
            self.to.as_deref().unwrap_or("-"),
        )
    }
}

/// Differences between two snapshots of the same device, restricted
/// to interfaces exposed in either.
pub fn diff(device: &str, prev: &DeviceSnapshot, next: &DeviceSnapshot) -> Vec<Change> {
    let at = next.last_refresh.unwrap_or_else(Utc::now);
    let mut changes = Vec::new();
    let mut push = |if_index: Option<u32>,
                    interface: Option<String>,
                    field: &'static str,
                    from: Option<String>,
                    to: Option<String>| {
        if from != to {
            changes.push(Change {
                device: device.to_owned(),
                at,
                if_index,
                interface,
                field,
                from,
                to,
            });
        }
    };

    push(
        None,
        None,
        "firmware",
        prev.identity.firmware.clone(),
        next.identity.firmware.clone(),
    );

    let indices = prev
        .interfaces
        .keys()
        .chain(next.interfaces.keys())
        .copied()
        .filter(|idx| prev.is_exposed(*idx) || next.is_exposed(*idx))
        .collect::<std::collections::BTreeSet<u32>>();

    for idx in indices {
        let (before, after) = (prev.interface(idx), next.interface(idx));
        let name = after.or(before).map(|r| r.display_name.clone());
        match (before, after) {
            (Some(b), Some(a)) => {
                push(
                    Some(idx),
                    name.clone(),
                    "oper",
                    b.oper.map(|s| s.to_string()),
                    a.oper.map(|s| s.to_string()),
                );
                push(
                    Some(idx),
                    name.clone(),
                    "admin",
                    b.admin.map(|s| s.to_string()),
                    a.admin.map(|s| s.to_string()),
                );
                push(Some(idx), name.clone(), "alias", b.alias.clone(), a.alias.clone());
                push(Some(idx), name, "ipv4", joined_ipv4(b), joined_ipv4(a));
            }
            (None, Some(_)) => push(Some(idx), name, "present", None, Some("yes".into())),
            (Some(_), None) => push(Some(idx), name, "present", Some("yes".into()), None),
            (None, None) => {}
        }
    }

    changes
}

fn joined_ipv4(record: &swmgr_core::InterfaceRecord) -> Option<String> {
    let mut cidrs: Vec<String> = record.ipv4.iter().map(swmgr_core::Ipv4Assignment::cidr).collect();
    cidrs.sort();
    (!cidrs.is_empty()).then(|| cidrs.join(", "))
}

// ── Per-device watcher ──────────────────────────────────────────────

async fn watch_device(device: Discovered, count: Option<u64>, tx: mpsc::Sender<Vec<Change>>) {
    let Discovered {
        label, coordinator, ..
    } = device;
    coordinator.start().await;
    let mut rx = coordinator.subscribe();
    let mut prev: Arc<DeviceSnapshot> = coordinator.snapshot();
    let mut seen = 0u64;

    while rx.changed().await.is_ok() {
        let next = coordinator.snapshot();
        let changes = diff(&label, &prev, &next);
        prev = next;
        seen += 1;
        if !changes.is_empty() && tx.send(changes).await.is_err() {
            break;
        }
        if count.is_some_and(|limit| seen >= limit) {
            break;
        }
    }

    coordinator.shutdown().await;
    debug!(device = %label, refreshes = seen, "watch finished");
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    mut targets: Vec<Target>,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    for target in &mut targets {
        if let Some(interval) = args.interval {
            target.config.poll_interval = interval;
        }
        if target.config.poll_interval.is_zero() {
            target.config.poll_interval = DEFAULT_POLL_INTERVAL;
        }
    }
    let period = targets
        .first()
        .map_or(DEFAULT_POLL_INTERVAL, |t| t.config.poll_interval);

    let devices = util::discover_all(targets).await?;
    if !global.quiet {
        eprintln!(
            "Watching {} device(s) every {}; Ctrl-C to stop",
            devices.len(),
            humantime::format_duration(period)
        );
    }

    let (tx, mut rx) = mpsc::channel(64);
    for device in devices {
        tokio::spawn(watch_device(device, args.count, tx.clone()));
    }
    drop(tx);

    loop {
        tokio::select! {
            changes = rx.recv() => {
                let Some(changes) = changes else { break };
                print_changes(&changes, global)?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn print_changes(changes: &[Change], global: &GlobalOpts) -> Result<(), CliError> {
    for change in changes {
        let out = match global.output {
            OutputFormat::Table | OutputFormat::Plain => change.line(),
            // JSON lines
            OutputFormat::Json | OutputFormat::JsonCompact => serde_json::to_string(change)?,
            OutputFormat::Yaml => {
                output::render_single(&global.output, change, Change::line, Change::line)?
            }
        };
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use swmgr_core::{Classification, Decision, InterfaceRecord, OperStatus};

    use super::*;

    fn snapshot(oper: OperStatus, alias: Option<&str>) -> DeviceSnapshot {
        let mut snap = DeviceSnapshot::default();
        for idx in [1, 2] {
            let mut record = InterfaceRecord::new(idx);
            record.display_name = format!("Gi1/0/{idx}");
            record.oper = Some(oper);
            record.alias = alias.map(ToOwned::to_owned);
            snap.interfaces.insert(idx, record);
        }
        snap.classification.insert(
            1,
            Classification {
                if_index: 1,
                included: true,
                decision: Decision::NoVendorRules,
                display_name: "Gi1/0/1".into(),
            },
        );
        snap
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let snap = snapshot(OperStatus::Up, None);
        assert!(diff("core", &snap, &snap).is_empty());
    }

    #[test]
    fn status_and_alias_changes_on_exposed_interfaces() {
        let before = snapshot(OperStatus::Up, None);
        let after = snapshot(OperStatus::Down, Some("uplink"));
        let changes = diff("core", &before, &after);

        let fields: Vec<(&str, Option<u32>)> =
            changes.iter().map(|c| (c.field, c.if_index)).collect();
        // ifIndex 2 is never exposed, so only ifIndex 1 is reported.
        assert_eq!(fields, vec![("oper", Some(1)), ("alias", Some(1))]);
        assert_eq!(changes[0].from.as_deref(), Some("up"));
        assert_eq!(changes[0].to.as_deref(), Some("down"));
        assert!(changes[0].line().contains("core Gi1/0/1: oper up -> down"));
    }

    #[test]
    fn firmware_change_is_device_level() {
        let before = snapshot(OperStatus::Up, None);
        let mut after = before.clone();
        after.identity.firmware = Some("3.1.0".into());
        let changes = diff("core", &before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "firmware");
        assert_eq!(changes[0].if_index, None);
    }
}
