//! `discover`: full discovery summary per device.

use serde::Serialize;
use tabled::Tabled;

use swmgr_core::VendorTag;

use crate::cli::GlobalOpts;
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util::{self, Discovered};

#[derive(Serialize)]
struct DeviceSummary {
    device: String,
    host: String,
    name: String,
    vendor: Option<VendorTag>,
    model: Option<String>,
    firmware: Option<String>,
    interfaces_total: usize,
    interfaces_exposed: usize,
    ipv4_addresses: usize,
    uptime: Option<String>,
    revision: u64,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Ports")]
    ports: String,
    #[tabled(rename = "IPv4")]
    ipv4: usize,
    #[tabled(rename = "Uptime")]
    uptime: String,
}

impl From<&DeviceSummary> for SummaryRow {
    fn from(s: &DeviceSummary) -> Self {
        Self {
            device: if s.name == s.device {
                s.device.clone()
            } else {
                format!("{} ({})", s.device, s.name)
            },
            host: s.host.clone(),
            vendor: s.vendor.map_or_else(|| "-".into(), |v| v.label().to_owned()),
            model: util::or_dash(s.model.as_deref()),
            firmware: util::or_dash(s.firmware.as_deref()),
            ports: format!("{}/{}", s.interfaces_exposed, s.interfaces_total),
            ipv4: s.ipv4_addresses,
            uptime: util::or_dash(s.uptime.as_deref()),
        }
    }
}

fn summarize(d: &Discovered) -> DeviceSummary {
    let snap = &d.snapshot;
    DeviceSummary {
        device: d.label.clone(),
        host: d.host.clone(),
        name: d.coordinator.display_name(),
        vendor: snap.identity.vendor,
        model: snap.identity.model.clone(),
        firmware: snap.identity.firmware.clone(),
        interfaces_total: snap.interfaces.len(),
        interfaces_exposed: snap.exposed().count(),
        ipv4_addresses: snap.ipv4.len(),
        uptime: snap.uptime.as_ref().map(swmgr_core::Uptime::human),
        revision: snap.revision,
    }
}

pub async fn handle(targets: Vec<Target>, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = util::discover_all(targets).await?;

    for d in &devices {
        for diag in d.coordinator.rule_diagnostics().await {
            eprintln!("warning: rule '{}' skipped: {}", diag.rule, diag.reason);
        }
    }

    let summaries: Vec<DeviceSummary> = devices.iter().map(summarize).collect();
    let out = output::render_list(
        &global.output,
        &summaries,
        |s| SummaryRow::from(s),
        |s| s.device.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
