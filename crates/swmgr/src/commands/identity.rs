//! `identity`: manufacturer, model, firmware, hostname and uptime.

use serde::Serialize;
use tabled::Tabled;

use swmgr_core::{DeviceIdentity, Uptime};

use crate::cli::GlobalOpts;
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct IdentityView {
    device: String,
    host: String,
    #[serde(flatten)]
    identity: DeviceIdentity,
    uptime: Option<Uptime>,
    uptime_human: Option<String>,
    last_refresh: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Tabled)]
struct IdentityRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Refreshed")]
    refreshed: String,
}

impl From<&IdentityView> for IdentityRow {
    fn from(v: &IdentityView) -> Self {
        let id = &v.identity;
        Self {
            device: v.device.clone(),
            hostname: util::or_dash(id.hostname.as_deref()),
            manufacturer: util::or_dash(id.manufacturer.as_deref()),
            model: util::or_dash(id.model.as_deref()),
            firmware: util::or_dash(id.firmware.as_deref()),
            uptime: util::or_dash(v.uptime_human.as_deref()),
            refreshed: v
                .last_refresh
                .map_or_else(|| "-".into(), |t| t.format("%H:%M:%S").to_string()),
        }
    }
}

pub async fn handle(targets: Vec<Target>, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = util::discover_all(targets).await?;

    let views: Vec<IdentityView> = devices
        .iter()
        .map(|d| IdentityView {
            device: d.label.clone(),
            host: d.host.clone(),
            identity: d.snapshot.identity.clone(),
            uptime: d.snapshot.uptime.clone(),
            uptime_human: d.snapshot.uptime.as_ref().map(Uptime::human),
            last_refresh: d.snapshot.last_refresh,
        })
        .collect();

    let out = output::render_list(&global.output, &views, |v| IdentityRow::from(v), |v| {
        format!(
            "{}\t{}",
            v.device,
            v.identity.hostname.as_deref().unwrap_or_default()
        )
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
