//! `addresses`: IPv4 addresses with prefix and owning interface.

use std::net::Ipv4Addr;

use serde::Serialize;
use tabled::Tabled;

use swmgr_core::model::mask_to_prefix;

use crate::cli::GlobalOpts;
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util::{self, Discovered};

#[derive(Serialize)]
struct AddressView {
    device: String,
    address: Ipv4Addr,
    netmask: Option<Ipv4Addr>,
    prefix_len: Option<u8>,
    if_index: Option<u32>,
    interface: Option<String>,
    exposed: bool,
}

#[derive(Tabled)]
struct AddressRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Netmask")]
    netmask: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Index")]
    if_index: String,
}

impl From<&AddressView> for AddressRow {
    fn from(v: &AddressView) -> Self {
        Self {
            device: v.device.clone(),
            address: v.prefix_len.map_or_else(
                || v.address.to_string(),
                |prefix| format!("{}/{prefix}", v.address),
            ),
            netmask: v.netmask.map_or_else(|| "-".into(), |m| m.to_string()),
            interface: match (&v.interface, v.exposed) {
                (Some(name), true) => name.clone(),
                (Some(name), false) => format!("{name} (hidden)"),
                (None, _) => "-".into(),
            },
            if_index: v.if_index.map_or_else(|| "-".into(), |i| i.to_string()),
        }
    }
}

fn views_for(d: &Discovered) -> Vec<AddressView> {
    let snap = &d.snapshot;
    snap.ipv4
        .addresses()
        .map(|(address, owner)| {
            let netmask = snap.ipv4.netmask(address);
            let record = owner.and_then(|idx| snap.interface(idx));
            AddressView {
                device: d.label.clone(),
                address,
                netmask,
                prefix_len: netmask.and_then(mask_to_prefix),
                if_index: owner,
                interface: record.map(|r| r.display_name.clone()),
                exposed: owner.is_some_and(|idx| snap.is_exposed(idx)),
            }
        })
        .collect()
}

pub async fn handle(targets: Vec<Target>, global: &GlobalOpts) -> Result<(), CliError> {
    let devices = util::discover_all(targets).await?;
    let views: Vec<AddressView> = devices.iter().flat_map(views_for).collect();

    let out = output::render_list(&global.output, &views, |v| AddressRow::from(v), |v| {
        format!("{}\t{}", v.device, v.address)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
