//! `interfaces`: exposed interfaces, or every interface with `--all`.

use serde::Serialize;
use tabled::Tabled;

use swmgr_core::{AdminStatus, Decision, InterfaceRecord, OperStatus, format_speed};

use crate::cli::{GlobalOpts, InterfacesArgs};
use crate::config::Target;
use crate::error::CliError;
use crate::output;

use super::util::{self, Discovered};

// ── View + table rows ───────────────────────────────────────────────

#[derive(Serialize)]
pub(super) struct InterfaceView {
    pub device: String,
    pub if_index: u32,
    pub name: String,
    pub raw_name: String,
    pub alias: Option<String>,
    pub admin: Option<AdminStatus>,
    pub oper: Option<OperStatus>,
    pub speed_bps: Option<u64>,
    pub vlan_id: Option<u16>,
    pub ipv4: Vec<String>,
    pub included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

impl InterfaceView {
    pub fn new(device: &str, record: &InterfaceRecord, included: bool) -> Self {
        Self {
            device: device.to_owned(),
            if_index: record.if_index,
            name: record.display_name.clone(),
            raw_name: record.raw_name(),
            alias: record.alias.clone(),
            admin: record.admin,
            oper: record.oper,
            speed_bps: record.speed_bps,
            vlan_id: record.vlan_id,
            ipv4: record.ipv4.iter().map(swmgr_core::Ipv4Assignment::cidr).collect(),
            included,
            decision: None,
        }
    }
}

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Index")]
    if_index: u32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Admin")]
    admin: String,
    #[tabled(rename = "Oper")]
    oper: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
}

#[derive(Tabled)]
struct InterfaceRowAll {
    #[tabled(inline)]
    base: InterfaceRow,
    #[tabled(rename = "Raw name")]
    raw_name: String,
    #[tabled(rename = "Shown")]
    shown: &'static str,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn row(v: &InterfaceView, color: bool) -> InterfaceRow {
    InterfaceRow {
        device: v.device.clone(),
        if_index: v.if_index,
        name: v.name.clone(),
        alias: util::or_dash(v.alias.as_deref()),
        admin: output::paint_admin(v.admin, color),
        oper: output::paint_oper(v.oper, color),
        speed: v.speed_bps.map_or_else(|| "-".into(), format_speed),
        vlan: v.vlan_id.map_or_else(|| "-".into(), |id| id.to_string()),
        ipv4: if v.ipv4.is_empty() {
            "-".into()
        } else {
            v.ipv4.join(", ")
        },
    }
}

fn row_all(v: &InterfaceView, color: bool) -> InterfaceRowAll {
    InterfaceRowAll {
        base: row(v, color),
        raw_name: v.raw_name.clone(),
        shown: if v.included { "yes" } else { "no" },
        reason: v
            .decision
            .as_ref()
            .map_or_else(|| "-".into(), ToString::to_string),
    }
}

// ── Collection ──────────────────────────────────────────────────────

fn views_for(d: &Discovered, all: bool) -> Vec<InterfaceView> {
    let snap = &d.snapshot;
    snap.interfaces
        .values()
        .filter_map(|record| {
            let classification = snap.classification.get(&record.if_index);
            let included = classification.is_some_and(|c| c.included);
            if !all && !included {
                return None;
            }
            let mut view = InterfaceView::new(&d.label, record, included);
            if all {
                view.decision = classification.map(|c| c.decision.clone());
            }
            Some(view)
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    targets: Vec<Target>,
    args: InterfacesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let devices = util::discover_all(targets).await?;
    let views: Vec<InterfaceView> = devices
        .iter()
        .flat_map(|d| views_for(d, args.all))
        .collect();

    let color = output::should_color(&global.color);
    let id_fn = |v: &InterfaceView| format!("{}\t{}\t{}", v.device, v.if_index, v.name);
    let out = if args.all {
        output::render_list(&global.output, &views, |v| row_all(v, color), id_fn)?
    } else {
        output::render_list(&global.output, &views, |v| row(v, color), id_fn)?
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
