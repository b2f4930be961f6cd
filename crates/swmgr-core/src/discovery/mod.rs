// ── Table discovery ──
//
// Drives the transport through the fixed OID plan and folds the rows
// into domain types. Every table is optional: a failed walk keeps the
// rows that arrived before the failure and the merge carries on.

mod identity;
mod interfaces;
mod ipv4;

use std::collections::BTreeMap;

use tracing::debug;

use crate::oid::{Oid, OidExt};
use crate::transport::{SnmpTransport, SnmpValue, VarBind};

pub use identity::{
    ParsedDescription, entity_model_hint, parse_system_description, read_uptime, resolve_identity,
};
pub use interfaces::{refresh_status, walk_interfaces};
pub use ipv4::walk_ipv4;

/// Walk one column. Rows before a transport error are kept.
async fn walk_column<T: SnmpTransport>(transport: &T, column: &[u32]) -> Vec<VarBind> {
    let base = Oid::from_slice(column);
    let (rows, error) = transport.walk(base.clone()).collect_partial().await;
    if let Some(e) = error {
        debug!(device = transport.target(), column = %base, rows = rows.len(), error = %e, "table unavailable");
    }
    rows
}

/// Walk a column indexed by a single arc (ifIndex, bridge port).
async fn walk_indexed<T: SnmpTransport>(transport: &T, column: &[u32]) -> BTreeMap<u32, SnmpValue> {
    let base = Oid::from_slice(column);
    walk_column(transport, column)
        .await
        .into_iter()
        .filter_map(|row| match OidExt::suffix(&row.oid, &base)? {
            [index] => Some((*index, row.value)),
            _ => None,
        })
        .collect()
}

/// GET where any failure counts as "no contribution".
async fn get_optional<T: SnmpTransport>(transport: &T, oid: &Oid) -> Option<SnmpValue> {
    match transport.get(oid).await {
        Ok(value) => value,
        Err(e) => {
            debug!(device = transport.target(), %oid, error = %e, "optional read failed");
            None
        }
    }
}

/// Trimmed, non-empty text from an optional GET.
async fn get_text<T: SnmpTransport>(transport: &T, oid: &Oid) -> Option<String> {
    get_optional(transport, oid)
        .await
        .as_ref()
        .and_then(SnmpValue::non_empty_text)
}
