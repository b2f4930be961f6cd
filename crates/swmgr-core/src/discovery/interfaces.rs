// ── Interface table merge ──

use std::collections::BTreeMap;

use tracing::debug;

use super::{walk_column, walk_indexed};
use crate::mib;
use crate::model::{AdminStatus, InterfaceRecord, OperStatus};
use crate::oid::{Oid, OidExt};
use crate::transport::{SnmpTransport, SnmpValue};

/// Build the interface map. The ifIndex walk alone decides which
/// interfaces exist; every other column only annotates them.
pub async fn walk_interfaces<T: SnmpTransport>(transport: &T) -> BTreeMap<u32, InterfaceRecord> {
    let index_base = Oid::from_slice(mib::IF_INDEX);
    let mut interfaces: BTreeMap<u32, InterfaceRecord> = walk_column(transport, mib::IF_INDEX)
        .await
        .into_iter()
        .filter_map(|row| {
            let from_suffix = match OidExt::suffix(&row.oid, &index_base)? {
                [index] => Some(*index),
                _ => None,
            };
            row.value.as_u32().or(from_suffix)
        })
        .map(|index| (index, InterfaceRecord::new(index)))
        .collect();

    if interfaces.is_empty() {
        debug!(device = transport.target(), "ifIndex walk returned nothing");
        return interfaces;
    }

    annotate(transport, &mut interfaces, mib::IF_DESCR, |record, value| {
        record.description = value.non_empty_text();
    })
    .await;
    annotate(transport, &mut interfaces, mib::IF_NAME, |record, value| {
        record.name = value.non_empty_text();
    })
    .await;
    annotate(transport, &mut interfaces, mib::IF_ALIAS, |record, value| {
        record.alias = value.non_empty_text();
    })
    .await;

    refresh_status(transport, &mut interfaces).await;
    merge_speed(transport, &mut interfaces).await;
    merge_vlans(transport, &mut interfaces).await;

    debug!(device = transport.target(), count = interfaces.len(), "interfaces discovered");
    interfaces
}

/// Re-read admin and oper status for interfaces already known.
/// Rows for unknown indices are ignored; interfaces missing from the
/// walk keep their previous state.
pub async fn refresh_status<T: SnmpTransport>(
    transport: &T,
    interfaces: &mut BTreeMap<u32, InterfaceRecord>,
) {
    annotate(transport, interfaces, mib::IF_ADMIN_STATUS, |record, value| {
        if let Some(status) = value.as_i64().and_then(AdminStatus::from_code) {
            record.admin = Some(status);
        }
    })
    .await;
    annotate(transport, interfaces, mib::IF_OPER_STATUS, |record, value| {
        if let Some(status) = value.as_i64().and_then(OperStatus::from_code) {
            record.oper = Some(status);
        }
    })
    .await;
}

async fn annotate<T, F>(
    transport: &T,
    interfaces: &mut BTreeMap<u32, InterfaceRecord>,
    column: &[u32],
    mut apply: F,
) where
    T: SnmpTransport,
    F: FnMut(&mut InterfaceRecord, &SnmpValue),
{
    for (index, value) in walk_indexed(transport, column).await {
        if let Some(record) = interfaces.get_mut(&index) {
            apply(record, &value);
        }
    }
}

/// ifHighSpeed (Mbps) wins over ifSpeed when non-zero. A zero speed
/// from either column means unknown.
async fn merge_speed<T: SnmpTransport>(transport: &T, interfaces: &mut BTreeMap<u32, InterfaceRecord>) {
    let legacy = walk_indexed(transport, mib::IF_SPEED).await;
    let high = walk_indexed(transport, mib::IF_HIGH_SPEED).await;
    for (index, record) in interfaces.iter_mut() {
        let high_bps = high
            .get(index)
            .and_then(SnmpValue::as_u64)
            .filter(|mbps| *mbps > 0)
            .map(|mbps| mbps.saturating_mul(1_000_000));
        let legacy_bps = legacy
            .get(index)
            .and_then(SnmpValue::as_u64)
            .filter(|bps| *bps > 0);
        record.speed_bps = high_bps.or(legacy_bps);
    }
}

/// Join bridge port → ifIndex with PVID by bridge port.
async fn merge_vlans<T: SnmpTransport>(transport: &T, interfaces: &mut BTreeMap<u32, InterfaceRecord>) {
    let port_to_if = walk_indexed(transport, mib::DOT1D_BASE_PORT_IF_INDEX).await;
    if port_to_if.is_empty() {
        return;
    }
    let pvids = walk_indexed(transport, mib::DOT1Q_PVID).await;
    for (port, if_value) in &port_to_if {
        let Some(record) = if_value.as_u32().and_then(|idx| interfaces.get_mut(&idx)) else {
            continue;
        };
        if let Some(vlan) = pvids
            .get(port)
            .and_then(SnmpValue::as_u64)
            .and_then(|v| u16::try_from(v).ok())
        {
            record.vlan_id = Some(vlan);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::{MockAgent, MockFault};

    fn col(column: &[u32], index: u32) -> Oid {
        Oid::from_slice(column).child(index)
    }

    fn agent() -> MockAgent {
        let agent = MockAgent::new("192.0.2.10:161");
        for idx in [1, 2, 3] {
            agent.insert(col(mib::IF_INDEX, idx), SnmpValue::Integer(i64::from(idx)));
            agent.insert(col(mib::IF_DESCR, idx), SnmpValue::text(format!("Port {idx}")));
            agent.insert(col(mib::IF_ADMIN_STATUS, idx), SnmpValue::Integer(1));
            agent.insert(col(mib::IF_OPER_STATUS, idx), SnmpValue::Integer(2));
        }
        // rows for an index the ifIndex walk never reported
        agent.insert(col(mib::IF_DESCR, 99), SnmpValue::text("ghost"));
        agent.insert(col(mib::IF_NAME, 1), SnmpValue::text("gi1"));
        agent.insert(col(mib::IF_ALIAS, 1), SnmpValue::text("uplink"));
        agent.insert(col(mib::IF_ALIAS, 2), SnmpValue::text(""));
        agent.insert(col(mib::IF_SPEED, 1), SnmpValue::Unsigned(4_294_967_295));
        agent.insert(col(mib::IF_HIGH_SPEED, 1), SnmpValue::Unsigned(10_000));
        agent.insert(col(mib::IF_SPEED, 2), SnmpValue::Unsigned(100_000_000));
        agent.insert(col(mib::IF_HIGH_SPEED, 2), SnmpValue::Unsigned(0));
        agent.insert(col(mib::IF_SPEED, 3), SnmpValue::Unsigned(0));
        agent.insert(col(mib::IF_HIGH_SPEED, 3), SnmpValue::Unsigned(0));
        agent.insert(col(mib::DOT1D_BASE_PORT_IF_INDEX, 10), SnmpValue::Integer(2));
        agent.insert(col(mib::DOT1Q_PVID, 10), SnmpValue::Unsigned(20));
        agent
    }

    #[tokio::test]
    async fn index_set_comes_from_if_index_walk() {
        let interfaces = walk_interfaces(&agent()).await;
        assert_eq!(interfaces.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        let first = &interfaces[&1];
        assert_eq!(first.name.as_deref(), Some("gi1"));
        assert_eq!(first.alias.as_deref(), Some("uplink"));
        assert_eq!(first.speed_bps, Some(10_000_000_000));
        assert_eq!(first.admin, Some(AdminStatus::Up));
        assert_eq!(first.oper, Some(OperStatus::Down));

        let second = &interfaces[&2];
        assert_eq!(second.alias, None);
        assert_eq!(second.speed_bps, Some(100_000_000));
        assert_eq!(second.vlan_id, Some(20));
        assert_eq!(interfaces[&3].vlan_id, None);
        // both speed columns report zero
        assert_eq!(interfaces[&3].speed_bps, None);
    }

    #[tokio::test]
    async fn failing_optional_column_keeps_interfaces() {
        let agent = agent();
        agent.fault(Oid::from_slice(mib::IF_NAME), MockFault::Timeout);
        agent.fault(Oid::from_slice(mib::DOT1Q_PVID), MockFault::Protocol("genErr"));
        let interfaces = walk_interfaces(&agent).await;
        assert_eq!(interfaces.len(), 3);
        assert_eq!(interfaces[&1].name, None);
        assert_eq!(interfaces[&1].description.as_deref(), Some("Port 1"));
        assert_eq!(interfaces[&2].vlan_id, None);
    }

    #[tokio::test]
    async fn status_refresh_touches_only_known_indices() {
        let agent = agent();
        let mut interfaces = walk_interfaces(&agent).await;
        agent.insert(col(mib::IF_OPER_STATUS, 1), SnmpValue::Integer(1));
        agent.insert(col(mib::IF_OPER_STATUS, 4), SnmpValue::Integer(1));
        agent.remove(&col(mib::IF_OPER_STATUS, 3));

        refresh_status(&agent, &mut interfaces).await;
        assert_eq!(interfaces.len(), 3);
        assert_eq!(interfaces[&1].oper, Some(OperStatus::Up));
        assert_eq!(interfaces[&3].oper, Some(OperStatus::Down));
    }
}
