// ── IPv4 address resolution ──
//
// Four sources, each additive:
//   a. ipAddrTable: address, owner and mask
//   b. ipAddressTable: address and owner, address in the suffix
//   c. ospfIfTable: addresses the first two missed (loopbacks)
//   d. inetCidrRouteTable: masks for addresses still without one

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use tracing::debug;

use super::walk_column;
use crate::mib;
use crate::model::{
    Ipv4Index, RoutePrefix, parse_address_suffix, parse_leading_address, parse_route_suffix,
};
use crate::oid::{Oid, OidExt};
use crate::transport::{SnmpTransport, SnmpValue};

pub async fn walk_ipv4<T: SnmpTransport>(transport: &T) -> Ipv4Index {
    let mut index = Ipv4Index::new();

    legacy_address_table(transport, &mut index).await;
    modern_address_table(transport, &mut index).await;
    ospf_interface_addresses(transport, &mut index).await;

    let routes = route_prefixes(transport).await;
    index.backfill_masks(&routes);

    debug!(device = transport.target(), addresses = index.len(), routes = routes.len(), "ipv4 resolved");
    index
}

/// Rows of an ipAddrTable column keyed by the address in the suffix.
async fn by_leading_address<T: SnmpTransport>(
    transport: &T,
    column: &[u32],
) -> Vec<(Ipv4Addr, SnmpValue)> {
    let base = Oid::from_slice(column);
    walk_column(transport, column)
        .await
        .into_iter()
        .filter_map(|row| {
            let address = parse_leading_address(OidExt::suffix(&row.oid, &base)?)?;
            Some((address, row.value))
        })
        .collect()
}

async fn legacy_address_table<T: SnmpTransport>(transport: &T, index: &mut Ipv4Index) {
    let owners: BTreeMap<Ipv4Addr, u32> = by_leading_address(transport, mib::IP_AD_ENT_IF_INDEX)
        .await
        .into_iter()
        .filter_map(|(address, value)| Some((address, value.as_u32()?)))
        .collect();

    for (suffix_address, value) in by_leading_address(transport, mib::IP_AD_ENT_ADDR).await {
        let address = value.as_ipv4().unwrap_or(suffix_address);
        index.record_address(address, owners.get(&address).copied());
    }
    for (address, owner) in &owners {
        index.record_address(*address, Some(*owner));
    }

    for (address, value) in by_leading_address(transport, mib::IP_AD_ENT_NET_MASK).await {
        if let Some(mask) = value.as_ipv4().filter(|m| !m.is_unspecified()) {
            index.record_mask(address, mask);
        }
    }
}

async fn modern_address_table<T: SnmpTransport>(transport: &T, index: &mut Ipv4Index) {
    let base = Oid::from_slice(mib::IP_ADDRESS_IF_INDEX);
    for row in walk_column(transport, mib::IP_ADDRESS_IF_INDEX).await {
        let Some(address) = OidExt::suffix(&row.oid, &base).and_then(parse_address_suffix) else {
            continue;
        };
        index.record_address(address, row.value.as_u32());
    }
}

/// ospfIfIpAddress is indexed by (address, addressLessIf). The second
/// arc is the ifIndex for unnumbered interfaces and 0 otherwise.
async fn ospf_interface_addresses<T: SnmpTransport>(transport: &T, index: &mut Ipv4Index) {
    let base = Oid::from_slice(mib::OSPF_IF_IP_ADDRESS);
    for row in walk_column(transport, mib::OSPF_IF_IP_ADDRESS).await {
        let Some(suffix) = OidExt::suffix(&row.oid, &base) else {
            continue;
        };
        let Some(address) = parse_leading_address(suffix).or_else(|| row.value.as_ipv4()) else {
            continue;
        };
        if index.contains(address) {
            continue;
        }
        let owner = suffix.get(4).copied().filter(|arc| *arc > 0);
        index.record_address(address, owner);
    }
}

/// Destination prefixes in walk order.
async fn route_prefixes<T: SnmpTransport>(transport: &T) -> Vec<RoutePrefix> {
    let base = Oid::from_slice(mib::INET_CIDR_ROUTE_IF_INDEX);
    walk_column(transport, mib::INET_CIDR_ROUTE_IF_INDEX)
        .await
        .into_iter()
        .filter_map(|row| parse_route_suffix(OidExt::suffix(&row.oid, &base)?))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::{MockAgent, MockFault};

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn at(column: &[u32], tail: &[u32]) -> Oid {
        let mut arcs = column.to_vec();
        arcs.extend_from_slice(tail);
        Oid::from_slice(&arcs)
    }

    fn route_row(agent: &MockAgent, net: [u32; 4], bits: u32) {
        let mut tail = vec![1, 4];
        tail.extend_from_slice(&net);
        tail.extend_from_slice(&[bits, 2, 0, 0, 1, 4, 0, 0, 0, 0]);
        agent.insert(at(mib::INET_CIDR_ROUTE_IF_INDEX, &tail), SnmpValue::Integer(3));
    }

    #[tokio::test]
    async fn legacy_table_supplies_owner_and_mask() {
        let agent = MockAgent::new("192.0.2.1:161");
        agent.insert(at(mib::IP_AD_ENT_ADDR, &[192, 168, 1, 1]), SnmpValue::IpAddress([192, 168, 1, 1]));
        agent.insert(at(mib::IP_AD_ENT_IF_INDEX, &[192, 168, 1, 1]), SnmpValue::Integer(100));
        agent.insert(
            at(mib::IP_AD_ENT_NET_MASK, &[192, 168, 1, 1]),
            SnmpValue::IpAddress([255, 255, 255, 0]),
        );
        let index = walk_ipv4(&agent).await;
        assert_eq!(index.owner(ip("192.168.1.1")), Some(100));
        assert_eq!(index.netmask(ip("192.168.1.1")), Some(ip("255.255.255.0")));
    }

    #[tokio::test]
    async fn modern_table_and_routes_fill_gaps() {
        let agent = MockAgent::new("192.0.2.1:161");
        agent.insert(at(mib::IP_ADDRESS_IF_INDEX, &[1, 4, 10, 0, 0, 5]), SnmpValue::Integer(3));
        route_row(&agent, [10, 0, 0, 0], 24);
        route_row(&agent, [10, 0, 0, 0], 8);
        route_row(&agent, [0, 0, 0, 0], 0);

        let index = walk_ipv4(&agent).await;
        assert_eq!(index.owner(ip("10.0.0.5")), Some(3));
        assert_eq!(index.netmask(ip("10.0.0.5")), Some(ip("255.255.255.0")));
    }

    #[tokio::test]
    async fn ospf_only_adds_unknown_addresses() {
        let agent = MockAgent::new("192.0.2.1:161");
        agent.insert(at(mib::IP_ADDRESS_IF_INDEX, &[1, 4, 10, 1, 1, 1]), SnmpValue::Integer(7));
        agent.insert(at(mib::OSPF_IF_IP_ADDRESS, &[10, 1, 1, 1, 0]), SnmpValue::IpAddress([10, 1, 1, 1]));
        agent.insert(
            at(mib::OSPF_IF_IP_ADDRESS, &[10, 255, 0, 1, 0]),
            SnmpValue::IpAddress([10, 255, 0, 1]),
        );
        agent.insert(
            at(mib::OSPF_IF_IP_ADDRESS, &[10, 255, 0, 2, 12]),
            SnmpValue::IpAddress([10, 255, 0, 2]),
        );

        let index = walk_ipv4(&agent).await;
        assert_eq!(index.owner(ip("10.1.1.1")), Some(7));
        assert!(index.contains(ip("10.255.0.1")));
        assert_eq!(index.owner(ip("10.255.0.1")), None);
        assert_eq!(index.owner(ip("10.255.0.2")), Some(12));
    }

    #[tokio::test]
    async fn failing_tables_leave_other_sources_intact() {
        let agent = MockAgent::new("192.0.2.1:161");
        agent.fault(Oid::from_slice(mib::IP_AD_ENT_ADDR), MockFault::Timeout);
        agent.fault(Oid::from_slice(mib::IP_AD_ENT_IF_INDEX), MockFault::Timeout);
        agent.fault(Oid::from_slice(mib::INET_CIDR_ROUTE_IF_INDEX), MockFault::Protocol("genErr"));
        agent.insert(at(mib::IP_ADDRESS_IF_INDEX, &[1, 4, 172, 16, 0, 1]), SnmpValue::Integer(2));

        let index = walk_ipv4(&agent).await;
        assert_eq!(index.owner(ip("172.16.0.1")), Some(2));
        assert_eq!(index.netmask(ip("172.16.0.1")), None);
    }
}
