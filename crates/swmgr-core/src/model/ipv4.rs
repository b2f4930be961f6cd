// ── IPv4 address index ──
//
// Address → owning ifIndex and address → netmask, assembled from
// several tables per refresh. A mask is only ever replaced by a more
// specific one; an address without an owner is kept here but never
// attached to an interface.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::Serialize;

use super::interface::{InterfaceRecord, Ipv4Assignment};

/// Destination prefix from the forwarding table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoutePrefix {
    pub network: Ipv4Addr,
    pub prefix_len: u8,
}

impl RoutePrefix {
    pub fn netmask(&self) -> Ipv4Addr {
        prefix_to_mask(self.prefix_len).unwrap_or(Ipv4Addr::BROADCAST)
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        let mask = u32::from(self.netmask());
        u32::from(address) & mask == u32::from(self.network) & mask
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ipv4Index {
    owners: BTreeMap<Ipv4Addr, Option<u32>>,
    masks: BTreeMap<Ipv4Addr, Ipv4Addr>,
}

impl Ipv4Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an address. A known owner is never replaced.
    pub fn record_address(&mut self, address: Ipv4Addr, owner: Option<u32>) {
        if address.is_unspecified() {
            return;
        }
        let owner = owner.filter(|idx| *idx > 0);
        let slot = self.owners.entry(address).or_insert(None);
        if slot.is_none() {
            *slot = owner;
        }
    }

    /// Record a mask unless an equally or more specific one is known.
    /// Returns whether the mask was stored.
    pub fn record_mask(&mut self, address: Ipv4Addr, mask: Ipv4Addr) -> bool {
        if address.is_unspecified() {
            return false;
        }
        let specificity = |m: Ipv4Addr| u32::from(m).count_ones();
        match self.masks.get(&address) {
            Some(existing) if specificity(*existing) >= specificity(mask) => false,
            _ => {
                self.masks.insert(address, mask);
                true
            }
        }
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        self.owners.contains_key(&address)
    }

    pub fn owner(&self, address: Ipv4Addr) -> Option<u32> {
        self.owners.get(&address).copied().flatten()
    }

    pub fn netmask(&self, address: Ipv4Addr) -> Option<Ipv4Addr> {
        self.masks.get(&address).copied()
    }

    pub fn addresses(&self) -> impl Iterator<Item = (Ipv4Addr, Option<u32>)> + '_ {
        self.owners.iter().map(|(addr, owner)| (*addr, *owner))
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Fill masks still unknown from the most specific containing route.
    /// Ties keep the route listed first.
    pub fn backfill_masks(&mut self, routes: &[RoutePrefix]) {
        let unknown: Vec<Ipv4Addr> = self
            .owners
            .keys()
            .filter(|addr| !self.masks.contains_key(addr))
            .copied()
            .collect();
        for address in unknown {
            if let Some(route) = most_specific_route(routes, address) {
                self.record_mask(address, route.netmask());
            }
        }
    }

    /// Replace every interface's IPv4 list with what this index knows.
    /// Addresses whose owner is unknown, or not in `interfaces`, are skipped.
    pub fn attach(&self, interfaces: &mut BTreeMap<u32, InterfaceRecord>) {
        for record in interfaces.values_mut() {
            record.ipv4.clear();
        }
        for (address, owner) in self.addresses() {
            let Some(record) = owner.and_then(|idx| interfaces.get_mut(&idx)) else {
                continue;
            };
            let netmask = self.netmask(address);
            record.ipv4.push(Ipv4Assignment {
                address,
                netmask,
                prefix_len: netmask.and_then(mask_to_prefix),
            });
        }
    }
}

/// Longest-prefix route containing `address`; first listed wins ties.
pub fn most_specific_route(routes: &[RoutePrefix], address: Ipv4Addr) -> Option<RoutePrefix> {
    let mut best: Option<RoutePrefix> = None;
    for route in routes.iter().filter(|r| r.contains(address)) {
        if best.is_none_or(|b| route.prefix_len > b.prefix_len) {
            best = Some(*route);
        }
    }
    best
}

/// Prefix length for a contiguous mask.
pub fn mask_to_prefix(mask: Ipv4Addr) -> Option<u8> {
    let bits = u32::from(mask);
    let ones = bits.leading_ones();
    if bits.checked_shl(ones).unwrap_or(0) != 0 {
        return None;
    }
    u8::try_from(ones).ok()
}

pub fn prefix_to_mask(prefix_len: u8) -> Option<Ipv4Addr> {
    match prefix_len {
        0 => Some(Ipv4Addr::UNSPECIFIED),
        1..=32 => Some(Ipv4Addr::from(u32::MAX << (32 - u32::from(prefix_len)))),
        _ => None,
    }
}

/// Find `1.4.a.b.c.d` (InetAddressType ipv4, length 4) in an instance
/// suffix and return the address.
pub fn parse_address_suffix(suffix: &[u32]) -> Option<Ipv4Addr> {
    suffix
        .windows(6)
        .find_map(|w| match w {
            [1, 4, a, b, c, d] => octets([*a, *b, *c, *d]),
            _ => None,
        })
}

/// Find `1.4.a.b.c.d.len` in an inetCidrRouteTable suffix.
pub fn parse_route_suffix(suffix: &[u32]) -> Option<RoutePrefix> {
    suffix.windows(7).find_map(|w| match w {
        [1, 4, a, b, c, d, bits] if *bits <= 32 => Some(RoutePrefix {
            network: octets([*a, *b, *c, *d])?,
            prefix_len: u8::try_from(*bits).ok()?,
        }),
        _ => None,
    })
}

/// The first four arcs as an address (ipAdEntTable, ospfIfTable).
pub fn parse_leading_address(suffix: &[u32]) -> Option<Ipv4Addr> {
    match suffix {
        [a, b, c, d, ..] => octets([*a, *b, *c, *d]),
        _ => None,
    }
}

fn octets(arcs: [u32; 4]) -> Option<Ipv4Addr> {
    let [a, b, c, d] = arcs;
    Some(Ipv4Addr::new(
        u8::try_from(a).ok()?,
        u8::try_from(b).ok()?,
        u8::try_from(c).ok()?,
        u8::try_from(d).ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    fn route(net: &str, len: u8) -> RoutePrefix {
        RoutePrefix {
            network: ip(net),
            prefix_len: len,
        }
    }

    #[test]
    fn most_specific_route_wins() {
        let mut index = Ipv4Index::new();
        index.record_address(ip("10.0.0.5"), Some(3));
        index.backfill_masks(&[route("10.0.0.0", 8), route("10.0.0.0", 24)]);
        assert_eq!(index.netmask(ip("10.0.0.5")), Some(ip("255.255.255.0")));
    }

    #[test]
    fn default_route_is_weakest_candidate() {
        let routes = [route("0.0.0.0", 0), route("192.168.1.0", 24), route("0.0.0.0", 0)];
        assert_eq!(
            most_specific_route(&routes, ip("192.168.1.9")),
            Some(route("192.168.1.0", 24))
        );
        assert_eq!(
            most_specific_route(&routes, ip("172.16.0.1")),
            Some(route("0.0.0.0", 0))
        );
    }

    #[test]
    fn host_route_beats_subnet_and_default() {
        let routes = [route("0.0.0.0", 0), route("10.1.1.0", 24), route("10.1.1.1", 32)];
        assert_eq!(
            most_specific_route(&routes, ip("10.1.1.1")).map(|r| r.netmask()),
            Some(ip("255.255.255.255"))
        );
    }

    #[test]
    fn masks_are_never_downgraded() {
        let mut index = Ipv4Index::new();
        let addr = ip("10.0.0.5");
        assert!(index.record_mask(addr, ip("255.255.255.0")));
        assert!(!index.record_mask(addr, ip("255.0.0.0")));
        assert!(index.record_mask(addr, ip("255.255.255.252")));
        assert_eq!(index.netmask(addr), Some(ip("255.255.255.252")));
    }

    #[test]
    fn routes_do_not_override_known_masks() {
        let mut index = Ipv4Index::new();
        let addr = ip("10.0.0.5");
        index.record_address(addr, Some(1));
        index.record_mask(addr, ip("255.255.0.0"));
        index.backfill_masks(&[route("10.0.0.0", 24)]);
        assert_eq!(index.netmask(addr), Some(ip("255.255.0.0")));
    }

    #[test]
    fn owner_is_never_replaced() {
        let mut index = Ipv4Index::new();
        index.record_address(ip("192.0.2.1"), Some(4));
        index.record_address(ip("192.0.2.1"), Some(9));
        index.record_address(ip("192.0.2.2"), None);
        index.record_address(ip("192.0.2.2"), Some(5));
        index.record_address(ip("0.0.0.0"), Some(1));
        assert_eq!(index.owner(ip("192.0.2.1")), Some(4));
        assert_eq!(index.owner(ip("192.0.2.2")), Some(5));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn attach_clears_stale_and_skips_orphans() {
        let mut interfaces = BTreeMap::new();
        let mut stale = InterfaceRecord::new(1);
        stale.ipv4.push(Ipv4Assignment {
            address: ip("198.51.100.1"),
            netmask: None,
            prefix_len: None,
        });
        interfaces.insert(1, stale);
        interfaces.insert(2, InterfaceRecord::new(2));

        let mut index = Ipv4Index::new();
        index.record_address(ip("10.0.0.1"), Some(2));
        index.record_mask(ip("10.0.0.1"), ip("255.255.255.0"));
        index.record_address(ip("10.9.9.9"), None);
        index.record_address(ip("10.8.8.8"), Some(77));
        index.attach(&mut interfaces);

        assert!(interfaces[&1].ipv4.is_empty());
        assert_eq!(
            interfaces[&2].ipv4,
            vec![Ipv4Assignment {
                address: ip("10.0.0.1"),
                netmask: Some(ip("255.255.255.0")),
                prefix_len: Some(24),
            }]
        );
    }

    #[test]
    fn mask_prefix_conversion() {
        assert_eq!(mask_to_prefix(ip("255.255.255.0")), Some(24));
        assert_eq!(mask_to_prefix(ip("255.255.255.255")), Some(32));
        assert_eq!(mask_to_prefix(ip("0.0.0.0")), Some(0));
        assert_eq!(mask_to_prefix(ip("255.0.255.0")), None);
        assert_eq!(prefix_to_mask(20), Some(ip("255.255.240.0")));
        assert_eq!(prefix_to_mask(33), None);
    }

    #[test]
    fn suffix_parsing() {
        // ipAddressIfIndex.ipv4."10.0.0.5"
        assert_eq!(parse_address_suffix(&[1, 4, 10, 0, 0, 5]), Some(ip("10.0.0.5")));
        assert_eq!(parse_address_suffix(&[2, 16, 254, 128]), None);
        assert_eq!(parse_address_suffix(&[1, 4, 300, 0, 0, 1]), None);
        // inetCidrRouteIfIndex.ipv4."10.0.0.0".24.policy.ipv4."0.0.0.0"
        assert_eq!(
            parse_route_suffix(&[1, 4, 10, 0, 0, 0, 24, 2, 0, 0, 1, 4, 0, 0, 0, 0]),
            Some(route("10.0.0.0", 24))
        );
        assert_eq!(parse_route_suffix(&[1, 4, 10, 0, 0, 0, 40, 2]), None);
        assert_eq!(parse_leading_address(&[192, 168, 1, 1, 0]), Some(ip("192.168.1.1")));
    }
}
