mod identity;
mod interface;
mod ipv4;
mod snapshot;

pub use identity::{DeviceIdentity, Uptime};
pub use interface::{AdminStatus, InterfaceRecord, Ipv4Assignment, OperStatus, format_speed};
pub use ipv4::{
    Ipv4Index, RoutePrefix, mask_to_prefix, most_specific_route, parse_address_suffix,
    parse_leading_address, parse_route_suffix, prefix_to_mask,
};
pub use snapshot::DeviceSnapshot;
