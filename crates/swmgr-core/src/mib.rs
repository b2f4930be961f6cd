// ── MIB object identifiers ──
//
// Every OID the discovery plan touches. Scalars include the `.0`
// instance; table columns do not.

// ── SNMPv2-MIB system group ──────────────────────────────────────────
pub const SYS_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 1, 0];
pub const SYS_UPTIME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 3, 0];
pub const SYS_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 1, 5, 0];

// ── IF-MIB ifTable / ifXTable ────────────────────────────────────────
pub const IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 1];
pub const IF_DESCR: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];
pub const IF_SPEED: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5];
pub const IF_ADMIN_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 7];
pub const IF_OPER_STATUS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 8];
pub const IF_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1];
pub const IF_HIGH_SPEED: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 15];
pub const IF_ALIAS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 18];

// ── BRIDGE-MIB / Q-BRIDGE-MIB ────────────────────────────────────────
pub const DOT1D_BASE_PORT_IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 1, 4, 1, 2];
pub const DOT1Q_PVID: &[u32] = &[1, 3, 6, 1, 2, 1, 17, 7, 1, 4, 5, 1, 1];

// ── IP-MIB ───────────────────────────────────────────────────────────
pub const IP_AD_ENT_ADDR: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 1];
pub const IP_AD_ENT_IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 2];
pub const IP_AD_ENT_NET_MASK: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 20, 1, 3];
pub const IP_ADDRESS_IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 34, 1, 3];

// ── OSPF-MIB / IP-FORWARD-MIB ────────────────────────────────────────
pub const OSPF_IF_IP_ADDRESS: &[u32] = &[1, 3, 6, 1, 2, 1, 14, 8, 1, 1];
pub const INET_CIDR_ROUTE_IF_INDEX: &[u32] = &[1, 3, 6, 1, 2, 1, 4, 24, 7, 1, 9];

// ── ENTITY-MIB ───────────────────────────────────────────────────────
pub const ENT_PHYSICAL_MODEL_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 13];

// ── Vendor-specific ──────────────────────────────────────────────────

/// entPhysicalSoftwareRev of the CBS350 base chassis.
pub const CISCO_CBS_SOFTWARE_REV: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 10, 67_109_120];
/// entPhysicalMfgName of the Zyxel base chassis.
pub const ZYXEL_MFG_NAME: &[u32] = &[1, 3, 6, 1, 2, 1, 47, 1, 1, 1, 1, 12, 67_108_992];
pub const ZYXEL_FIRMWARE_VERSION: &[u32] = &[1, 3, 6, 1, 4, 1, 890, 1, 15, 3, 1, 6, 0];
/// routerBoardInfoSoftwareVersion.
pub const MIKROTIK_SOFTWARE_VERSION: &[u32] = &[1, 3, 6, 1, 4, 1, 14988, 1, 1, 7, 4, 0];
/// routerBoardInfoModel.
pub const MIKROTIK_MODEL: &[u32] = &[1, 3, 6, 1, 4, 1, 14988, 1, 1, 7, 8, 0];
