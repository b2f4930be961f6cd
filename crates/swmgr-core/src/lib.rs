//! SNMP switch inventory and port classification.
//!
//! This crate owns discovery, the domain model and the rule engine for
//! the swmgr workspace:
//!
//! - **[`Coordinator`]** — Per-device facade. [`initialize()`](Coordinator::initialize)
//!   runs the first full discovery; [`start()`](Coordinator::start) spawns a
//!   poll loop and a command processor. Snapshots are published through a
//!   [`SnapshotStore`] and replaced whole on every commit.
//!
//! - **Transport** ([`transport`]) — GET / GETNEXT walk / SET behind the
//!   [`SnmpTransport`] trait. [`SnmpSession`] talks to a real agent;
//!   [`MockAgent`] serves an in-memory MIB for tests.
//!
//! - **Discovery** ([`discovery`]) — Walks the IF-MIB, bridge, IP and
//!   ENTITY tables and merges them by ifIndex. Every table is optional.
//!
//! - **Classification** ([`classify`]) — Built-in vendor rules, user
//!   include/exclude substring rules and regex rename rules, evaluated in
//!   a fixed order.
//!
//! - **Domain model** ([`model`]) — `InterfaceRecord`, `DeviceIdentity`,
//!   `Ipv4Index` and the committed `DeviceSnapshot`.

pub mod classify;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod discovery;
pub mod error;
pub mod mib;
pub mod model;
pub mod oid;
pub mod store;
pub mod transport;
pub mod vendor;

// ── Primary re-exports ──────────────────────────────────────────────
pub use classify::{Classification, ClassificationEngine, Decision, RuleDiagnostic};
pub use command::{Command, CommandResult};
pub use config::{
    CustomOids, DeviceConfig, DeviceEndpoint, MatchRules, OidField, RenameRuleSpec, RuleConfig,
};
pub use coordinator::Coordinator;
pub use error::CoreError;
pub use model::{
    AdminStatus, DeviceIdentity, DeviceSnapshot, InterfaceRecord, Ipv4Assignment, Ipv4Index,
    OperStatus, Uptime, format_speed,
};
pub use oid::{Oid, OidExt, parse_oid};
pub use store::SnapshotStore;
pub use transport::{MockAgent, MockFault, SnmpError, SnmpSession, SnmpTransport, SnmpValue};
pub use vendor::{VendorTag, detect_vendor};
