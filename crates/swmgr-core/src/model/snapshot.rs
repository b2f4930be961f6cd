// ── Committed device snapshot ──
//
// Immutable once published. A refresh builds a new value and swaps it
// in whole; readers never observe a half-merged state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DeviceIdentity, InterfaceRecord, Ipv4Index, Uptime};
use crate::classify::Classification;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceSnapshot {
    pub interfaces: BTreeMap<u32, InterfaceRecord>,
    pub classification: BTreeMap<u32, Classification>,
    pub ipv4: Ipv4Index,
    pub identity: DeviceIdentity,
    pub uptime: Option<Uptime>,
    pub last_full_refresh: Option<DateTime<Utc>>,
    pub last_refresh: Option<DateTime<Utc>>,
    /// Bumped on every commit; 0 until initial discovery completes.
    pub revision: u64,
}

impl DeviceSnapshot {
    /// Initial discovery has completed at least once.
    pub fn is_initialized(&self) -> bool {
        self.last_full_refresh.is_some()
    }

    pub fn interface(&self, if_index: u32) -> Option<&InterfaceRecord> {
        self.interfaces.get(&if_index)
    }

    pub fn is_exposed(&self, if_index: u32) -> bool {
        self.classification
            .get(&if_index)
            .is_some_and(|c| c.included)
    }

    /// Records the classification engine chose to expose.
    pub fn exposed(&self) -> impl Iterator<Item = &InterfaceRecord> {
        self.interfaces
            .values()
            .filter(|record| self.is_exposed(record.if_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, Decision};

    #[test]
    fn exposed_follows_classification() {
        let mut snapshot = DeviceSnapshot::default();
        assert!(!snapshot.is_initialized());
        for idx in [1, 2] {
            snapshot.interfaces.insert(idx, InterfaceRecord::new(idx));
        }
        snapshot.classification.insert(
            1,
            Classification {
                if_index: 1,
                included: true,
                decision: Decision::NoVendorRules,
                display_name: "one".into(),
            },
        );
        let exposed: Vec<u32> = snapshot.exposed().map(|r| r.if_index).collect();
        assert_eq!(exposed, vec![1]);
        assert!(!snapshot.is_exposed(2));
    }
}
