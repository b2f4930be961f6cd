// ── Snapshot store ──
//
// Holds the last committed `DeviceSnapshot`. Reads are lock-free via
// `ArcSwap`; every commit bumps a revision on a `watch` channel so
// subscribers can await the next change.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

use crate::model::DeviceSnapshot;

pub struct SnapshotStore {
    current: ArcSwap<DeviceSnapshot>,
    revision: watch::Sender<u64>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0u64);
        Self {
            current: ArcSwap::from_pointee(DeviceSnapshot::default()),
            revision,
        }
    }

    /// The latest committed snapshot.
    pub fn load(&self) -> Arc<DeviceSnapshot> {
        self.current.load_full()
    }

    /// Publish `snapshot` under the next revision and return it.
    pub fn commit(&self, mut snapshot: DeviceSnapshot) -> u64 {
        let next = *self.revision.borrow() + 1;
        snapshot.revision = next;
        self.current.store(Arc::new(snapshot));
        self.revision.send_replace(next);
        next
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that fires after every commit.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::InterfaceRecord;

    #[tokio::test]
    async fn commit_publishes_and_notifies() {
        let store = SnapshotStore::new();
        let mut rx = store.subscribe();
        assert_eq!(store.load().revision, 0);

        let mut snapshot = DeviceSnapshot::default();
        snapshot.interfaces.insert(1, InterfaceRecord::new(1));
        let held = store.load();
        assert_eq!(store.commit(snapshot), 1);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
        assert_eq!(store.load().interfaces.len(), 1);
        assert!(held.interfaces.is_empty(), "earlier readers keep their copy");
    }
}
