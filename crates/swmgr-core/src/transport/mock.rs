// ── In-memory agent ──
//
// An ordered OID map served through `SnmpTransport`. Faults are
// attached to OID prefixes so timeouts, agent errors, refused writes
// and misbehaving walks can be exercised without a network.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{SnmpError, SnmpTransport, SnmpValue, VarBind};
use crate::oid::Oid;

/// Failure injected for requests under an OID prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFault {
    /// Every request times out.
    Timeout,
    /// The agent answers with this error status.
    Protocol(&'static str),
    /// Reads succeed, writes are refused with `noAccess`.
    DenyWrite,
    /// GETNEXT keeps answering with the first binding under the prefix.
    Loop,
    /// The request never completes.
    Hang,
}

#[derive(Debug, Default)]
struct AgentState {
    values: BTreeMap<Oid, SnmpValue>,
    faults: Vec<(Oid, MockFault)>,
    writes: Vec<(Oid, SnmpValue)>,
    requests: usize,
}

/// Cloneable handle; clones share the same agent state.
#[derive(Debug, Clone, Default)]
pub struct MockAgent {
    target: String,
    state: Arc<Mutex<AgentState>>,
}

impl MockAgent {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: Arc::default(),
        }
    }

    pub fn with(self, oid: Oid, value: SnmpValue) -> Self {
        self.insert(oid, value);
        self
    }

    pub fn insert(&self, oid: Oid, value: SnmpValue) {
        self.lock().values.insert(oid, value);
    }

    pub fn remove(&self, oid: &Oid) -> Option<SnmpValue> {
        self.lock().values.remove(oid)
    }

    /// Drop every binding under `prefix`.
    pub fn remove_subtree(&self, prefix: &Oid) {
        self.lock().values.retain(|oid, _| !oid.starts_with(prefix));
    }

    pub fn value(&self, oid: &Oid) -> Option<SnmpValue> {
        self.lock().values.get(oid).cloned()
    }

    pub fn fault(&self, prefix: Oid, fault: MockFault) {
        self.lock().faults.push((prefix, fault));
    }

    pub fn clear_faults(&self) {
        self.lock().faults.clear();
    }

    /// Successful SETs, oldest first.
    pub fn writes(&self) -> Vec<(Oid, SnmpValue)> {
        self.lock().writes.clone()
    }

    /// Number of GET / GETNEXT / SET requests served so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    fn lock(&self) -> MutexGuard<'_, AgentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the request and return the fault covering `oid`, if any.
    fn begin(&self, oid: &Oid) -> Option<MockFault> {
        let mut state = self.lock();
        state.requests += 1;
        state
            .faults
            .iter()
            .find(|(prefix, _)| oid.starts_with(prefix))
            .map(|(_, fault)| fault.clone())
    }

    fn read_fault(&self, oid: &Oid, fault: &MockFault) -> Option<SnmpError> {
        match fault {
            MockFault::Timeout => Some(SnmpError::Timeout {
                target: self.target.clone(),
                oid: oid.clone(),
            }),
            MockFault::Protocol(status) => Some(SnmpError::Protocol {
                target: self.target.clone(),
                oid: oid.clone(),
                status: (*status).to_owned(),
            }),
            MockFault::DenyWrite | MockFault::Loop | MockFault::Hang => None,
        }
    }

    fn loop_target(&self, oid: &Oid) -> Option<VarBind> {
        let state = self.lock();
        let (prefix, _) = state
            .faults
            .iter()
            .find(|(prefix, fault)| *fault == MockFault::Loop && oid.starts_with(prefix))?;
        state
            .values
            .range((Bound::Excluded(prefix.clone()), Bound::Unbounded))
            .next()
            .filter(|(found, _)| found.starts_with(prefix))
            .map(|(found, value)| VarBind::new(found.clone(), value.clone()))
    }
}

impl SnmpTransport for MockAgent {
    fn target(&self) -> &str {
        &self.target
    }

    async fn get(&self, oid: &Oid) -> Result<Option<SnmpValue>, SnmpError> {
        if let Some(fault) = self.begin(oid) {
            if fault == MockFault::Hang {
                std::future::pending::<()>().await;
            }
            if let Some(err) = self.read_fault(oid, &fault) {
                return Err(err);
            }
        }
        Ok(self.value(oid))
    }

    async fn get_next(&self, oid: &Oid) -> Result<Option<VarBind>, SnmpError> {
        if let Some(fault) = self.begin(oid) {
            match fault {
                MockFault::Hang => std::future::pending::<()>().await,
                MockFault::Loop => return Ok(self.loop_target(oid)),
                _ => {}
            }
            if let Some(err) = self.read_fault(oid, &fault) {
                return Err(err);
            }
        }
        let state = self.lock();
        Ok(state
            .values
            .range((Bound::Excluded(oid.clone()), Bound::Unbounded))
            .next()
            .map(|(found, value)| VarBind::new(found.clone(), value.clone())))
    }

    async fn set(&self, oid: &Oid, value: SnmpValue) -> Result<(), SnmpError> {
        if let Some(fault) = self.begin(oid) {
            match fault {
                MockFault::Hang => std::future::pending::<()>().await,
                MockFault::DenyWrite => {
                    return Err(SnmpError::PermissionDenied {
                        target: self.target.clone(),
                        oid: oid.clone(),
                        status: "noAccess".to_owned(),
                    });
                }
                _ => {}
            }
            if let Some(err) = self.read_fault(oid, &fault) {
                return Err(err);
            }
        }
        let mut state = self.lock();
        state.values.insert(oid.clone(), value.clone());
        state.writes.push((oid.clone(), value));
        Ok(())
    }
}
