// ── Subtree walk ──
//
// GETNEXT iteration under a base OID. Every returned OID is checked
// against the base explicitly, and an OID seen twice ends the walk,
// so agents that loop or run past the subtree cannot hang discovery.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::{SnmpError, SnmpTransport, VarBind};
use crate::oid::Oid;

/// Lazy, single-pass walk. Once it yields `None` or an error it is
/// exhausted for good.
pub struct Walk<'a, T> {
    transport: &'a T,
    base: Oid,
    cursor: Oid,
    seen: HashSet<Oid>,
    done: bool,
}

impl<'a, T: SnmpTransport> Walk<'a, T> {
    pub fn new(transport: &'a T, base: Oid) -> Self {
        Self {
            transport,
            cursor: base.clone(),
            base,
            seen: HashSet::new(),
            done: false,
        }
    }

    pub fn base(&self) -> &Oid {
        &self.base
    }

    /// Next binding under the base OID.
    pub async fn next(&mut self) -> Option<Result<VarBind, SnmpError>> {
        if self.done {
            return None;
        }

        let step = self.transport.get_next(&self.cursor).await;
        let varbind = match step {
            Ok(Some(varbind)) => varbind,
            Ok(None) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if !varbind.oid.starts_with(&self.base) {
            self.done = true;
            return None;
        }
        if !self.seen.insert(varbind.oid.clone()) {
            warn!(
                agent = self.transport.target(),
                base = %self.base,
                oid = %varbind.oid,
                "agent repeated an OID, aborting walk"
            );
            self.done = true;
            return None;
        }

        self.cursor.clone_from(&varbind.oid);
        Some(Ok(varbind))
    }

    /// Drain the walk, failing on the first transport error.
    pub async fn collect(mut self) -> Result<Vec<VarBind>, SnmpError> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await {
            rows.push(row?);
        }
        Ok(rows)
    }

    /// Drain the walk, keeping whatever arrived before an error.
    pub async fn collect_partial(mut self) -> (Vec<VarBind>, Option<SnmpError>) {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await {
            match row {
                Ok(varbind) => rows.push(varbind),
                Err(e) => {
                    debug!(base = %self.base, rows = rows.len(), error = %e, "walk interrupted");
                    return (rows, Some(e));
                }
            }
        }
        (rows, None)
    }
}
