//! Shared helpers for command handlers.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use swmgr_core::{Coordinator, DeviceSnapshot, SnmpSession};

use crate::config::Target;
use crate::error::CliError;

/// A device that completed initial discovery.
pub struct Discovered {
    pub label: String,
    pub host: String,
    pub coordinator: Coordinator<SnmpSession>,
    pub snapshot: Arc<DeviceSnapshot>,
}

impl Discovered {
    /// Config label, plus the display name when it differs.
    pub fn heading(&self) -> String {
        let name = self.coordinator.display_name();
        if name == self.label {
            name
        } else {
            format!("{} ({name})", self.label)
        }
    }
}

/// Open a session and run the first full discovery.
pub async fn discover(target: Target) -> Result<Discovered, CliError> {
    let host = target.config.endpoint.target();
    let coordinator = Coordinator::connect(target.config).await?;
    let snapshot = coordinator.initialize().await?;
    debug!(device = %target.label, interfaces = snapshot.interfaces.len(), "discovered");
    Ok(Discovered {
        label: target.label,
        host,
        coordinator,
        snapshot,
    })
}

/// Discover every target in parallel.
///
/// Failures are reported and skipped; the command only fails when no
/// device could be discovered at all.
pub async fn discover_all(targets: Vec<Target>) -> Result<Vec<Discovered>, CliError> {
    let labels: Vec<String> = targets.iter().map(|t| t.label.clone()).collect();
    let results = join_all(targets.into_iter().map(discover)).await;

    let mut discovered = Vec::with_capacity(results.len());
    let mut first_error = None;
    for (label, result) in labels.into_iter().zip(results) {
        match result {
            Ok(device) => discovered.push(device),
            Err(err) => {
                warn!(device = %label, error = %err, "discovery failed");
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match first_error {
        Some(err) if discovered.is_empty() => Err(err),
        _ => Ok(discovered),
    }
}

/// Render an optional value, `-` when absent.
pub fn or_dash(value: Option<&str>) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or("-").to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_dash_treats_empty_as_missing() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("CBS350")), "CBS350");
    }
}
