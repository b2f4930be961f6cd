// ── Refresh coordinator ──
//
// Owns one device: its transport, the committed snapshot and the rule
// set. Full refreshes rebuild the interface map; dynamic refreshes
// only re-read state on the existing one. Every pass works on a copy
// and commits at the end, so dropping a pass mid-flight leaves the
// previous snapshot in place.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classify::{ClassificationEngine, RuleDiagnostic};
use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::{DeviceConfig, RuleConfig};
use crate::discovery::{
    entity_model_hint, read_uptime, refresh_status, resolve_identity, walk_interfaces, walk_ipv4,
};
use crate::error::CoreError;
use crate::mib;
use crate::model::{AdminStatus, DeviceSnapshot, InterfaceRecord};
use crate::oid::Oid;
use crate::store::SnapshotStore;
use crate::transport::{SnmpSession, SnmpTransport, SnmpValue};

const COMMAND_CHANNEL_SIZE: usize = 32;

// ── Uptime throttle ──────────────────────────────────────────────────

/// Spaces out uptime reads independently of the poll cadence.
#[derive(Debug, Clone)]
struct UptimeThrottle {
    interval: Duration,
    last_read: Option<Instant>,
}

impl UptimeThrottle {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_read: None,
        }
    }

    fn is_due(&self, now: Instant) -> bool {
        self.last_read
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }
}

/// Mutable state shared by refresh passes and commands. Holding the
/// lock serializes them.
struct RefreshState {
    engine: ClassificationEngine,
    rules: RuleConfig,
    model_hint: Option<String>,
    uptime: UptimeThrottle,
}

// ── Coordinator ──────────────────────────────────────────────────────

/// Handle to one managed device. Cheap to clone.
pub struct Coordinator<T: SnmpTransport + 'static> {
    inner: Arc<CoordinatorInner<T>>,
}

impl<T: SnmpTransport + 'static> Clone for Coordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<T> {
    config: DeviceConfig,
    transport: T,
    store: SnapshotStore,
    state: Mutex<RefreshState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator<SnmpSession> {
    /// Open an SNMP session for `config`. Does not talk to the device;
    /// call [`initialize()`](Self::initialize) next.
    pub async fn connect(config: DeviceConfig) -> Result<Self, CoreError> {
        let session = SnmpSession::connect(&config).await?;
        Ok(Self::new(config, session))
    }
}

impl<T: SnmpTransport + 'static> Coordinator<T> {
    pub fn new(config: DeviceConfig, transport: T) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let state = RefreshState {
            engine: ClassificationEngine::new(&config.rules),
            rules: config.rules.clone(),
            model_hint: None,
            uptime: UptimeThrottle::new(config.uptime_interval()),
        };
        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                transport,
                store: SnapshotStore::new(),
                state: Mutex::new(state),
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.inner.config
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Configured name, else the reported hostname, else the host.
    pub fn display_name(&self) -> String {
        self.inner
            .config
            .name
            .clone()
            .or_else(|| self.snapshot().identity.hostname.clone())
            .unwrap_or_else(|| self.inner.config.endpoint.host.clone())
    }

    // ── Snapshot access ──────────────────────────────────────────────

    /// Latest committed snapshot. Empty until initial discovery has
    /// completed; check [`DeviceSnapshot::is_initialized`].
    pub fn snapshot(&self) -> Arc<DeviceSnapshot> {
        self.inner.store.load()
    }

    /// Fires with the new revision after every commit.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.store.subscribe()
    }

    pub async fn rules(&self) -> RuleConfig {
        self.inner.state.lock().await.rules.clone()
    }

    /// Rules skipped because they failed to compile.
    pub async fn rule_diagnostics(&self) -> Vec<RuleDiagnostic> {
        self.inner.state.lock().await.engine.diagnostics().to_vec()
    }

    // ── Refresh passes ───────────────────────────────────────────────

    /// First full discovery. Fails only when the device cannot be
    /// identified by its system name.
    pub async fn initialize(&self) -> Result<Arc<DeviceSnapshot>, CoreError> {
        self.full_refresh().await?;
        let snapshot = self.snapshot();
        info!(
            device = self.inner.transport.target(),
            hostname = snapshot.identity.hostname.as_deref().unwrap_or("-"),
            interfaces = snapshot.interfaces.len(),
            exposed = snapshot.exposed().count(),
            "device discovered"
        );
        Ok(snapshot)
    }

    /// Rebuild everything: identity, interface set, VLANs, IPv4 and
    /// classification. Returns the committed revision.
    pub async fn full_refresh(&self) -> Result<u64, CoreError> {
        let mut state = self.inner.state.lock().await;
        let transport = &self.inner.transport;
        let custom = &self.inner.config.custom_oids;

        let sys_name = transport
            .get(&Oid::from_slice(mib::SYS_NAME))
            .await?
            .ok_or_else(|| CoreError::DeviceUnidentified {
                target: transport.target().to_owned(),
            })?;
        let sys_name = sys_name.as_text();
        let sys_descr = read_description(transport).await;

        let model_hint = entity_model_hint(transport).await;
        let identity = resolve_identity(
            transport,
            sys_descr.as_deref(),
            sys_name.as_deref(),
            model_hint.as_deref(),
            custom,
        )
        .await;

        let mut interfaces = walk_interfaces(transport).await;
        let ipv4 = walk_ipv4(transport).await;
        ipv4.attach(&mut interfaces);
        let classification = state.engine.apply(&mut interfaces, identity.vendor);

        let uptime = read_uptime(transport, custom).await;
        let uptime_read_at = Instant::now();

        let now = Utc::now();
        let revision = self.inner.store.commit(DeviceSnapshot {
            interfaces,
            classification,
            ipv4,
            identity,
            uptime,
            last_full_refresh: Some(now),
            last_refresh: Some(now),
            revision: 0,
        });
        state.model_hint = model_hint;
        state.uptime.last_read = Some(uptime_read_at);

        debug!(device = transport.target(), revision, "full refresh committed");
        Ok(revision)
    }

    /// Re-read admin/oper state, IPv4 and identity on the existing
    /// interface set. Uptime is re-read only when the throttle allows.
    pub async fn dynamic_refresh(&self) -> Result<u64, CoreError> {
        let mut state = self.inner.state.lock().await;
        let previous = self.inner.store.load();
        if !previous.is_initialized() {
            return Err(CoreError::NotInitialized);
        }
        let transport = &self.inner.transport;
        let custom = &self.inner.config.custom_oids;

        let mut interfaces = previous.interfaces.clone();
        refresh_status(transport, &mut interfaces).await;
        let ipv4 = walk_ipv4(transport).await;
        ipv4.attach(&mut interfaces);

        let identity = match read_description(transport).await {
            Some(descr) => {
                resolve_identity(
                    transport,
                    Some(&descr),
                    previous.identity.hostname.as_deref(),
                    state.model_hint.as_deref(),
                    custom,
                )
                .await
            }
            None => previous.identity.clone(),
        };

        let now = Instant::now();
        let (uptime, uptime_read_at) = if state.uptime.is_due(now) {
            // a failed read still counts against the throttle
            let fresh = read_uptime(transport, custom).await;
            (fresh.or_else(|| previous.uptime.clone()), Some(now))
        } else {
            (previous.uptime.clone(), None)
        };

        let revision = self.inner.store.commit(DeviceSnapshot {
            interfaces,
            classification: previous.classification.clone(),
            ipv4,
            identity,
            uptime,
            last_full_refresh: previous.last_full_refresh,
            last_refresh: Some(Utc::now()),
            revision: 0,
        });
        if let Some(at) = uptime_read_at {
            state.uptime.last_read = Some(at);
        }

        debug!(device = transport.target(), revision, "dynamic refresh committed");
        Ok(revision)
    }

    /// Steady-state poll: full discovery until it has succeeded once,
    /// dynamic refreshes afterwards.
    pub async fn poll(&self) -> Result<u64, CoreError> {
        if self.snapshot().is_initialized() {
            self.dynamic_refresh().await
        } else {
            self.full_refresh().await
        }
    }

    /// Swap the rule set and re-run full discovery under it.
    pub async fn update_rules(&self, rules: RuleConfig) -> Result<u64, CoreError> {
        {
            let mut state = self.inner.state.lock().await;
            state.engine = ClassificationEngine::new(&rules);
            state.rules = rules;
        }
        info!(device = self.inner.transport.target(), "rules changed, rediscovering");
        self.full_refresh().await
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Write ifAlias and update the record on success.
    pub async fn set_alias(&self, if_index: u32, alias: &str) -> Result<InterfaceRecord, CoreError> {
        let oid = Oid::from_slice(mib::IF_ALIAS).child(if_index);
        let alias = alias.trim();
        let value = SnmpValue::text(alias);
        let alias = Some(alias.to_owned()).filter(|a| !a.is_empty());
        self.write_and_update(if_index, &oid, value, move |record| {
            record.alias = alias;
        })
        .await
    }

    /// Write ifAdminStatus and update the record on success.
    pub async fn set_admin_status(
        &self,
        if_index: u32,
        status: AdminStatus,
    ) -> Result<InterfaceRecord, CoreError> {
        if status == AdminStatus::Testing {
            return Err(CoreError::InvalidCommand {
                reason: "admin status can only be set to up or down".into(),
            });
        }
        let oid = Oid::from_slice(mib::IF_ADMIN_STATUS).child(if_index);
        self.write_and_update(if_index, &oid, SnmpValue::Integer(status.code()), move |record| {
            record.admin = Some(status);
        })
        .await
    }

    /// One SET, then an optimistic commit. A failed SET leaves the
    /// snapshot untouched.
    async fn write_and_update<F>(
        &self,
        if_index: u32,
        oid: &Oid,
        value: SnmpValue,
        update: F,
    ) -> Result<InterfaceRecord, CoreError>
    where
        F: FnOnce(&mut InterfaceRecord),
    {
        let _state = self.inner.state.lock().await;
        let current = self.inner.store.load();
        if !current.is_initialized() {
            return Err(CoreError::NotInitialized);
        }
        if !current.interfaces.contains_key(&if_index) {
            return Err(CoreError::InterfaceNotFound { if_index });
        }

        self.inner.transport.set(oid, value).await?;

        let mut next = DeviceSnapshot::clone(&current);
        let record = next
            .interfaces
            .get_mut(&if_index)
            .ok_or(CoreError::InterfaceNotFound { if_index })?;
        update(record);
        let updated = record.clone();
        self.inner.store.commit(next);
        debug!(device = self.inner.transport.target(), if_index, %oid, "write applied");
        Ok(updated)
    }

    // ── Background tasks ─────────────────────────────────────────────

    /// Spawn the command processor and, when the poll interval is
    /// non-zero, the poll loop.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let coordinator = self.clone();
            handles.push(tokio::spawn(command_processor_task(coordinator, rx)));
        }

        let interval = self.inner.config.poll_interval;
        if !interval.is_zero() {
            let coordinator = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(poll_task(coordinator, interval, cancel)));
        }
    }

    /// Stop background tasks and wait for them. Commands issued after
    /// this fail with `CoordinatorStopped`.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    warn!(device = self.inner.transport.target(), error = %e, "background task panicked");
                }
            }
        }
        debug!(device = self.inner.transport.target(), "coordinator stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.inner.cancel.is_cancelled()
    }

    /// Queue `command` behind any work already in progress. Requires
    /// [`start()`](Self::start).
    pub async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        if self.inner.cancel.is_cancelled() || self.inner.command_rx.lock().await.is_some() {
            return Err(CoreError::CoordinatorStopped);
        }
        let (tx, rx) = oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::CoordinatorStopped)?;
        rx.await.map_err(|_| CoreError::CoordinatorStopped)?
    }
}

/// sysDescr, `None` when absent or unreadable.
async fn read_description<T: SnmpTransport>(transport: &T) -> Option<String> {
    match transport.get(&Oid::from_slice(mib::SYS_DESCR)).await {
        Ok(value) => value.and_then(|v| v.non_empty_text()),
        Err(e) => {
            debug!(device = transport.target(), error = %e, "sysDescr unavailable");
            None
        }
    }
}

async fn poll_task<T: SnmpTransport + 'static>(
    coordinator: Coordinator<T>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                // an in-flight pass is dropped uncommitted on shutdown
                let result = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = coordinator.poll() => result,
                };
                if let Err(e) = result {
                    warn!(device = coordinator.transport().target(), error = %e, "poll failed");
                }
            }
        }
    }
}

async fn command_processor_task<T: SnmpTransport + 'static>(
    coordinator: Coordinator<T>,
    mut rx: mpsc::Receiver<CommandEnvelope>,
) {
    let cancel = coordinator.inner.cancel.clone();
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                // dropping the responder reports CoordinatorStopped
                let result = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = route_command(&coordinator, envelope.command) => result,
                };
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

async fn route_command<T: SnmpTransport + 'static>(
    coordinator: &Coordinator<T>,
    command: Command,
) -> Result<CommandResult, CoreError> {
    match command {
        Command::SetAlias { if_index, alias } => coordinator
            .set_alias(if_index, &alias)
            .await
            .map(|record| CommandResult::Interface(Box::new(record))),
        Command::SetAdminStatus { if_index, status } => coordinator
            .set_admin_status(if_index, status)
            .await
            .map(|record| CommandResult::Interface(Box::new(record))),
        Command::Refresh => coordinator
            .poll()
            .await
            .map(|revision| CommandResult::Refreshed { revision }),
        Command::Rediscover => coordinator
            .full_refresh()
            .await
            .map(|revision| CommandResult::Refreshed { revision }),
        Command::UpdateRules(rules) => coordinator
            .update_rules(*rules)
            .await
            .map(|revision| CommandResult::Refreshed { revision }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_is_due_before_first_read_and_after_interval() {
        let mut throttle = UptimeThrottle::new(Duration::from_secs(30));
        let start = Instant::now();
        assert!(throttle.is_due(start));
        throttle.last_read = Some(start);
        assert!(!throttle.is_due(start + Duration::from_secs(29)));
        assert!(throttle.is_due(start + Duration::from_secs(30)));
    }
}
