// ── Controller ──
//
// Owns the store, notification queue, view state, scheduler and backend
// handle for one gateway. Handles refresh (single-flight, atomic),
// background refresh, command routing and sort preferences.

mod operations;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{Backend, HttpBackend};
use crate::command::{Command, CommandResult};
use crate::config::ControllerConfig;
use crate::confirm::ConfirmGate;
use crate::error::CoreError;
use crate::model::{Mapping, Proxy};
use crate::notify::NotificationQueue;
use crate::operation::{Operation, OperationEvent, OperationPhase, RefreshOutcome};
use crate::prefs::{
    MAPPING_SORT_SLOT, PROXY_SORT_SLOT, PreferenceStore, load_table_sort, save_table_sort,
};
use crate::scheduler::Scheduler;
use crate::sort::{MappingSortKey, ProxySortKey, TableSort};
use crate::store::DataStore;

const OPERATION_CHANNEL_SIZE: usize = 64;

struct ViewState {
    proxies: TableSort<ProxySortKey>,
    mappings: TableSort<MappingSortKey>,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Construct with
/// [`new`](Self::new), then either call [`load`](Self::load) for one-off
/// use or [`start`](Self::start) for periodic refresh.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    backend: Arc<dyn Backend>,
    store: Arc<DataStore>,
    notifications: Arc<NotificationQueue>,
    prefs: Arc<dyn PreferenceStore>,
    views: Mutex<ViewState>,
    refreshing: AtomicBool,
    loading: watch::Sender<bool>,
    last_reconciled: watch::Sender<Option<DateTime<Utc>>>,
    operations: broadcast::Sender<OperationEvent>,
    scheduler: Scheduler,
    cancel: CancellationToken,
    task_handles: tokio::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Build a controller. Sort preferences are read once, here.
    pub fn new(
        config: ControllerConfig,
        backend: Arc<dyn Backend>,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Self {
        let views = ViewState {
            proxies: load_table_sort(prefs.as_ref(), PROXY_SORT_SLOT),
            mappings: load_table_sort(prefs.as_ref(), MAPPING_SORT_SLOT),
        };
        let cancel = CancellationToken::new();
        let (loading, _) = watch::channel(false);
        let (last_reconciled, _) = watch::channel(None);
        let (operations, _) = broadcast::channel(OPERATION_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                notifications: Arc::new(NotificationQueue::new(config.notification_ttl)),
                store: Arc::new(DataStore::new()),
                scheduler: Scheduler::new(&cancel),
                views: Mutex::new(views),
                refreshing: AtomicBool::new(false),
                task_handles: tokio::sync::Mutex::new(Vec::new()),
                config,
                backend,
                prefs,
                loading,
                last_reconciled,
                operations,
                cancel,
            }),
        }
    }

    /// Controller talking to a live gateway over HTTP.
    pub fn with_http(
        config: ControllerConfig,
        prefs: Arc<dyn PreferenceStore>,
    ) -> Result<Self, CoreError> {
        let backend = HttpBackend::from_config(&config)?;
        Ok(Self::new(config, Arc::new(backend), prefs))
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn notifications(&self) -> &Arc<NotificationQueue> {
        &self.inner.notifications
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    pub(crate) fn backend(&self) -> &Arc<dyn Backend> {
        &self.inner.backend
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start periodic refresh, then run the initial load.
    ///
    /// The timer keeps running until [`shutdown`](Self::shutdown) even
    /// when the initial load fails; that failure is returned (and
    /// notified) so the caller can report it.
    pub async fn start(&self) -> Result<(), CoreError> {
        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        }
        info!(interval_secs, "controller started");

        self.refresh().await.map(|_| ())
    }

    /// Cancel background refresh and every pending follow-up.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        self.inner.scheduler.drain().await;
        debug!("controller shut down");
    }

    /// One-shot: load, run closure, wait for follow-ups, shut down.
    ///
    /// Periodic refresh is disabled since a CLI invocation only needs
    /// one request-response cycle plus the follow-ups it triggered.
    pub async fn oneshot<F, Fut, T>(
        config: ControllerConfig,
        backend: Arc<dyn Backend>,
        prefs: Arc<dyn PreferenceStore>,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let controller = Controller::new(cfg, backend, prefs);
        controller.refresh().await?;
        let result = f(controller.clone()).await;
        controller.inner.scheduler.drain().await;
        controller.shutdown().await;
        result
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch all three collections and swap them in together.
    ///
    /// A call while another refresh is in flight returns
    /// [`RefreshOutcome::Skipped`] without touching anything. Any fetch
    /// failure leaves the store as it was.
    pub async fn load(&self) -> Result<RefreshOutcome, CoreError> {
        let Some(_guard) = RefreshGuard::acquire(&self.inner) else {
            debug!("refresh already in flight, skipping");
            return Ok(RefreshOutcome::Skipped);
        };

        let backend = &self.inner.backend;
        let (proxies, clients, mappings) = tokio::join!(
            backend.list_proxies(),
            backend.list_clients(),
            backend.list_active_mappings(),
        );
        let (proxies, clients, mappings) = (proxies?, clients?, mappings?);

        self.inner
            .store
            .apply_full_refresh(proxies, clients, mappings);

        let stats = self.inner.store.stats();
        debug!(
            proxies = stats.proxies,
            clients = stats.clients,
            mappings = self.inner.store.mappings().len(),
            "data refresh complete"
        );
        Ok(RefreshOutcome::Refreshed)
    }

    /// Operator-requested refresh: failures are also notified.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        self.load().await.inspect_err(|e| {
            warn!(error = %e, "refresh failed");
            self.inner
                .notifications
                .danger(format!("Failed to load data: {e}"));
        })
    }

    /// Refresh after a successful mutation. The mutation already
    /// reported success, so a failure here is only logged.
    pub(crate) async fn reload_after(&self, operation: Operation) {
        if let Err(e) = self.load().await {
            warn!(%operation, error = %e, "refresh after operation failed");
        }
    }

    /// Whether a refresh is in flight right now.
    pub fn loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    // ── Operation tracking ───────────────────────────────────────

    pub fn subscribe_operations(&self) -> broadcast::Receiver<OperationEvent> {
        self.inner.operations.subscribe()
    }

    pub(crate) fn emit(&self, operation: Operation, phase: OperationPhase) {
        debug!(%operation, %phase, "operation");
        let _ = self
            .inner
            .operations
            .send(OperationEvent { operation, phase });
    }

    /// Time of the last successful reconcile during this session.
    pub fn last_reconciled(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_reconciled.borrow()
    }

    pub(crate) fn mark_reconciled(&self) {
        self.inner.last_reconciled.send_replace(Some(Utc::now()));
    }

    // ── Views ────────────────────────────────────────────────────

    fn views(&self) -> std::sync::MutexGuard<'_, ViewState> {
        self.inner
            .views
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn proxy_sort(&self) -> TableSort<ProxySortKey> {
        self.views().proxies
    }

    pub fn mapping_sort(&self) -> TableSort<MappingSortKey> {
        self.views().mappings
    }

    /// Toggle or switch the proxy table ordering and persist it.
    pub fn select_proxy_sort(&self, key: ProxySortKey) -> TableSort<ProxySortKey> {
        let sort = {
            let mut views = self.views();
            views.proxies.select(key);
            views.proxies
        };
        save_table_sort(self.inner.prefs.as_ref(), PROXY_SORT_SLOT, &sort);
        sort
    }

    /// Toggle or switch the mapping table ordering and persist it.
    pub fn select_mapping_sort(&self, key: MappingSortKey) -> TableSort<MappingSortKey> {
        let sort = {
            let mut views = self.views();
            views.mappings.select(key);
            views.mappings
        };
        save_table_sort(self.inner.prefs.as_ref(), MAPPING_SORT_SLOT, &sort);
        sort
    }

    pub fn sorted_proxies(&self) -> Vec<Arc<Proxy>> {
        self.proxy_sort().apply(&self.inner.store.proxies())
    }

    /// Unmapped proxies, in the proxy table's ordering.
    pub fn sorted_available_proxies(&self) -> Vec<Arc<Proxy>> {
        self.proxy_sort()
            .apply(&self.inner.store.available_proxies())
    }

    pub fn sorted_mappings(&self) -> Vec<Arc<Mapping>> {
        self.mapping_sort().apply(&self.inner.store.mappings())
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command. Destructive commands consult `gate` first.
    pub async fn execute(
        &self,
        cmd: Command,
        gate: &dyn ConfirmGate,
    ) -> Result<CommandResult, CoreError> {
        debug!(command = cmd.action_name(), "executing command");
        route_command(self, cmd, gate).await
    }
}

// ── Single-flight guard ──────────────────────────────────────────

/// Holds the refresh slot; releasing it clears the loading flag even
/// when the refresh bails out early.
struct RefreshGuard<'a> {
    inner: &'a ControllerInner,
}

impl<'a> RefreshGuard<'a> {
    fn acquire(inner: &'a ControllerInner) -> Option<Self> {
        inner
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        inner.loading.send_replace(true);
        Some(Self { inner })
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.inner.loading.send_replace(false);
        self.inner.refreshing.store(false, Ordering::Release);
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh; failures are logged, never notified.
async fn refresh_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.load().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(
    controller: &Controller,
    cmd: Command,
    gate: &dyn ConfirmGate,
) -> Result<CommandResult, CoreError> {
    match cmd {
        Command::Refresh => controller.refresh().await.map(CommandResult::Refreshed),

        // ── Proxies ──────────────────────────────────────────────
        Command::CreateProxy(req) => controller
            .create_proxy(req)
            .await
            .map(|p| CommandResult::Proxy(Box::new(p))),
        Command::ImportProxies { text } => Ok(CommandResult::Imported(
            controller.import_proxies(&text).await,
        )),
        Command::DeleteProxy { id } => controller
            .delete_proxy(&id, gate)
            .await
            .map(CommandResult::from),
        Command::CheckProxy { id } => controller
            .check_proxy(&id)
            .await
            .map(|p| CommandResult::Checked(p.map(Box::new))),
        Command::HealthCheckAll => Ok(CommandResult::HealthChecked(
            controller.health_check_all().await,
        )),

        // ── Mappings ─────────────────────────────────────────────
        Command::CreateMapping(input) => controller
            .create_mapping(input)
            .await
            .map(|m| CommandResult::Mapping(Box::new(m))),
        Command::DeleteMapping { id } => controller
            .delete_mapping(&id, gate)
            .await
            .map(CommandResult::from),
        Command::Reconcile => controller.reconcile().await.map(|()| CommandResult::Ok),

        // ── Views ────────────────────────────────────────────────
        Command::SortProxies(key) => {
            controller.select_proxy_sort(key);
            Ok(CommandResult::Ok)
        }
        Command::SortMappings(key) => {
            controller.select_mapping_sort(key);
            Ok(CommandResult::Ok)
        }
    }
}
