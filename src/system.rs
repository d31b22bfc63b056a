//! Process-wide context
//!
//! [`WinSystem`] owns the configuration store, the display topology cache
//! and the system-parameter table, with an explicit `init`/`shutdown`
//! lifecycle instead of file-scope statics. Every public API surface is a
//! method on this context; all topology access goes through the cache's
//! single mutex-guarded handle.

use crate::dpi::{DpiAwareness, USER_DEFAULT_SCREEN_DPI, thread_dpi_awareness};
use crate::error::Result;
use crate::registry::RegistryStore;
use crate::sysparams::SysParams;
use crate::topology::{HostDriver, TopologyCache};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Startup options for the context
#[derive(Default)]
pub struct SystemOptions {
    /// Path of the store snapshot to load at init and write at shutdown;
    /// `None` keeps the store purely in memory
    pub snapshot_path: Option<PathBuf>,
    /// Displayless session: the topology is pinned to a synthetic monitor
    pub service_session: bool,
    /// Default DPI awareness for threads without an override
    pub dpi_awareness: DpiAwareness,
}

/// Cross-process change notifications
///
/// The compatibility layer has no message broadcast of its own; the host
/// integration registers a hook and fans the event out however it reaches
/// other processes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// The display configuration changed
    DisplayChange {
        /// New color depth of the primary source
        depth: u32,
    },
    /// A system parameter changed
    SettingChange {
        /// Store value name of the changed parameter
        parameter: String,
    },
}

type BroadcastHook = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// The process-wide compatibility-layer context
pub struct WinSystem {
    store: Arc<RegistryStore>,
    topology: TopologyCache,
    params: SysParams,
    process_awareness: Mutex<DpiAwareness>,
    broadcast: Mutex<Option<BroadcastHook>>,
    snapshot_path: Option<PathBuf>,
}

impl WinSystem {
    /// Initialize the context over a host driver
    ///
    /// Loads the store snapshot when one is configured; the topology itself
    /// stays empty until first use.
    pub fn init(driver: Arc<dyn HostDriver>, options: SystemOptions) -> Self {
        let store = Arc::new(match &options.snapshot_path {
            Some(path) => RegistryStore::load(path),
            None => RegistryStore::new(),
        });
        info!("windisplay context initialized");
        Self {
            topology: TopologyCache::new(Arc::clone(&store), driver, options.service_session),
            params: SysParams::new(Arc::clone(&store)),
            process_awareness: Mutex::new(options.dpi_awareness),
            broadcast: Mutex::new(None),
            snapshot_path: options.snapshot_path,
            store,
        }
    }

    /// Flush state and tear the context down
    ///
    /// Persists the store snapshot when one is configured. The in-memory
    /// topology simply drops; handles held by callers stay valid through
    /// their own references.
    pub fn shutdown(&self) -> Result<()> {
        if let Some(path) = &self.snapshot_path {
            self.store.save(path)?;
        }
        info!("windisplay context shut down");
        Ok(())
    }

    /// The configuration store
    pub fn store(&self) -> &Arc<RegistryStore> {
        &self.store
    }

    /// The topology cache
    pub fn topology(&self) -> &TopologyCache {
        &self.topology
    }

    /// The system-parameter table
    pub(crate) fn params(&self) -> &SysParams {
        &self.params
    }

    /// The system DPI, from the persisted desktop key
    pub fn system_dpi(&self) -> u32 {
        self.store
            .get_dword("Control Panel\\Desktop", "LogPixels")
            .unwrap_or(USER_DEFAULT_SCREEN_DPI)
    }

    /// Set the process-default DPI awareness; returns the previous value
    pub fn set_process_dpi_awareness(&self, awareness: DpiAwareness) -> DpiAwareness {
        let mut current = self.process_awareness.lock();
        std::mem::replace(&mut *current, awareness)
    }

    /// The effective DPI awareness of the calling thread
    pub fn effective_dpi_awareness(&self) -> DpiAwareness {
        thread_dpi_awareness(*self.process_awareness.lock())
    }

    /// The DPI callers in the current awareness see for the given monitor DPI
    ///
    /// Unaware callers live at 96 DPI, system-aware callers at the system
    /// DPI, and per-monitor-aware callers at the monitor's own DPI.
    pub(crate) fn caller_dpi(&self, monitor_dpi: u32) -> u32 {
        match self.effective_dpi_awareness() {
            DpiAwareness::Unaware => USER_DEFAULT_SCREEN_DPI,
            DpiAwareness::SystemAware => self.system_dpi(),
            DpiAwareness::PerMonitorAware => monitor_dpi,
        }
    }

    /// Register the cross-process broadcast hook
    pub fn set_broadcast_hook(&self, hook: Option<BroadcastHook>) {
        *self.broadcast.lock() = hook;
    }

    pub(crate) fn notify(&self, event: &ChangeEvent) {
        if let Some(hook) = self.broadcast.lock().as_ref() {
            hook(event);
        }
    }
}
