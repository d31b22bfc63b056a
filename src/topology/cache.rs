//! The process-wide display topology cache
//!
//! Every other component sees the GPU/source/monitor lists through this
//! cache. It hides the cost and hazards of re-querying the host driver:
//! the common path reconstructs the lists purely from the configuration
//! store, and only a forced rebuild (or an unusable store) consults the
//! driver, persisting everything discovered so both paths produce
//! identical results.
//!
//! Staleness is detected by comparing a serial persisted alongside the
//! store against the serial recorded at the last rebuild; any process may
//! force a rebuild, after which the serial advances and every other
//! process rebuilds from the store on next access.

use crate::devmode::DeviceMode;
use crate::error::{Result, WinDisplayError};
use crate::geometry::{Point, Rect};
use crate::modes::{mode_compare, synthesize_virtual_modes};
use crate::registry::{RegistryStore, Value};
use crate::topology::driver::{DeviceEvent, HostDriver, PciId};
use crate::topology::gpu::{GPUS_KEY, Gpu};
use crate::topology::monitor::{MONITORS_KEY, Monitor, MonitorHandle, parse_edid};
use crate::topology::source::{SOURCES_KEY, Source, SourceFlags};
use parking_lot::{Mutex, MutexGuard};
use std::ops::Deref;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const VIDEO_KEY: &str = "Video";
const SERIAL_VALUE: &str = "TopologySerial";

/// The cached object lists plus the serial they were built at
#[derive(Debug, Default)]
pub struct Topology {
    /// Adapters, in enumeration order
    pub gpus: Vec<Arc<Gpu>>,
    /// Sources, ordered by id (the primary is id 0)
    pub sources: Vec<Arc<Source>>,
    /// Monitors, grouped by source in source order
    pub monitors: Vec<Arc<Monitor>>,
    serial: u64,
}

impl Topology {
    /// Serial this topology was built at
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// The primary source
    pub fn primary_source(&self) -> Option<&Arc<Source>> {
        self.sources.iter().find(|s| s.is_primary())
    }

    /// Look up a source by short or full device name
    pub fn source_by_name(&self, name: &str) -> Option<&Arc<Source>> {
        let short = name.strip_prefix("\\\\.\\").unwrap_or(name);
        self.sources
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(short))
    }

    /// Look up a monitor by its handle
    pub fn monitor_by_handle(&self, handle: MonitorHandle) -> Option<&Arc<Monitor>> {
        self.monitors.iter().find(|m| m.handle == handle)
    }

    /// Monitors currently part of the desktop
    pub fn active_monitors(&self) -> impl Iterator<Item = &Arc<Monitor>> {
        self.monitors.iter().filter(|m| m.is_active())
    }

    /// The primary monitor
    pub fn primary_monitor(&self) -> Option<&Arc<Monitor>> {
        self.active_monitors().find(|m| m.is_primary())
    }

    /// Bounding rectangle of every active monitor
    pub fn virtual_screen_rect(&self) -> Rect {
        self.active_monitors()
            .fold(Rect::default(), |acc, m| acc.union(&m.rc_monitor))
    }
}

/// Read guard over the topology; holds the display lock
pub struct TopologyGuard<'a> {
    guard: MutexGuard<'a, Topology>,
}

impl Deref for TopologyGuard<'_> {
    type Target = Topology;

    fn deref(&self) -> &Topology {
        &self.guard
    }
}

/// The process-wide topology cache
///
/// All access is serialized through one non-reentrant mutex; readers walk
/// the lists while holding it. A second "device init" mutex guards the
/// store against interleaved rebuild writes.
pub struct TopologyCache {
    display_lock: Mutex<Topology>,
    init_lock: Mutex<()>,
    store: Arc<RegistryStore>,
    driver: Arc<dyn HostDriver>,
    service_session: bool,
}

/// Intermediate per-source state collected from the event stream
struct PendingSource {
    host_name: String,
    flags: SourceFlags,
    dpi: u32,
    monitors: Vec<(Rect, Rect, Vec<u8>)>,
    current: Option<DeviceMode>,
    modes: Vec<DeviceMode>,
}

/// Intermediate per-GPU state collected from the event stream
struct PendingGpu {
    name: String,
    pci_id: PciId,
    vulkan_uuid: Option<Uuid>,
    sources: Vec<PendingSource>,
}

impl TopologyCache {
    /// Create a cache over the given store and driver
    ///
    /// `service_session` marks a context with no real display: the cache is
    /// then pinned to a single synthetic monitor so API callers still get
    /// a plausible default work area.
    pub fn new(store: Arc<RegistryStore>, driver: Arc<dyn HostDriver>, service_session: bool) -> Self {
        Self {
            display_lock: Mutex::new(Topology::default()),
            init_lock: Mutex::new(()),
            store,
            driver,
            service_session,
        }
    }

    /// The configuration store backing this cache
    pub fn store(&self) -> &Arc<RegistryStore> {
        &self.store
    }

    /// The host driver backing this cache
    pub fn driver(&self) -> &Arc<dyn HostDriver> {
        &self.driver
    }

    /// Acquire the display lock with a fresh topology
    ///
    /// With `force` the cache is always torn down and rebuilt through the
    /// driver; otherwise the store serial decides whether anything needs
    /// doing at all.
    pub fn read(&self, force: bool) -> Result<TopologyGuard<'_>> {
        let mut guard = self.display_lock.lock();
        self.ensure_fresh(&mut guard, force)?;
        Ok(TopologyGuard { guard })
    }

    fn store_serial(&self) -> u64 {
        self.store.get_qword(VIDEO_KEY, SERIAL_VALUE).unwrap_or(0)
    }

    /// Advance the topology serial after out-of-band store writes
    ///
    /// Every process, this one included, rebuilds from the store on its
    /// next access.
    pub(crate) fn bump_serial(&self) -> Result<u64> {
        let serial = self.store_serial() + 1;
        self.store.set(VIDEO_KEY, SERIAL_VALUE, Value::Qword(serial))?;
        Ok(serial)
    }

    fn ensure_fresh(&self, topo: &mut Topology, force: bool) -> Result<()> {
        if self.service_session {
            if topo.monitors.is_empty() {
                *topo = Self::service_topology();
                info!("service session: using synthetic 1024x768 monitor");
            }
            return Ok(());
        }

        let store_serial = self.store_serial();
        if !force {
            if topo.serial != 0 && topo.serial >= store_serial {
                return Ok(());
            }
            if store_serial != 0 {
                match self.load_from_store(store_serial) {
                    Ok(fresh) => {
                        debug!("topology reloaded from store at serial {store_serial}");
                        *topo = fresh;
                        return Ok(());
                    }
                    Err(e) => warn!("store topology unusable, forcing rebuild: {e}"),
                }
            }
        }
        self.rebuild(topo)
    }

    /// Tear the cache down and rebuild it through the driver
    ///
    /// Everything discovered is persisted first and the in-memory lists are
    /// then re-read from the store, so a fresh persist and a later plain
    /// read cannot diverge.
    fn rebuild(&self, topo: &mut Topology) -> Result<()> {
        *topo = Topology::default();

        let init_guard = self.init_lock.lock();
        for key in [GPUS_KEY, SOURCES_KEY, MONITORS_KEY] {
            self.store.delete_tree(key)?;
        }

        let events = match self.driver.enumerate() {
            Ok(events) => events,
            Err(e) => {
                warn!("device enumeration failed, falling back to default adapter: {e}");
                Self::fallback_events()
            }
        };
        self.persist_events(events)?;

        let serial = self.store_serial() + 1;
        self.store.set(VIDEO_KEY, SERIAL_VALUE, Value::Qword(serial))?;
        let fresh = self.load_from_store(serial)?;
        drop(init_guard);

        info!(
            "topology rebuilt: {} gpus, {} sources, {} monitors (serial {serial})",
            fresh.gpus.len(),
            fresh.sources.len(),
            fresh.monitors.len()
        );
        *topo = fresh;
        Ok(())
    }

    /// The synthetic default hardware used when the driver has nothing:
    /// one adapter, one primary VGA source, a small set of standard modes
    fn fallback_events() -> Vec<DeviceEvent> {
        let mut current = DeviceMode::active(1024, 768, 32, 60);
        current.position = Some(Point::default());
        let modes = [
            (640, 480),
            (800, 600),
            (1024, 768),
        ]
        .iter()
        .flat_map(|&(w, h)| {
            [16u32, 32]
                .iter()
                .map(move |&bpp| DeviceMode::active(w, h, bpp, 60))
        })
        .collect();
        vec![
            DeviceEvent::AddGpu {
                name: "Default Display Adapter".to_string(),
                pci_id: PciId::default(),
                vulkan_uuid: None,
            },
            DeviceEvent::AddSource {
                name: "default".to_string(),
                flags: SourceFlags::ATTACHED | SourceFlags::PRIMARY | SourceFlags::VGA_COMPATIBLE,
                dpi: crate::dpi::USER_DEFAULT_SCREEN_DPI,
            },
            DeviceEvent::AddMonitor {
                monitor_rect: Rect::new(0, 0, 1024, 768),
                work_rect: Rect::new(0, 0, 1024, 768),
                edid: Vec::new(),
            },
            DeviceEvent::AddModes {
                current,
                modes,
            },
        ]
    }

    /// The pinned topology of a displayless service session: one synthetic
    /// monitor with no backing source
    fn service_topology() -> Topology {
        let rect = Rect::new(0, 0, 1024, 768);
        Topology {
            gpus: Vec::new(),
            sources: Vec::new(),
            monitors: vec![Arc::new(Monitor {
                id: 0,
                output_id: 0,
                source: None,
                rc_monitor: rect,
                rc_work: rect,
                is_clone: false,
                edid: crate::topology::monitor::EdidInfo::default(),
                handle: MonitorHandle::SYNTHETIC,
            })],
            serial: u64::MAX,
        }
    }

    /// Consume one driver event sequence, persisting every object
    fn persist_events(&self, events: Vec<DeviceEvent>) -> Result<()> {
        let protocol_error = |what: &str| {
            WinDisplayError::DriverUnavailable(crate::error::StringError::new(format!(
                "device event out of order: {what}"
            )))
        };

        let mut gpus: Vec<PendingGpu> = Vec::new();
        for event in events {
            match event {
                DeviceEvent::AddGpu {
                    name,
                    pci_id,
                    vulkan_uuid,
                } => gpus.push(PendingGpu {
                    name,
                    pci_id,
                    vulkan_uuid,
                    sources: Vec::new(),
                }),
                DeviceEvent::AddSource { name, flags, dpi } => {
                    let gpu = gpus.last_mut().ok_or_else(|| protocol_error("source before gpu"))?;
                    gpu.sources.push(PendingSource {
                        host_name: name,
                        flags,
                        dpi,
                        monitors: Vec::new(),
                        current: None,
                        modes: Vec::new(),
                    });
                }
                DeviceEvent::AddMonitor {
                    monitor_rect,
                    work_rect,
                    edid,
                } => {
                    let source = gpus
                        .last_mut()
                        .and_then(|g| g.sources.last_mut())
                        .ok_or_else(|| protocol_error("monitor before source"))?;
                    source.monitors.push((monitor_rect, work_rect, edid));
                }
                DeviceEvent::AddModes { current, modes } => {
                    let source = gpus
                        .last_mut()
                        .and_then(|g| g.sources.last_mut())
                        .ok_or_else(|| protocol_error("modes before source"))?;
                    source.current = Some(current);
                    source.modes = modes;
                }
            }
        }

        // Primary tie resolution: the first source flagged primary keeps the
        // flag; everything else loses it. With no candidate, the first
        // attached source is promoted.
        let mut primary_seen = false;
        for source in gpus.iter_mut().flat_map(|g| g.sources.iter_mut()) {
            if source.flags.contains(SourceFlags::PRIMARY) {
                if primary_seen {
                    source.flags.remove(SourceFlags::PRIMARY);
                } else {
                    primary_seen = true;
                }
            }
        }
        if !primary_seen {
            if let Some(source) = gpus
                .iter_mut()
                .flat_map(|g| g.sources.iter_mut())
                .find(|s| s.flags.contains(SourceFlags::ATTACHED))
            {
                source.flags.insert(SourceFlags::PRIMARY);
            }
        }

        // Source ids: 0 for the primary, enumeration order for the rest
        let mut next_id = 1u32;
        let mut output_id = 0u32;
        for (gpu_index, pending) in gpus.into_iter().enumerate() {
            let gpu_index = u32::try_from(gpu_index).unwrap_or(u32::MAX);
            let path = format!(
                "PCI\\VEN_{:04X}&DEV_{:04X}\\{gpu_index}",
                pending.pci_id.vendor, pending.pci_id.device
            );
            let (guid, luid) = Gpu::stable_identity(&self.store, &path)?;
            let gpu = Arc::new(Gpu {
                path,
                name: pending.name,
                guid,
                luid,
                index: gpu_index,
                vulkan_uuid: pending.vulkan_uuid,
                source_count: u32::try_from(pending.sources.len()).unwrap_or(u32::MAX),
            });
            gpu.save(&self.store)?;

            for pending_source in pending.sources {
                let id = if pending_source.flags.contains(SourceFlags::PRIMARY) {
                    0
                } else {
                    let id = next_id;
                    next_id += 1;
                    id
                };
                debug!(
                    "source {id} <- host output {:?} ({:?})",
                    pending_source.host_name, pending_source.flags
                );
                let source = Source::new(
                    id,
                    Arc::clone(&gpu),
                    pending_source.flags,
                    pending_source.dpi,
                    None,
                    u32::try_from(pending_source.monitors.len()).unwrap_or(u32::MAX),
                    Arc::clone(&self.store),
                );
                source.save(&self.store)?;

                let current = pending_source.current.unwrap_or_else(|| {
                    pending_source
                        .modes
                        .first()
                        .copied()
                        .unwrap_or_else(|| DeviceMode::active(1024, 768, 32, 60))
                });
                let (mut mode_list, physical) = if pending_source.modes.len() == 1 {
                    // Single-native-mode host: synthesize the standard menu
                    let native = pending_source.modes[0];
                    (synthesize_virtual_modes(&current, &native), Some(native))
                } else {
                    (pending_source.modes, None)
                };
                mode_list.sort_by(mode_compare);
                source.save_mode_list(&self.store, &mode_list, &current, physical.as_ref())?;

                for (monitor_id, (monitor_rect, work_rect, edid)) in
                    pending_source.monitors.into_iter().enumerate()
                {
                    let monitor_id = u32::try_from(monitor_id).unwrap_or(u32::MAX);
                    let monitor = Monitor {
                        id: monitor_id,
                        output_id,
                        source: None, // not linked while persisting
                        rc_monitor: monitor_rect,
                        rc_work: work_rect,
                        is_clone: false,
                        edid: parse_edid(&edid),
                        handle: MonitorHandle::from_ids(id, monitor_id),
                    };
                    monitor.save(&self.store, &source.name, &edid)?;
                    output_id += 1;
                }
            }
        }
        Ok(())
    }

    /// Reconstruct the in-memory lists purely from the store
    ///
    /// GPUs, then sources, then monitors, in that dependency order; each
    /// monitor links to its source through the stored source name. Any
    /// missing required value surfaces as `StoreUnavailable`, which the
    /// caller treats as "stale".
    fn load_from_store(&self, serial: u64) -> Result<Topology> {
        let mut gpus = Vec::new();
        for (index, _) in self.store.subkeys(GPUS_KEY).iter().enumerate() {
            gpus.push(Arc::new(Gpu::load(
                &self.store,
                u32::try_from(index).unwrap_or(u32::MAX),
            )?));
        }
        if gpus.is_empty() {
            return Err(WinDisplayError::StoreUnavailable(
                "no gpus in store".to_string(),
            ));
        }

        let mut sources = Vec::new();
        for name in self.store.subkeys(SOURCES_KEY) {
            sources.push(Arc::new(Source::load(&self.store, &name, &gpus)?));
        }
        sources.sort_by_key(|s| s.id);
        if sources.is_empty() {
            return Err(WinDisplayError::StoreUnavailable(
                "no sources in store".to_string(),
            ));
        }

        let mut monitors: Vec<Arc<Monitor>> = Vec::new();
        for source in &sources {
            let key = format!("{MONITORS_KEY}\\{}", source.name);
            for (id, _) in self.store.subkeys(&key).iter().enumerate() {
                let mut monitor = Monitor::load(
                    &self.store,
                    source,
                    &source.name,
                    u32::try_from(id).unwrap_or(u32::MAX),
                )?;
                // A monitor mirroring an earlier monitor's exact rectangle
                // is a clone
                monitor.is_clone = !monitor.rc_monitor.is_empty()
                    && monitors.iter().any(|m| m.rc_monitor == monitor.rc_monitor);
                monitors.push(Arc::new(monitor));
            }
        }

        Ok(Topology {
            gpus,
            sources,
            monitors,
            serial,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{dual_source_events, single_source_events};
    use crate::topology::driver::{NoopDriver, StaticDriver};

    fn cache_with(events: Vec<DeviceEvent>) -> (TopologyCache, Arc<StaticDriver>) {
        let store = Arc::new(RegistryStore::new());
        let driver = Arc::new(StaticDriver::new(events));
        let cache = TopologyCache::new(store, Arc::clone(&driver) as Arc<dyn HostDriver>, false);
        (cache, driver)
    }

    #[test]
    fn test_bootstrap_builds_graph() {
        let (cache, _) = cache_with(single_source_events());
        let topo = cache.read(false).unwrap();
        assert_eq!(topo.gpus.len(), 1);
        assert_eq!(topo.sources.len(), 1);
        assert_eq!(topo.monitors.len(), 1);

        let source = &topo.sources[0];
        assert_eq!(source.id, 0);
        assert!(source.is_primary());
        assert_eq!(source.gpu.index, 0);
        assert_eq!(topo.monitors[0].rc_monitor, Rect::new(0, 0, 1920, 1080));
        assert_eq!(topo.monitors[0].rc_work, Rect::new(0, 0, 1920, 1040));
    }

    #[test]
    fn test_repeated_reads_do_not_requery_driver() {
        let (cache, driver) = cache_with(single_source_events());
        let first_handles: Vec<_> = {
            let topo = cache.read(false).unwrap();
            topo.monitors.iter().map(|m| m.handle).collect()
        };
        let first_sources: Vec<*const Source> = {
            let topo = cache.read(false).unwrap();
            topo.sources.iter().map(|s| Arc::as_ptr(s)).collect()
        };
        for _ in 0..3 {
            let topo = cache.read(false).unwrap();
            let handles: Vec<_> = topo.monitors.iter().map(|m| m.handle).collect();
            assert_eq!(handles, first_handles);
            let sources: Vec<*const Source> = topo.sources.iter().map(|s| Arc::as_ptr(s)).collect();
            assert_eq!(sources, first_sources);
        }
        assert_eq!(driver.enumeration_count(), 1);
    }

    #[test]
    fn test_force_rebuild_requeries_driver_and_advances_serial() {
        let (cache, driver) = cache_with(single_source_events());
        let serial1 = cache.read(false).unwrap().serial();
        let serial2 = cache.read(true).unwrap().serial();
        assert!(serial2 > serial1);
        assert_eq!(driver.enumeration_count(), 2);
    }

    #[test]
    fn test_luid_and_guid_stable_across_forced_rebuilds() {
        let (cache, _) = cache_with(single_source_events());
        let (guid, luid) = {
            let topo = cache.read(false).unwrap();
            (topo.gpus[0].guid, topo.gpus[0].luid)
        };
        let topo = cache.read(true).unwrap();
        assert_eq!(topo.gpus[0].guid, guid);
        assert_eq!(topo.gpus[0].luid, luid);
    }

    #[test]
    fn test_external_store_write_triggers_reload() {
        let (cache, driver) = cache_with(single_source_events());
        let serial = cache.read(false).unwrap().serial();

        // Another process bumps the serial after changing the store
        cache
            .store()
            .set(VIDEO_KEY, SERIAL_VALUE, Value::Qword(serial + 1))
            .unwrap();
        let topo = cache.read(false).unwrap();
        assert_eq!(topo.serial(), serial + 1);
        // Reload came from the store, not the driver
        assert_eq!(driver.enumeration_count(), 1);
    }

    #[test]
    fn test_driver_failure_falls_back_to_synthetic_default() {
        let store = Arc::new(RegistryStore::new());
        let cache = TopologyCache::new(store, Arc::new(NoopDriver), false);
        let topo = cache.read(false).unwrap();
        assert_eq!(topo.gpus.len(), 1);
        assert_eq!(topo.gpus[0].name, "Default Display Adapter");
        assert_eq!(topo.sources.len(), 1);
        assert!(topo.sources[0].is_primary());
        assert_eq!(topo.monitors[0].rc_monitor, Rect::new(0, 0, 1024, 768));
        // The standard mode set is negotiable
        assert_eq!(topo.sources[0].modes().len(), 6);
    }

    #[test]
    fn test_service_session_pins_synthetic_monitor() {
        let store = Arc::new(RegistryStore::new());
        let driver = Arc::new(StaticDriver::new(single_source_events()));
        let cache = TopologyCache::new(store, Arc::clone(&driver) as Arc<dyn HostDriver>, true);
        let topo = cache.read(false).unwrap();
        assert!(topo.gpus.is_empty());
        assert!(topo.sources.is_empty());
        assert_eq!(topo.monitors.len(), 1);
        assert!(topo.monitors[0].source.is_none());
        assert!(topo.monitors[0].is_active());
        assert!(topo.monitors[0].is_primary());
        assert_eq!(topo.monitors[0].rc_monitor, Rect::new(0, 0, 1024, 768));
        assert_eq!(driver.enumeration_count(), 0);
    }

    #[test]
    fn test_dual_source_ids_and_clone_detection() {
        let (cache, _) = cache_with(dual_source_events());
        let topo = cache.read(false).unwrap();
        assert_eq!(topo.sources.len(), 2);
        assert_eq!(topo.sources[0].id, 0);
        assert!(topo.sources[0].is_primary());
        assert_eq!(topo.sources[1].id, 1);
        assert!(!topo.sources[1].is_primary());
        assert_eq!(topo.monitors.len(), 2);
        assert!(!topo.monitors[0].is_clone);
        assert!(!topo.monitors[1].is_clone);
        assert_eq!(
            topo.virtual_screen_rect(),
            Rect::new(0, 0, 1920 + 1280, 1080)
        );
    }

    #[test]
    fn test_single_native_mode_synthesizes_virtual_modes() {
        let mut current = DeviceMode::active(1920, 1080, 32, 60);
        current.position = Some(Point::default());
        let events = vec![
            DeviceEvent::AddGpu {
                name: "Host GPU".to_string(),
                pci_id: PciId { vendor: 0x10DE, device: 0x2684 },
                vulkan_uuid: None,
            },
            DeviceEvent::AddSource {
                name: "host-0".to_string(),
                flags: SourceFlags::ATTACHED | SourceFlags::PRIMARY,
                dpi: 96,
            },
            DeviceEvent::AddMonitor {
                monitor_rect: Rect::new(0, 0, 1920, 1080),
                work_rect: Rect::new(0, 0, 1920, 1080),
                edid: Vec::new(),
            },
            DeviceEvent::AddModes {
                current,
                modes: vec![current],
            },
        ];
        let (cache, _) = cache_with(events);
        let topo = cache.read(false).unwrap();
        let source = &topo.sources[0];
        let modes = source.modes();
        // Far more than the single host mode
        assert!(modes.len() > 20, "got {}", modes.len());
        assert!(modes.iter().all(|m| {
            m.mode.width.unwrap_or(0) <= 1920 && m.mode.height.unwrap_or(0) <= 1080
        }));
        // The physical mode records the true host mode
        assert_eq!(source.physical_mode().width, Some(1920));
        assert_eq!(source.current_mode(), current);
    }

    #[test]
    fn test_corrupt_store_forces_driver_rebuild() {
        let (cache, driver) = cache_with(single_source_events());
        cache.read(false).unwrap();
        assert_eq!(driver.enumeration_count(), 1);

        // Wreck a required source value and pretend another process bumped
        // the serial
        cache.store().delete_value("Video\\Sources\\DISPLAY1", "GpuPath").unwrap();
        let serial = cache.store().get_qword(VIDEO_KEY, SERIAL_VALUE).unwrap();
        cache
            .store()
            .set(VIDEO_KEY, SERIAL_VALUE, Value::Qword(serial + 1))
            .unwrap();

        let topo = cache.read(false).unwrap();
        assert_eq!(topo.sources.len(), 1);
        assert_eq!(driver.enumeration_count(), 2);
    }

    #[test]
    fn test_arc_refs_survive_rebuild() {
        let (cache, _) = cache_with(single_source_events());
        let held = {
            let topo = cache.read(false).unwrap();
            Arc::clone(&topo.monitors[0])
        };
        cache.read(true).unwrap();
        // The held monitor still reaches its source and gpu
        let source = held.source.as_ref().unwrap();
        assert_eq!(source.gpu.index, 0);
        assert!(!held.rc_monitor.is_empty());
    }
}
