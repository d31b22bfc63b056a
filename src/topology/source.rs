//! Display source (video output slot) objects

use crate::devmode::{DEVMODE_TAIL_LEN, DeviceMode};
use crate::error::{Result, WinDisplayError};
use crate::geometry::Point;
use crate::modes::{SourceMode, mode_compare};
use crate::registry::{RegistryStore, Value};
use crate::topology::gpu::Gpu;
use bitflags::bitflags;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

pub(crate) const SOURCES_KEY: &str = "Video\\Sources";

bitflags! {
    /// Source state flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SourceFlags: u32 {
        /// Part of the desktop
        const ATTACHED = 1 << 0;
        /// The primary source; exactly one attached source carries this
        const PRIMARY = 1 << 1;
        /// VGA-compatible output
        const VGA_COMPATIBLE = 1 << 2;
    }
}

/// One display output slot of a GPU
///
/// Corresponds to a `\\.\DISPLAYn` device. Current, physical and registry
/// modes live in the configuration store and are cached lazily; the cache
/// cells are cleared whenever the topology is rebuilt, so stale modes are
/// never served across a rebuild.
#[derive(Debug)]
pub struct Source {
    /// Positional id; 0 is the primary source
    pub id: u32,
    /// Short device name ("DISPLAY1")
    pub name: String,
    /// Owning adapter
    pub gpu: Arc<Gpu>,
    /// State flags
    pub flags: SourceFlags,
    /// Per-source DPI
    pub dpi: u32,
    /// Emulated color depth, when depth emulation is active
    pub depth_override: Option<u32>,
    /// Number of monitors attached to this source
    pub monitor_count: u32,
    store: Arc<RegistryStore>,
    key: String,
    modes: Mutex<Option<Arc<[SourceMode]>>>,
    current: Mutex<Option<DeviceMode>>,
    physical: Mutex<Option<DeviceMode>>,
}

/// Fallback when a source has nothing persisted at all
fn default_mode() -> DeviceMode {
    let mut mode = DeviceMode::active(1024, 768, 32, 60);
    mode.position = Some(Point::default());
    mode
}

impl Source {
    pub(crate) fn new(
        id: u32,
        gpu: Arc<Gpu>,
        flags: SourceFlags,
        dpi: u32,
        depth_override: Option<u32>,
        monitor_count: u32,
        store: Arc<RegistryStore>,
    ) -> Self {
        let name = format!("DISPLAY{}", id + 1);
        let key = format!("{SOURCES_KEY}\\{name}");
        Self {
            id,
            name,
            gpu,
            flags,
            dpi,
            depth_override,
            monitor_count,
            store,
            key,
            modes: Mutex::new(None),
            current: Mutex::new(None),
            physical: Mutex::new(None),
        }
    }

    /// Full device name as exposed to API callers
    pub fn device_name(&self) -> String {
        format!("\\\\.\\{}", self.name)
    }

    /// True if this source is attached to the desktop
    pub fn is_attached(&self) -> bool {
        self.flags.contains(SourceFlags::ATTACHED)
    }

    /// True if this is the primary source
    pub fn is_primary(&self) -> bool {
        self.flags.contains(SourceFlags::PRIMARY)
    }

    fn read_mode_value(&self, name: &str) -> Option<DeviceMode> {
        let blob = self.store.get_binary(&self.key, name)?;
        match DeviceMode::from_tail(&blob) {
            Ok(mode) => Some(mode),
            Err(e) => {
                warn!("{}: corrupt {name} mode value: {e}", self.name);
                None
            }
        }
    }

    fn write_mode_value(&self, name: &str, mode: &DeviceMode) -> Result<()> {
        self.store
            .set(&self.key, name, Value::Binary(mode.to_tail().to_vec()))
    }

    /// The mode the source is currently driving
    pub fn current_mode(&self) -> DeviceMode {
        let mut cached = self.current.lock();
        if let Some(mode) = *cached {
            return mode;
        }
        let mode = self
            .read_mode_value("Current")
            .or_else(|| self.read_mode_value("Registry"))
            .or_else(|| self.modes().first().map(|m| m.mode))
            .unwrap_or_else(default_mode);
        *cached = Some(mode);
        mode
    }

    /// The true host mode, when virtual modes are in use; otherwise the
    /// current mode
    pub fn physical_mode(&self) -> DeviceMode {
        let mut cached = self.physical.lock();
        if let Some(mode) = *cached {
            return mode;
        }
        let mode = self
            .read_mode_value("Physical")
            .unwrap_or_else(|| self.current_mode());
        *cached = Some(mode);
        mode
    }

    /// The persisted mode to restore on reattach
    pub fn registry_mode(&self) -> DeviceMode {
        self.read_mode_value("Registry")
            .unwrap_or_else(|| self.current_mode())
    }

    /// The sorted supported-mode list
    ///
    /// When depth emulation is active, entries at other color depths stay
    /// enumerable raw but are excluded from negotiation.
    pub fn modes(&self) -> Arc<[SourceMode]> {
        let mut cached = self.modes.lock();
        if let Some(modes) = cached.as_ref() {
            return Arc::clone(modes);
        }
        let mut list: Vec<SourceMode> = Vec::new();
        if let Some(blob) = self.store.get_binary(&self.key, "Modes") {
            for chunk in blob.chunks_exact(DEVMODE_TAIL_LEN) {
                match DeviceMode::from_tail(chunk) {
                    Ok(mode) => {
                        let unsupported = self
                            .depth_override
                            .is_some_and(|depth| mode.bits_per_pixel != Some(depth));
                        list.push(SourceMode { mode, unsupported });
                    }
                    Err(e) => warn!("{}: corrupt mode list entry: {e}", self.name),
                }
            }
        }
        list.sort_by(|a, b| mode_compare(&a.mode, &b.mode));
        let modes: Arc<[SourceMode]> = list.into();
        *cached = Some(Arc::clone(&modes));
        modes
    }

    /// Persist and cache a new current mode
    pub fn set_current_mode(&self, mode: &DeviceMode) -> Result<()> {
        self.write_mode_value("Current", mode)?;
        *self.current.lock() = Some(*mode);
        Ok(())
    }

    /// Persist the restore-on-reattach mode
    pub fn set_registry_mode(&self, mode: &DeviceMode) -> Result<()> {
        self.write_mode_value("Registry", mode)
    }

    /// Drop every cached field so the next read goes to the store
    pub fn invalidate(&self) {
        *self.modes.lock() = None;
        *self.current.lock() = None;
        *self.physical.lock() = None;
    }

    pub(crate) fn save(&self, store: &RegistryStore) -> Result<()> {
        store.set(&self.key, "Id", Value::Dword(self.id))?;
        store.set(&self.key, "GpuPath", Value::Sz(self.gpu.path.clone()))?;
        store.set(&self.key, "Flags", Value::Dword(self.flags.bits()))?;
        store.set(&self.key, "Dpi", Value::Dword(self.dpi))?;
        if let Some(depth) = self.depth_override {
            store.set(&self.key, "DepthOverride", Value::Dword(depth))?;
        }
        store.set(&self.key, "MonitorCount", Value::Dword(self.monitor_count))?;
        Ok(())
    }

    pub(crate) fn save_mode_list(
        &self,
        store: &RegistryStore,
        modes: &[DeviceMode],
        current: &DeviceMode,
        physical: Option<&DeviceMode>,
    ) -> Result<()> {
        let mut blob = Vec::with_capacity(modes.len() * DEVMODE_TAIL_LEN);
        for mode in modes {
            blob.extend_from_slice(&mode.to_tail());
        }
        store.set(&self.key, "Modes", Value::Binary(blob))?;
        store.set(
            &self.key,
            "ModeCount",
            Value::Dword(u32::try_from(modes.len()).unwrap_or(u32::MAX)),
        )?;
        store.set(&self.key, "Current", Value::Binary(current.to_tail().to_vec()))?;
        store.set(&self.key, "Registry", Value::Binary(current.to_tail().to_vec()))?;
        if let Some(physical) = physical {
            store.set(&self.key, "Physical", Value::Binary(physical.to_tail().to_vec()))?;
        }
        Ok(())
    }

    pub(crate) fn load(store: &Arc<RegistryStore>, name: &str, gpus: &[Arc<Gpu>]) -> Result<Self> {
        let key = format!("{SOURCES_KEY}\\{name}");
        let missing =
            |value: &str| WinDisplayError::StoreUnavailable(format!("{key} missing {value}"));
        let id = store.get_dword(&key, "Id").ok_or_else(|| missing("Id"))?;
        let gpu_path = store.get_sz(&key, "GpuPath").ok_or_else(|| missing("GpuPath"))?;
        let gpu = gpus
            .iter()
            .find(|g| g.path == gpu_path)
            .cloned()
            .ok_or_else(|| {
                WinDisplayError::StoreUnavailable(format!("{key}: unknown gpu {gpu_path}"))
            })?;
        let flags = SourceFlags::from_bits_truncate(
            store.get_dword(&key, "Flags").ok_or_else(|| missing("Flags"))?,
        );
        let dpi = store.get_dword(&key, "Dpi").ok_or_else(|| missing("Dpi"))?;
        let depth_override = store.get_dword(&key, "DepthOverride");
        let monitor_count = store.get_dword(&key, "MonitorCount").unwrap_or(0);
        Ok(Self::new(
            id,
            gpu,
            flags,
            dpi,
            depth_override,
            monitor_count,
            Arc::clone(store),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_gpu() -> Arc<Gpu> {
        Arc::new(Gpu {
            path: "PCI\\VEN_10DE&DEV_2684\\0".to_string(),
            name: "Test Adapter".to_string(),
            guid: Uuid::new_v4(),
            luid: 0x1_0001,
            index: 0,
            vulkan_uuid: None,
            source_count: 1,
        })
    }

    fn test_source(store: &Arc<RegistryStore>) -> Source {
        Source::new(
            0,
            test_gpu(),
            SourceFlags::ATTACHED | SourceFlags::PRIMARY,
            96,
            None,
            1,
            Arc::clone(store),
        )
    }

    #[test]
    fn test_device_name() {
        let store = Arc::new(RegistryStore::new());
        let source = test_source(&store);
        assert_eq!(source.name, "DISPLAY1");
        assert_eq!(source.device_name(), "\\\\.\\DISPLAY1");
    }

    #[test]
    fn test_current_mode_falls_back_to_default() {
        let store = Arc::new(RegistryStore::new());
        let source = test_source(&store);
        let mode = source.current_mode();
        assert_eq!(mode.width, Some(1024));
        assert_eq!(mode.height, Some(768));
    }

    #[test]
    fn test_mode_list_round_trip_stays_sorted() {
        let store = Arc::new(RegistryStore::new());
        let source = test_source(&store);
        let modes = vec![
            DeviceMode::active(800, 600, 32, 60),
            DeviceMode::active(1920, 1080, 16, 60),
            DeviceMode::active(1920, 1080, 32, 60),
        ];
        let mut current = DeviceMode::active(1920, 1080, 32, 60);
        current.position = Some(Point::default());
        source.save_mode_list(&store, &modes, &current, None).unwrap();

        let loaded = source.modes();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].mode.width, Some(800));
        assert_eq!(loaded[1].mode.bits_per_pixel, Some(32));
        assert_eq!(loaded[2].mode.bits_per_pixel, Some(16));
        assert_eq!(source.current_mode(), current);
        // No Physical value persisted: the physical mode is the current one
        assert_eq!(source.physical_mode(), current);
    }

    #[test]
    fn test_depth_override_flags_other_depths_unsupported() {
        let store = Arc::new(RegistryStore::new());
        let mut source = test_source(&store);
        source.depth_override = Some(32);
        let modes = vec![
            DeviceMode::active(1920, 1080, 16, 60),
            DeviceMode::active(1920, 1080, 32, 60),
        ];
        let current = DeviceMode::active(1920, 1080, 32, 60);
        source.save_mode_list(&store, &modes, &current, None).unwrap();

        let loaded = source.modes();
        assert!(!loaded.iter().find(|m| m.mode.bits_per_pixel == Some(32)).unwrap().unsupported);
        assert!(loaded.iter().find(|m| m.mode.bits_per_pixel == Some(16)).unwrap().unsupported);
    }

    #[test]
    fn test_invalidate_clears_caches() {
        let store = Arc::new(RegistryStore::new());
        let source = test_source(&store);
        let current = DeviceMode::active(1920, 1080, 32, 60);
        source.save_mode_list(&store, &[current], &current, None).unwrap();
        assert_eq!(source.current_mode().width, Some(1920));

        // Overwrite behind the cache's back, then invalidate
        let newer = DeviceMode::active(800, 600, 32, 60);
        store
            .set(
                "Video\\Sources\\DISPLAY1",
                "Current",
                Value::Binary(newer.to_tail().to_vec()),
            )
            .unwrap();
        assert_eq!(source.current_mode().width, Some(1920));
        source.invalidate();
        assert_eq!(source.current_mode().width, Some(800));
    }

    #[test]
    fn test_save_load_round_trip() {
        let store = Arc::new(RegistryStore::new());
        let source = test_source(&store);
        source.save(&store).unwrap();

        let gpus = vec![test_gpu()];
        let loaded = Source::load(&store, "DISPLAY1", &gpus).unwrap();
        assert_eq!(loaded.id, 0);
        assert_eq!(loaded.flags, SourceFlags::ATTACHED | SourceFlags::PRIMARY);
        assert_eq!(loaded.dpi, 96);
        assert_eq!(loaded.gpu.path, gpus[0].path);
    }

    #[test]
    fn test_load_unknown_gpu_is_store_error() {
        let store = Arc::new(RegistryStore::new());
        let source = test_source(&store);
        source.save(&store).unwrap();
        assert!(matches!(
            Source::load(&store, "DISPLAY1", &[]),
            Err(WinDisplayError::StoreUnavailable(_))
        ));
    }
}
