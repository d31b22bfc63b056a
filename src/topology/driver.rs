//! Host driver device-manager protocol
//!
//! During a forced rebuild the host driver enumerates the real display
//! hardware as a finite sequence of [`DeviceEvent`]s in strict dependency
//! order: a GPU, then its sources, then each source's monitors and mode
//! list. The topology builder consumes the sequence in one pass and
//! persists everything it sees, so the driver is only consulted when the
//! configuration store has nothing usable.

use crate::devmode::DeviceMode;
use crate::error::{Result, StringError, WinDisplayError};
use crate::geometry::Rect;
use crate::topology::source::SourceFlags;
use parking_lot::Mutex;
use uuid::Uuid;

/// PCI identity of a graphics adapter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PciId {
    /// PCI vendor id
    pub vendor: u16,
    /// PCI device id
    pub device: u16,
}

/// One step of the device-manager enumeration
///
/// Events arrive in dependency order: `AddGpu`, then that GPU's
/// `AddSource`s, each followed by its `AddMonitor`s and one `AddModes`.
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A graphics adapter was discovered
    AddGpu {
        /// Adapter name
        name: String,
        /// PCI identity used to derive the stable adapter path
        pci_id: PciId,
        /// Vulkan interop UUID, when the host exposes one
        vulkan_uuid: Option<Uuid>,
    },
    /// A display output slot of the current GPU was discovered
    AddSource {
        /// Host-side connector name, for diagnostics only
        name: String,
        /// Initial state flags
        flags: SourceFlags,
        /// Source DPI
        dpi: u32,
    },
    /// A monitor attached to the current source was discovered
    AddMonitor {
        /// Monitor rectangle in host coordinates
        monitor_rect: Rect,
        /// Work-area rectangle in host coordinates
        work_rect: Rect,
        /// Raw EDID bytes; may be empty
        edid: Vec<u8>,
    },
    /// The current source's mode list
    AddModes {
        /// The mode the source is driving right now
        current: DeviceMode,
        /// Host-supported modes; a single entry triggers virtual mode
        /// synthesis
        modes: Vec<DeviceMode>,
    },
}

/// The host windowing backend, as seen by the topology builder
pub trait HostDriver: Send + Sync {
    /// Enumerate the display hardware as one finite, non-restartable
    /// event sequence
    fn enumerate(&self) -> Result<Vec<DeviceEvent>>;

    /// Apply a resolved mode to a source
    fn apply_mode(&self, _source: &str, _mode: &DeviceMode) -> Result<()> {
        Err(WinDisplayError::NotImplemented("apply_mode"))
    }

    /// True if the host presents a single emulated source covering the
    /// real topology
    fn is_virtual_desktop(&self) -> bool {
        false
    }
}

/// A driver with no backend at all
///
/// Enumeration always fails, which exercises the synthetic-fallback path:
/// the rest of the API surface keeps functioning against a default adapter
/// and monitor.
#[derive(Debug, Default)]
pub struct NoopDriver;

impl HostDriver for NoopDriver {
    fn enumerate(&self) -> Result<Vec<DeviceEvent>> {
        Err(WinDisplayError::DriverUnavailable(StringError::new(
            "no display backend",
        )))
    }
}

/// A driver replaying a fixed event sequence
///
/// Doubles as the reference implementation for hosts whose display state
/// is known up front, and as the workhorse for tests: applied modes are
/// recorded for inspection.
#[derive(Debug, Default)]
pub struct StaticDriver {
    events: Vec<DeviceEvent>,
    virtual_desktop: bool,
    applied: Mutex<Vec<(String, DeviceMode)>>,
    enumerations: Mutex<u32>,
}

impl StaticDriver {
    /// Create a driver replaying the given events
    pub fn new(events: Vec<DeviceEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// Mark the replayed topology as a virtual desktop
    pub fn with_virtual_desktop(mut self) -> Self {
        self.virtual_desktop = true;
        self
    }

    /// Modes applied through this driver, in application order
    pub fn applied_modes(&self) -> Vec<(String, DeviceMode)> {
        self.applied.lock().clone()
    }

    /// How many times the topology builder enumerated this driver
    pub fn enumeration_count(&self) -> u32 {
        *self.enumerations.lock()
    }
}

impl HostDriver for StaticDriver {
    fn enumerate(&self) -> Result<Vec<DeviceEvent>> {
        *self.enumerations.lock() += 1;
        Ok(self.events.clone())
    }

    fn apply_mode(&self, source: &str, mode: &DeviceMode) -> Result<()> {
        self.applied.lock().push((source.to_string(), *mode));
        Ok(())
    }

    fn is_virtual_desktop(&self) -> bool {
        self.virtual_desktop
    }
}
