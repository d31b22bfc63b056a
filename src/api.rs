//! Win32-shaped public API surface
//!
//! Thin dispatchers translating the external calls (`SystemParametersInfo`,
//! `EnumDisplayMonitors`, `ChangeDisplaySettingsEx`, `QueryDisplayConfig`,
//! ...) into operations on the parameter table, the topology cache, the
//! mode negotiation engine and the placement engine. Struct layouts are
//! Rust-shaped; field semantics and unit conversions match the originals.
//!
//! Getters follow the long-standing contract that they always return
//! something: an unusable topology degrades to default rectangles instead
//! of surfacing an error.

use crate::devmode::DeviceMode;
use crate::dpi::{map_dpi_point, map_dpi_rect};
use crate::error::{Result, WinDisplayError};
use crate::geometry::{Point, Rect};
use crate::modes::{NegotiateOptions, resolve_mode};
use crate::placement::place_all;
use crate::sysparams::SystemParameter;
use crate::sysparams::entry::ParamValue;
use crate::system::{ChangeEvent, WinSystem};
use crate::topology::monitor::rect_to_blob;
use crate::topology::{Monitor, MonitorHandle};
use bitflags::bitflags;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fallback work area when no topology is available
const FALLBACK_WORK_AREA: Rect = Rect::new(0, 0, 1024, 768);

bitflags! {
    /// Flags for [`WinSystem::change_display_settings`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ChangeFlags: u32 {
        /// Persist the new mode in the restore-on-reattach slot
        const UPDATE_REGISTRY = 1 << 0;
        /// Validate only, change nothing
        const TEST = 1 << 1;
        /// The caller is a full-screen application
        const FULLSCREEN = 1 << 2;
        /// Persist without applying to the hardware
        const NO_RESET = 1 << 4;
        /// Re-apply the persisted settings even without a new mode
        const RESET = 1 << 30;
    }
}

bitflags! {
    /// Flags for [`WinSystem::spi_set`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UpdateFlags: u32 {
        /// Persist the new value (always honored; the store is the profile)
        const UPDATE_INI_FILE = 1 << 0;
        /// Broadcast a setting-change notification
        const SEND_CHANGE = 1 << 1;
    }
}

bitflags! {
    /// Flags for [`WinSystem::enum_display_settings`]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct EnumSettingsFlags: u32 {
        /// Include modes excluded from negotiation
        const RAW_MODE = 1 << 1;
        /// Report rotated modes verbatim instead of normalizing to the
        /// current orientation
        const ROTATED_MODE = 1 << 2;
    }
}

bitflags! {
    /// State flags of an enumerated display device
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct DisplayDeviceFlags: u32 {
        /// Part of the desktop
        const ATTACHED_TO_DESKTOP = 1 << 0;
        /// The primary device
        const PRIMARY_DEVICE = 1 << 2;
        /// Mirrors another device
        const MIRRORING_DRIVER = 1 << 3;
        /// VGA-compatible output
        const VGA_COMPATIBLE = 1 << 4;
    }
}

bitflags! {
    /// Path selection for [`WinSystem::query_display_config`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QueryFlags: u32 {
        /// Every path, attached or not
        const ALL_PATHS = 1 << 0;
        /// Only paths that are part of the desktop
        const ONLY_ACTIVE_PATHS = 1 << 1;
    }
}

/// Which persisted slot [`WinSystem::enum_display_settings`] reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsMode {
    /// The mode the source is driving right now
    Current,
    /// The restore-on-reattach mode
    Registry,
    /// The n-th entry of the supported-mode list
    Index(u32),
}

/// Fallback behavior of the `monitor_from_*` lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorFromFlags {
    /// Miss returns `None`
    DefaultToNull,
    /// Miss returns the primary monitor
    DefaultToPrimary,
    /// Miss returns the nearest monitor
    DefaultToNearest,
}

/// One enumerated display device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayDevice {
    /// Device name ("\\\\.\\DISPLAY1", or the monitor id for monitors)
    pub device_name: String,
    /// Human-readable description
    pub device_string: String,
    /// State flags
    pub state_flags: DisplayDeviceFlags,
    /// Stable device id
    pub device_id: String,
    /// Store key backing this device
    pub device_key: String,
}

/// Monitor information returned by [`WinSystem::get_monitor_info`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Monitor rectangle in the caller's coordinate space
    pub rc_monitor: Rect,
    /// Work-area rectangle in the caller's coordinate space
    pub rc_work: Rect,
    /// True for the primary monitor
    pub primary: bool,
    /// Owning device name
    pub device: String,
}

/// One mode entry of a display-config query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigModeInfo {
    /// Source (desktop surface) mode
    Source {
        /// Owning adapter LUID
        adapter_luid: u64,
        /// Source id
        id: u32,
        /// Surface width
        width: u32,
        /// Surface height
        height: u32,
        /// Desktop position
        position: Point,
    },
    /// Target (signal) mode
    Target {
        /// Owning adapter LUID
        adapter_luid: u64,
        /// Target (output) id
        id: u32,
        /// Active width
        width: u32,
        /// Active height
        height: u32,
        /// Vertical refresh in Hz
        refresh: u32,
    },
}

/// One source-to-target path of a display-config query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigPathInfo {
    /// Owning adapter LUID
    pub adapter_luid: u64,
    /// Source id
    pub source_id: u32,
    /// Index of the source mode in the mode array
    pub source_mode: Option<usize>,
    /// Target (output) id
    pub target_id: u32,
    /// Index of the target mode in the mode array
    pub target_mode: Option<usize>,
    /// True if the path is part of the desktop
    pub active: bool,
}

/// Queries for [`WinSystem::display_config_get_device_info`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceInfoQuery {
    /// GDI device name of a source
    SourceName {
        /// Adapter LUID
        adapter_luid: u64,
        /// Source id
        id: u32,
    },
    /// Monitor name of a target
    TargetName {
        /// Adapter LUID
        adapter_luid: u64,
        /// Target id
        id: u32,
    },
    /// Device path of an adapter
    AdapterName {
        /// Adapter LUID
        adapter_luid: u64,
    },
    /// Preferred (native) mode of a target
    TargetPreferredMode {
        /// Adapter LUID
        adapter_luid: u64,
        /// Target id
        id: u32,
    },
}

/// Replies of [`WinSystem::display_config_get_device_info`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceInfoReply {
    /// GDI device name of the source
    SourceName(String),
    /// Monitor identity of the target
    TargetName {
        /// EDID friendly name, when present
        friendly_name: Option<String>,
        /// Stable monitor id string, when present
        monitor_id: Option<String>,
    },
    /// Device path of the adapter
    AdapterName(String),
    /// Preferred mode of the target
    TargetPreferredMode {
        /// Native width
        width: u32,
        /// Native height
        height: u32,
    },
}

impl WinSystem {
    // ---- SystemParametersInfo ----

    /// `SystemParametersInfo` getter in the caller's DPI space
    pub fn spi_get(&self, param: SystemParameter) -> ParamValue {
        self.params().get(param, self.caller_dpi(self.system_dpi()))
    }

    /// `SystemParametersInfoForDpi` getter at an explicit DPI
    pub fn spi_get_for_dpi(&self, param: SystemParameter, dpi: u32) -> ParamValue {
        self.params().get(param, dpi)
    }

    /// `SystemParametersInfo` setter
    ///
    /// The store always persists the new value; `SEND_CHANGE` additionally
    /// notifies other processes through the broadcast hook.
    pub fn spi_set(
        &self,
        param: SystemParameter,
        value: &ParamValue,
        flags: UpdateFlags,
    ) -> Result<()> {
        self.params().set(param, value)?;
        if flags.contains(UpdateFlags::SEND_CHANGE) {
            self.notify(&ChangeEvent::SettingChange {
                parameter: param.entry().name.to_string(),
            });
        }
        Ok(())
    }

    /// `SPI_GETWORKAREA`: the primary monitor's work area in the caller's
    /// coordinate space
    pub fn get_work_area(&self) -> Rect {
        match self.topology().read(false) {
            Ok(topo) => topo
                .primary_monitor()
                .map_or(FALLBACK_WORK_AREA, |m| self.to_caller_rect(m, m.rc_work)),
            Err(e) => {
                warn!("work area without topology: {e}");
                FALLBACK_WORK_AREA
            }
        }
    }

    /// `SPI_SETWORKAREA`: persist a new primary work area
    pub fn set_work_area(&self, rect: Rect, flags: UpdateFlags) -> Result<()> {
        {
            let topo = self.topology().read(false)?;
            let monitor = topo
                .primary_monitor()
                .ok_or_else(|| WinDisplayError::InvalidPath("no primary monitor".to_string()))?;
            let source = monitor
                .source
                .as_ref()
                .ok_or(WinDisplayError::NotImplemented("synthetic work area"))?;
            let key = format!("Video\\Monitors\\{}\\{:02}", source.name, monitor.id);
            self.store()
                .set(&key, "WorkArea", crate::registry::Value::Binary(rect_to_blob(&rect)))?;
            self.topology().bump_serial()?;
        }
        if flags.contains(UpdateFlags::SEND_CHANGE) {
            self.notify(&ChangeEvent::SettingChange {
                parameter: "WorkArea".to_string(),
            });
        }
        Ok(())
    }

    // ---- Monitor enumeration ----

    fn to_caller_rect(&self, monitor: &Monitor, rect: Rect) -> Rect {
        map_dpi_rect(rect, monitor.dpi(), self.caller_dpi(monitor.dpi()))
    }

    fn from_caller_point(&self, pt: Point) -> Point {
        let system = self.system_dpi();
        map_dpi_point(pt, self.caller_dpi(system), system)
    }

    fn from_caller_rect(&self, rect: Rect) -> Rect {
        let system = self.system_dpi();
        map_dpi_rect(rect, self.caller_dpi(system), system)
    }

    /// `EnumDisplayMonitors`: invoke the callback once per active monitor
    ///
    /// Returning `false` from the callback stops the enumeration early.
    /// The callback runs outside the display lock, so it may call back
    /// into this context.
    pub fn enum_display_monitors(
        &self,
        mut callback: impl FnMut(MonitorHandle, Rect) -> bool,
    ) -> Result<()> {
        let monitors: Vec<(MonitorHandle, Rect)> = {
            let topo = self.topology().read(false)?;
            topo.active_monitors()
                .filter(|m| !m.is_clone)
                .map(|m| (m.handle, self.to_caller_rect(m, m.rc_monitor)))
                .collect()
        };
        for (handle, rect) in monitors {
            if !callback(handle, rect) {
                break;
            }
        }
        Ok(())
    }

    /// `GetMonitorInfo`
    pub fn get_monitor_info(&self, handle: MonitorHandle) -> Option<MonitorInfo> {
        let topo = self.topology().read(false).ok()?;
        let monitor = topo.monitor_by_handle(handle)?;
        Some(MonitorInfo {
            rc_monitor: self.to_caller_rect(monitor, monitor.rc_monitor),
            rc_work: self.to_caller_rect(monitor, monitor.rc_work),
            primary: monitor.is_primary(),
            device: monitor
                .source
                .as_ref()
                .map_or_else(|| "\\\\.\\DISPLAY1".to_string(), |s| s.device_name()),
        })
    }

    /// `MonitorFromPoint`
    pub fn monitor_from_point(&self, pt: Point, flags: MonitorFromFlags) -> Option<MonitorHandle> {
        let pt = self.from_caller_point(pt);
        let topo = self.topology().read(false).ok()?;
        let hit = topo
            .active_monitors()
            .find(|m| m.rc_monitor.contains(pt))
            .map(|m| m.handle);
        if hit.is_some() {
            return hit;
        }
        match flags {
            MonitorFromFlags::DefaultToNull => None,
            MonitorFromFlags::DefaultToPrimary => topo.primary_monitor().map(|m| m.handle),
            MonitorFromFlags::DefaultToNearest => topo
                .active_monitors()
                .min_by_key(|m| {
                    let c = m.rc_monitor.center();
                    let dx = i64::from(c.x - pt.x);
                    let dy = i64::from(c.y - pt.y);
                    dx * dx + dy * dy
                })
                .map(|m| m.handle),
        }
    }

    /// `MonitorFromRect`: the monitor with the largest intersection
    pub fn monitor_from_rect(&self, rect: Rect, flags: MonitorFromFlags) -> Option<MonitorHandle> {
        let mapped = self.from_caller_rect(rect);
        let hit = {
            let topo = self.topology().read(false).ok()?;
            topo.active_monitors()
                .filter_map(|m| {
                    m.rc_monitor.intersect(&mapped).map(|overlap| {
                        (
                            i64::from(overlap.width()) * i64::from(overlap.height()),
                            m.handle,
                        )
                    })
                })
                .max_by_key(|(area, _)| *area)
                .map(|(_, handle)| handle)
        };
        if hit.is_some() {
            return hit;
        }
        // Fall back to the point lookup, which re-maps from caller space
        self.monitor_from_point(rect.origin(), flags)
    }

    /// `MonitorFromWindow`
    ///
    /// There is no window system in scope; the caller supplies the window
    /// rectangle directly, and `None` selects the primary monitor.
    pub fn monitor_from_window(
        &self,
        window_rect: Option<Rect>,
        flags: MonitorFromFlags,
    ) -> Option<MonitorHandle> {
        match window_rect {
            Some(rect) => self.monitor_from_rect(rect, flags),
            None => {
                let topo = self.topology().read(false).ok()?;
                topo.primary_monitor().map(|m| m.handle)
            }
        }
    }

    // ---- Display device and settings enumeration ----

    /// `EnumDisplayDevices`
    ///
    /// With no device name, `index` walks the sources; with a source's
    /// device name, `index` walks that source's monitors.
    pub fn enum_display_devices(&self, device: Option<&str>, index: u32) -> Option<DisplayDevice> {
        let topo = self.topology().read(false).ok()?;
        match device {
            None => {
                let source = topo.sources.get(index as usize)?;
                let mut flags = DisplayDeviceFlags::empty();
                if source.is_attached() {
                    flags |= DisplayDeviceFlags::ATTACHED_TO_DESKTOP;
                }
                if source.is_primary() {
                    flags |= DisplayDeviceFlags::PRIMARY_DEVICE;
                }
                if source.flags.contains(crate::topology::SourceFlags::VGA_COMPATIBLE) {
                    flags |= DisplayDeviceFlags::VGA_COMPATIBLE;
                }
                Some(DisplayDevice {
                    device_name: source.device_name(),
                    device_string: source.gpu.name.clone(),
                    state_flags: flags,
                    device_id: source.gpu.path.clone(),
                    device_key: format!("Video\\Sources\\{}", source.name),
                })
            }
            Some(name) => {
                let source = topo.source_by_name(name)?;
                let monitor = topo
                    .monitors
                    .iter()
                    .filter(|m| {
                        m.source
                            .as_ref()
                            .is_some_and(|s| Arc::ptr_eq(s, source))
                    })
                    .nth(index as usize)?;
                let mut flags = DisplayDeviceFlags::empty();
                if monitor.is_active() {
                    flags |= DisplayDeviceFlags::ATTACHED_TO_DESKTOP;
                }
                if monitor.is_clone {
                    flags |= DisplayDeviceFlags::MIRRORING_DRIVER;
                }
                let monitor_id = monitor
                    .edid
                    .monitor_id
                    .clone()
                    .unwrap_or_else(|| "Default_Monitor".to_string());
                Some(DisplayDevice {
                    device_name: format!("{}\\Monitor{}", source.device_name(), monitor.id),
                    device_string: monitor
                        .edid
                        .name
                        .clone()
                        .unwrap_or_else(|| "Generic Non-PnP Monitor".to_string()),
                    state_flags: flags,
                    device_id: monitor_id,
                    device_key: format!("Video\\Monitors\\{}\\{:02}", source.name, monitor.id),
                })
            }
        }
    }

    /// `EnumDisplaySettingsEx`
    pub fn enum_display_settings(
        &self,
        device: Option<&str>,
        mode: SettingsMode,
        flags: EnumSettingsFlags,
    ) -> Option<DeviceMode> {
        let topo = self.topology().read(false).ok()?;
        let source = match device {
            None => topo.primary_source()?,
            Some(name) => topo.source_by_name(name)?,
        };
        match mode {
            SettingsMode::Current => Some(source.current_mode()),
            SettingsMode::Registry => Some(source.registry_mode()),
            SettingsMode::Index(n) => {
                let modes = source.modes();
                let mut entry = modes
                    .iter()
                    .filter(|m| !m.unsupported || flags.contains(EnumSettingsFlags::RAW_MODE))
                    .nth(n as usize)?
                    .mode;
                if !flags.contains(EnumSettingsFlags::ROTATED_MODE) {
                    // Normalize to the current orientation so callers that
                    // predate rotation see consistent sizes
                    let current = source.current_mode().orientation.unwrap_or_default();
                    if entry.orientation.unwrap_or_default().is_rotated() != current.is_rotated() {
                        std::mem::swap(&mut entry.width, &mut entry.height);
                    }
                    entry.orientation = Some(current);
                }
                Some(entry)
            }
        }
    }

    // ---- ChangeDisplaySettings ----

    /// `ChangeDisplaySettingsEx`
    ///
    /// Negotiates the requested mode, re-places the whole layout, persists
    /// it and applies it through the host driver. Detaching every display
    /// at once is refused with a successful no-op: a fully detached
    /// desktop could never be recovered through this same API.
    pub fn change_display_settings(
        &self,
        device: Option<&str>,
        mode: Option<&DeviceMode>,
        flags: ChangeFlags,
    ) -> Result<()> {
        let topo = self.topology().read(false)?;
        let target = match device {
            None => topo.primary_source(),
            Some(name) => topo.source_by_name(name),
        }
        .ok_or_else(|| {
            WinDisplayError::InvalidPath(device.unwrap_or("<primary>").to_string())
        })?;
        let target = Arc::clone(target);

        let mut resolved = Vec::with_capacity(topo.sources.len());
        let mut primary_index = 0;
        for (index, source) in topo.sources.iter().enumerate() {
            if source.is_primary() {
                primary_index = index;
            }
            let entry = if Arc::ptr_eq(source, &target) {
                resolve_mode(
                    mode,
                    &source.registry_mode(),
                    &source.current_mode(),
                    &source.modes(),
                    NegotiateOptions::default(),
                )?
            } else {
                let mut current = source.current_mode();
                if current.position.is_none() {
                    current.position = Some(Point::default());
                }
                current
            };
            resolved.push(entry);
        }

        if resolved.iter().all(DeviceMode::is_detached) {
            warn!("refusing to detach every display; settings unchanged");
            return Ok(());
        }

        place_all(&mut resolved, primary_index);

        if flags.contains(ChangeFlags::TEST) {
            debug!("display settings test passed for {}", target.name);
            return Ok(());
        }

        let primary_depth = resolved[primary_index].bits_per_pixel.unwrap_or(32);
        for (source, entry) in topo.sources.iter().zip(&resolved) {
            source.set_current_mode(entry)?;
            if flags.contains(ChangeFlags::UPDATE_REGISTRY) {
                source.set_registry_mode(entry)?;
            }
        }

        if !flags.contains(ChangeFlags::NO_RESET) {
            for (source, entry) in topo.sources.iter().zip(&resolved) {
                if !source.is_attached() && !flags.contains(ChangeFlags::RESET) {
                    continue;
                }
                match self.topology().driver().apply_mode(&source.name, entry) {
                    Ok(()) => info!("{} -> {entry}", source.name),
                    Err(WinDisplayError::NotImplemented(_)) => {
                        warn!("driver cannot apply modes; persisted only");
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        self.topology().bump_serial()?;
        drop(topo);

        if !flags.contains(ChangeFlags::NO_RESET) {
            self.notify(&ChangeEvent::DisplayChange {
                depth: primary_depth,
            });
        }
        Ok(())
    }

    // ---- QueryDisplayConfig ----

    /// `GetDisplayConfigBufferSizes`
    pub fn get_display_config_buffer_sizes(&self, flags: QueryFlags) -> Result<(usize, usize)> {
        let (paths, modes) = self.query_display_config(flags)?;
        Ok((paths.len(), modes.len()))
    }

    /// `QueryDisplayConfig`
    pub fn query_display_config(
        &self,
        flags: QueryFlags,
    ) -> Result<(Vec<ConfigPathInfo>, Vec<ConfigModeInfo>)> {
        let topo = self.topology().read(false)?;
        let only_active = flags.contains(QueryFlags::ONLY_ACTIVE_PATHS);

        let mut paths = Vec::new();
        let mut modes = Vec::new();
        for source in &topo.sources {
            let Some(monitor) = topo.monitors.iter().find(|m| {
                m.source
                    .as_ref()
                    .is_some_and(|s| Arc::ptr_eq(s, source))
            }) else {
                continue;
            };
            let current = source.current_mode();
            let active = source.is_attached() && !current.is_detached();
            if only_active && !active {
                continue;
            }

            let luid = source.gpu.luid;
            let (source_mode, target_mode) = if active {
                let source_index = modes.len();
                modes.push(ConfigModeInfo::Source {
                    adapter_luid: luid,
                    id: source.id,
                    width: current.width.unwrap_or(0),
                    height: current.height.unwrap_or(0),
                    position: current.position.unwrap_or_default(),
                });
                let target_index = modes.len();
                modes.push(ConfigModeInfo::Target {
                    adapter_luid: luid,
                    id: monitor.output_id,
                    width: current.width.unwrap_or(0),
                    height: current.height.unwrap_or(0),
                    refresh: current.refresh.unwrap_or(60),
                });
                (Some(source_index), Some(target_index))
            } else {
                (None, None)
            };

            paths.push(ConfigPathInfo {
                adapter_luid: luid,
                source_id: source.id,
                source_mode,
                target_id: monitor.output_id,
                target_mode,
                active,
            });
        }
        Ok((paths, modes))
    }

    /// `DisplayConfigGetDeviceInfo`
    pub fn display_config_get_device_info(&self, query: DeviceInfoQuery) -> Result<DeviceInfoReply> {
        let topo = self.topology().read(false)?;
        match query {
            DeviceInfoQuery::SourceName { adapter_luid, id } => topo
                .sources
                .iter()
                .find(|s| s.gpu.luid == adapter_luid && s.id == id)
                .map(|s| DeviceInfoReply::SourceName(s.device_name()))
                .ok_or(WinDisplayError::InvalidParameter),
            DeviceInfoQuery::TargetName { adapter_luid, id } => topo
                .monitors
                .iter()
                .find(|m| {
                    m.output_id == id
                        && m.source
                            .as_ref()
                            .is_some_and(|s| s.gpu.luid == adapter_luid)
                })
                .map(|m| DeviceInfoReply::TargetName {
                    friendly_name: m.edid.name.clone(),
                    monitor_id: m.edid.monitor_id.clone(),
                })
                .ok_or(WinDisplayError::InvalidParameter),
            DeviceInfoQuery::AdapterName { adapter_luid } => topo
                .gpus
                .iter()
                .find(|g| g.luid == adapter_luid)
                .map(|g| DeviceInfoReply::AdapterName(g.path.clone()))
                .ok_or(WinDisplayError::InvalidParameter),
            DeviceInfoQuery::TargetPreferredMode { adapter_luid, id } => topo
                .monitors
                .iter()
                .find(|m| {
                    m.output_id == id
                        && m.source
                            .as_ref()
                            .is_some_and(|s| s.gpu.luid == adapter_luid)
                })
                .map(|m| {
                    let (width, height) = m.edid.preferred.unwrap_or_else(|| {
                        let mode = m
                            .source
                            .as_ref()
                            .map(|s| s.physical_mode())
                            .unwrap_or_default();
                        (mode.width.unwrap_or(0), mode.height.unwrap_or(0))
                    });
                    DeviceInfoReply::TargetPreferredMode { width, height }
                })
                .ok_or(WinDisplayError::InvalidParameter),
        }
    }
}
