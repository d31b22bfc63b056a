//! `windisplay` - Win32 system-parameters and display-configuration
//! compatibility layer
//!
//! Reimplements the user/GDI "system parameters" and multi-monitor
//! display-configuration services (`SystemParametersInfo`,
//! `GetSystemMetrics`, monitor enumeration, display-mode negotiation, DPI
//! awareness) on top of an abstract host windowing backend. The display
//! topology (GPUs, sources, monitors) lives in a process-wide cache
//! synchronized from an emulated registry store and reconciled against the
//! host driver on demand.
//!
//! # Architecture
//!
//! - [`system::WinSystem`]: process-wide context with an `init`/`shutdown`
//!   lifecycle; every public API is a method on it
//! - [`topology`]: the GPU/source/monitor cache and the host driver
//!   bootstrap protocol
//! - [`modes`] / [`placement`] / [`dpi`]: mode negotiation, monitor layout
//!   and coordinate-space mapping
//! - [`registry`] / [`sysparams`]: the emulated configuration store and
//!   the typed system-parameter table

// Module declarations
pub mod api;
pub mod devmode;
pub mod dpi;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod modes;
pub mod placement;
pub mod registry;
pub mod sysparams;
pub mod system;
pub mod topology;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use api::{ChangeFlags, EnumSettingsFlags, MonitorFromFlags, SettingsMode, UpdateFlags};
pub use devmode::DeviceMode;
pub use error::{Result, WinDisplayError};
pub use geometry::{Point, Rect};
pub use metrics::SystemMetric;
pub use sysparams::SystemParameter;
pub use system::{SystemOptions, WinSystem};
pub use topology::{DeviceEvent, HostDriver, MonitorHandle};
