//! Display device topology: GPUs, sources and monitors
//!
//! This module maintains the process-wide picture of the display hardware
//! as a layered cache of reference-counted objects: each [`Gpu`] is shared
//! by the [`Source`]s (display output slots) it owns, and each source is
//! shared by the [`Monitor`]s attached to it. The cache is reconstructed
//! wholesale from the configuration store whenever it goes stale, and
//! bootstrapped from the host driver's device-manager event protocol when
//! the store has nothing usable.
//!
//! # Architecture
//!
//! - [`Gpu`] / [`Source`] / [`Monitor`]: the object graph, `Arc`-shared so
//!   a handle held across a rebuild never dangles
//! - [`DeviceEvent`] / [`HostDriver`]: the bootstrap enumeration protocol,
//!   consumed in one pass in strict dependency order
//! - [`TopologyCache`]: the mutex-guarded cache with staleness detection
//!
//! # Locking
//!
//! One process-wide non-reentrant mutex serializes every read and write
//! traversal of the lists; a second "device init" mutex additionally guards
//! the store against interleaved writes during a rebuild. Both are held
//! across host driver calls during a forced rebuild, accepting that a slow
//! driver blocks the process; rebuilds are rare.

pub mod cache;
pub mod driver;
pub mod gpu;
pub mod monitor;
pub mod source;

pub use cache::{Topology, TopologyCache, TopologyGuard};
pub use driver::{DeviceEvent, HostDriver, NoopDriver, PciId, StaticDriver};
pub use gpu::Gpu;
pub use monitor::{EdidInfo, Monitor, MonitorHandle, parse_edid};
pub use source::{Source, SourceFlags};
