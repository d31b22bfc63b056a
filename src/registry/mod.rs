//! Emulated registry-style configuration store
//!
//! The compatibility layer owns its configuration storage: a hierarchical
//! key/value tree addressed by backslash-separated ASCII paths, with typed
//! values and per-key last-write serials. Display topology, device modes
//! and system parameters all persist here, and staleness of the in-process
//! topology cache is detected by comparing serials recorded in this store.
//!
//! # Overview
//!
//! - [`RegistryStore`]: thread-safe key/value tree with open-or-create,
//!   query, set, delete-value, delete-subtree and enumerate-subkeys
//! - [`Value`]: typed values (string, multi-string, dword, qword, binary)
//! - **Write serials**: a store-global monotonically increasing counter;
//!   every mutation advances it and stamps the mutated key chain
//! - **Snapshot persistence**: the whole tree round-trips through JSON
//!   with atomic writes (temp file + rename) to prevent corruption

pub mod persist;
pub mod store;

pub use store::{RegistryStore, Value};
