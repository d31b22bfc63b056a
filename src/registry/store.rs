//! In-memory hierarchical key/value store with write serials

use crate::error::{Result, WinDisplayError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// A typed store value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// String value
    Sz(String),
    /// List-of-strings value
    MultiSz(Vec<String>),
    /// 32-bit unsigned value
    Dword(u32),
    /// 64-bit unsigned value
    Qword(u64),
    /// Opaque binary value
    Binary(Vec<u8>),
}

impl Value {
    /// String content, if this is a string value
    pub fn as_sz(&self) -> Option<&str> {
        match self {
            Self::Sz(s) => Some(s),
            _ => None,
        }
    }

    /// 32-bit content, if this is a dword value
    pub fn as_dword(&self) -> Option<u32> {
        match self {
            Self::Dword(v) => Some(*v),
            _ => None,
        }
    }

    /// 64-bit content, if this is a qword value
    pub fn as_qword(&self) -> Option<u64> {
        match self {
            Self::Qword(v) => Some(*v),
            _ => None,
        }
    }

    /// Binary content, if this is a binary value
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }
}

/// One key in the tree: named values plus named subkeys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct KeyNode {
    pub(crate) values: BTreeMap<String, Value>,
    pub(crate) subkeys: BTreeMap<String, KeyNode>,
    pub(crate) last_write: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct StoreInner {
    pub(crate) root: KeyNode,
    pub(crate) serial: u64,
}

/// Thread-safe emulated registry store
///
/// All operations take full key paths ("A\B\C"); forward slashes are
/// accepted as separators too. Reads of missing keys or values return
/// `None`; writes create intermediate keys on demand.
#[derive(Debug, Default)]
pub struct RegistryStore {
    pub(crate) inner: Mutex<StoreInner>,
}

fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(WinDisplayError::InvalidPath(path.to_string()));
    }
    let parts: Vec<&str> = path.split(['\\', '/']).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(WinDisplayError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

impl RegistryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open-or-create a key, creating every missing component of the path
    pub fn create_key(&self, path: &str) -> Result<()> {
        let parts = split_path(path)?;
        let mut inner = self.inner.lock();
        let serial = inner.serial + 1;
        let mut node = &mut inner.root;
        let mut created = false;
        for part in parts {
            created |= !node.subkeys.contains_key(part);
            node = node.subkeys.entry(part.to_string()).or_default();
        }
        if created {
            node.last_write = serial;
            inner.serial = serial;
        }
        Ok(())
    }

    /// True if the key exists
    pub fn key_exists(&self, path: &str) -> bool {
        let Ok(parts) = split_path(path) else {
            return false;
        };
        let inner = self.inner.lock();
        let mut node = &inner.root;
        for part in parts {
            match node.subkeys.get(part) {
                Some(next) => node = next,
                None => return false,
            }
        }
        true
    }

    /// Query a value
    pub fn get(&self, path: &str, name: &str) -> Option<Value> {
        let parts = split_path(path).ok()?;
        let inner = self.inner.lock();
        let mut node = &inner.root;
        for part in parts {
            node = node.subkeys.get(part)?;
        }
        node.values.get(name).cloned()
    }

    /// Query a string value
    pub fn get_sz(&self, path: &str, name: &str) -> Option<String> {
        self.get(path, name)
            .and_then(|v| v.as_sz().map(str::to_string))
    }

    /// Query a dword value
    pub fn get_dword(&self, path: &str, name: &str) -> Option<u32> {
        self.get(path, name).and_then(|v| v.as_dword())
    }

    /// Query a qword value
    pub fn get_qword(&self, path: &str, name: &str) -> Option<u64> {
        self.get(path, name).and_then(|v| v.as_qword())
    }

    /// Query a binary value
    pub fn get_binary(&self, path: &str, name: &str) -> Option<Vec<u8>> {
        self.get(path, name)
            .and_then(|v| v.as_binary().map(<[u8]>::to_vec))
    }

    /// Set a value, creating intermediate keys on demand
    ///
    /// Advances the store write serial and stamps every key along the path,
    /// so last-write queries on ancestors reflect writes to descendants.
    pub fn set(&self, path: &str, name: &str, value: Value) -> Result<()> {
        let parts = split_path(path)?;
        let mut inner = self.inner.lock();
        let serial = inner.serial + 1;
        inner.serial = serial;
        let mut node = &mut inner.root;
        for part in parts {
            node.last_write = serial;
            node = node.subkeys.entry(part.to_string()).or_default();
        }
        node.last_write = serial;
        trace!("store set {path}\\{name}");
        node.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Delete a single value; deleting a missing value is not an error
    pub fn delete_value(&self, path: &str, name: &str) -> Result<()> {
        let parts = split_path(path)?;
        let mut inner = self.inner.lock();
        let serial = inner.serial + 1;
        let mut node = &mut inner.root;
        for part in parts {
            match node.subkeys.get_mut(part) {
                Some(next) => node = next,
                None => return Ok(()),
            }
        }
        if node.values.remove(name).is_some() {
            node.last_write = serial;
            inner.serial = serial;
        }
        Ok(())
    }

    /// Delete a key and its whole subtree; deleting a missing key is not an error
    pub fn delete_tree(&self, path: &str) -> Result<()> {
        let parts = split_path(path)?;
        let (&leaf, ancestors) = parts
            .split_last()
            .ok_or_else(|| WinDisplayError::InvalidPath(path.to_string()))?;
        let mut inner = self.inner.lock();
        let serial = inner.serial + 1;
        let mut node = &mut inner.root;
        for part in ancestors {
            match node.subkeys.get_mut(*part) {
                Some(next) => node = next,
                None => return Ok(()),
            }
        }
        if node.subkeys.remove(leaf).is_some() {
            node.last_write = serial;
            inner.serial = serial;
        }
        Ok(())
    }

    /// Enumerate the immediate subkey names of a key, in sorted order
    pub fn subkeys(&self, path: &str) -> Vec<String> {
        let Ok(parts) = split_path(path) else {
            return Vec::new();
        };
        let inner = self.inner.lock();
        let mut node = &inner.root;
        for part in parts {
            match node.subkeys.get(part) {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }
        node.subkeys.keys().cloned().collect()
    }

    /// Last-write serial of a key, or `None` if the key does not exist
    ///
    /// Ancestor keys are stamped on descendant writes, so the serial of a
    /// subtree root reflects the newest write anywhere below it.
    pub fn last_write(&self, path: &str) -> Option<u64> {
        let parts = split_path(path).ok()?;
        let inner = self.inner.lock();
        let mut node = &inner.root;
        for part in parts {
            node = node.subkeys.get(part)?;
        }
        Some(node.last_write)
    }

    /// Current store-global write serial
    pub fn serial(&self) -> u64 {
        self.inner.lock().serial
    }
}
