//! Snapshot persistence for the configuration store
//!
//! The whole key tree round-trips through JSON. Saving uses a temp file in
//! the target directory followed by an atomic rename to prevent a partially
//! written snapshot from ever being observed. Loading a missing or corrupt
//! snapshot yields an empty store rather than an error, so a damaged file
//! degrades to first-boot behavior instead of breaking startup.

use crate::error::{Result, WinDisplayError};
use crate::registry::store::{RegistryStore, StoreInner};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

impl RegistryStore {
    /// Load a store snapshot from disk
    ///
    /// Returns an empty store when the file does not exist or fails to parse.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("store snapshot not found, starting empty");
            return Self::new();
        }
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to read store snapshot, starting empty: {e}");
                return Self::new();
            }
        };
        match serde_json::from_str::<StoreInner>(&json) {
            Ok(inner) => {
                info!("store snapshot loaded");
                Self {
                    inner: parking_lot::Mutex::new(inner),
                }
            }
            Err(e) => {
                warn!("failed to parse store snapshot, starting empty: {e}");
                Self::new()
            }
        }
    }

    /// Save a store snapshot to disk with an atomic write
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path.parent().ok_or_else(|| {
            WinDisplayError::StoreUnavailable("snapshot path has no parent".to_string())
        })?;
        std::fs::create_dir_all(dir)?;

        let json = {
            let inner = self.inner.lock();
            serde_json::to_string_pretty(&*inner)?
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(path)
            .map_err(|e| WinDisplayError::StoreUnavailable(e.to_string()))?;

        info!("store snapshot saved");
        Ok(())
    }
}
