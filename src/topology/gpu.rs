//! Graphics adapter objects

use crate::error::{Result, WinDisplayError};
use crate::registry::{RegistryStore, Value};
use uuid::Uuid;

pub(crate) const GPUS_KEY: &str = "Video\\Gpus";
pub(crate) const IDENTITIES_KEY: &str = "Video\\Identities";
const LAST_LUID_VALUE: &str = "LastLuid";

/// One graphics adapter
///
/// GUID and LUID are assigned on first discovery and persisted under a key
/// derived from the adapter's bus path, so they survive topology rebuilds:
/// downstream graphics APIs hand the LUID around as the adapter's identity
/// and would break if it changed.
#[derive(Debug)]
pub struct Gpu {
    /// Bus-topology-derived identity, stable across reboots
    pub path: String,
    /// Human-readable adapter name
    pub name: String,
    /// Persisted adapter GUID
    pub guid: Uuid,
    /// Locally-unique 64-bit id handed to downstream graphics APIs
    pub luid: u64,
    /// Adapter index in enumeration order
    pub index: u32,
    /// Vulkan interop UUID, when the host exposes one
    pub vulkan_uuid: Option<Uuid>,
    /// Number of sources this adapter owns
    pub source_count: u32,
}

fn identity_key(path: &str) -> String {
    // Bus paths contain separator characters; flatten them for use as a
    // single key component
    let flat: String = path
        .chars()
        .map(|c| if c == '\\' || c == '/' { '#' } else { c })
        .collect();
    format!("{IDENTITIES_KEY}\\{flat}")
}

impl Gpu {
    /// Look up or allocate the persisted GUID/LUID pair for an adapter path
    ///
    /// The identity subtree is never cleared by rebuilds, which is what
    /// keeps these stable.
    pub(crate) fn stable_identity(store: &RegistryStore, path: &str) -> Result<(Uuid, u64)> {
        let key = identity_key(path);
        if let (Some(guid), Some(luid)) = (store.get_sz(&key, "Guid"), store.get_qword(&key, "Luid"))
        {
            if let Ok(guid) = Uuid::parse_str(&guid) {
                return Ok((guid, luid));
            }
        }
        let guid = Uuid::new_v4();
        let luid = store.get_qword(IDENTITIES_KEY, LAST_LUID_VALUE).unwrap_or(0x1_0000) + 1;
        store.set(IDENTITIES_KEY, LAST_LUID_VALUE, Value::Qword(luid))?;
        store.set(&key, "Guid", Value::Sz(guid.to_string()))?;
        store.set(&key, "Luid", Value::Qword(luid))?;
        Ok((guid, luid))
    }

    pub(crate) fn save(&self, store: &RegistryStore) -> Result<()> {
        let key = format!("{GPUS_KEY}\\{:04}", self.index);
        store.set(&key, "Path", Value::Sz(self.path.clone()))?;
        store.set(&key, "Name", Value::Sz(self.name.clone()))?;
        store.set(&key, "Guid", Value::Sz(self.guid.to_string()))?;
        store.set(&key, "Luid", Value::Qword(self.luid))?;
        if let Some(vulkan) = self.vulkan_uuid {
            store.set(&key, "VulkanUuid", Value::Sz(vulkan.to_string()))?;
        }
        store.set(&key, "SourceCount", Value::Dword(self.source_count))?;
        Ok(())
    }

    pub(crate) fn load(store: &RegistryStore, index: u32) -> Result<Self> {
        let key = format!("{GPUS_KEY}\\{index:04}");
        let missing =
            |name: &str| WinDisplayError::StoreUnavailable(format!("{key} missing {name}"));
        let path = store.get_sz(&key, "Path").ok_or_else(|| missing("Path"))?;
        let name = store.get_sz(&key, "Name").ok_or_else(|| missing("Name"))?;
        let guid = store
            .get_sz(&key, "Guid")
            .and_then(|s| Uuid::parse_str(&s).ok())
            .ok_or_else(|| missing("Guid"))?;
        let luid = store.get_qword(&key, "Luid").ok_or_else(|| missing("Luid"))?;
        let vulkan_uuid = store
            .get_sz(&key, "VulkanUuid")
            .and_then(|s| Uuid::parse_str(&s).ok());
        let source_count = store
            .get_dword(&key, "SourceCount")
            .ok_or_else(|| missing("SourceCount"))?;
        Ok(Self {
            path,
            name,
            guid,
            luid,
            index,
            vulkan_uuid,
            source_count,
        })
    }
}
