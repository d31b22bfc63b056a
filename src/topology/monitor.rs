//! Monitor objects and EDID parsing

use crate::dpi::{ScaleRatio, virt_to_raw_ratio};
use crate::error::{Result, WinDisplayError};
use crate::geometry::Rect;
use crate::registry::{RegistryStore, Value};
use crate::topology::source::Source;
use std::sync::Arc;

pub(crate) const MONITORS_KEY: &str = "Video\\Monitors";

/// Opaque monitor handle exposed to API callers
///
/// Derived from the owning source id and the monitor's position on it, so
/// the same physical monitor keeps the same handle across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorHandle(pub u64);

impl MonitorHandle {
    pub(crate) fn from_ids(source_id: u32, monitor_id: u32) -> Self {
        Self((u64::from(source_id) + 1) << 16 | (u64::from(monitor_id) + 1))
    }

    /// Handle of the synthetic monitor used when no real display exists
    pub(crate) const SYNTHETIC: Self = Self(0xFFFF_0001);
}

/// EDID-derived monitor metadata
///
/// Every field is optional: monitors without EDID (or with a truncated
/// block) simply report nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdidInfo {
    /// Three-letter PNP manufacturer id
    pub manufacturer: Option<String>,
    /// Manufacturer product code
    pub product_code: Option<u16>,
    /// Stable monitor id string ("DEL404C" style)
    pub monitor_id: Option<String>,
    /// Human-readable display name from the product-name descriptor
    pub name: Option<String>,
    /// Native resolution from the first detailed timing descriptor
    pub preferred: Option<(u32, u32)>,
}

const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

/// Parse the base EDID block
///
/// Returns an empty [`EdidInfo`] for anything that is not a valid 128-byte
/// base block; partial metadata is better than none and never an error.
pub fn parse_edid(bytes: &[u8]) -> EdidInfo {
    let mut info = EdidInfo::default();
    if bytes.len() < 128 || bytes[..8] != EDID_HEADER {
        return info;
    }

    // Manufacturer: two big-endian bytes packing three 5-bit letters
    let packed = u16::from_be_bytes([bytes[8], bytes[9]]);
    let letters = [
        (packed >> 10) & 0x1F,
        (packed >> 5) & 0x1F,
        packed & 0x1F,
    ];
    if letters.iter().all(|&l| (1..=26).contains(&l)) {
        let manufacturer: String = letters
            .iter()
            .map(|&l| char::from(b'A' + u8::try_from(l - 1).unwrap_or(0)))
            .collect();
        let product = u16::from_le_bytes([bytes[10], bytes[11]]);
        info.monitor_id = Some(format!("{manufacturer}{product:04X}"));
        info.manufacturer = Some(manufacturer);
        info.product_code = Some(product);
    }

    // Four 18-byte descriptor blocks
    for block in bytes[54..126].chunks_exact(18) {
        let pixel_clock = u16::from_le_bytes([block[0], block[1]]);
        if pixel_clock != 0 {
            // Detailed timing descriptor; the first one is the preferred mode
            if info.preferred.is_none() {
                let width = u32::from(block[2]) | (u32::from(block[4] >> 4) << 8);
                let height = u32::from(block[5]) | (u32::from(block[7] >> 4) << 8);
                if width != 0 && height != 0 {
                    info.preferred = Some((width, height));
                }
            }
        } else if block[3] == 0xFC && info.name.is_none() {
            // Display product name descriptor: up to 13 bytes, newline-terminated
            let raw = &block[5..18];
            let end = raw.iter().position(|&b| b == 0x0A).unwrap_or(raw.len());
            let name: String = raw[..end]
                .iter()
                .map(|&b| char::from(b))
                .collect::<String>()
                .trim()
                .to_string();
            if !name.is_empty() {
                info.name = Some(name);
            }
        }
    }
    info
}

/// One physical (or synthetic) monitor attached to a source
#[derive(Debug)]
pub struct Monitor {
    /// Positional id within the owning source
    pub id: u32,
    /// Output id, stable across rebuilds and used for store keys
    pub output_id: u32,
    /// Owning source; `None` only for the synthetic service-session monitor
    pub source: Option<Arc<Source>>,
    /// Monitor rectangle in virtual-desktop space
    pub rc_monitor: Rect,
    /// Work-area rectangle (monitor rect minus host-reserved areas)
    pub rc_work: Rect,
    /// True if another monitor covers the exact same rectangle
    pub is_clone: bool,
    /// EDID-derived metadata
    pub edid: EdidInfo,
    /// Opaque handle exposed to API callers
    pub handle: MonitorHandle,
}

impl Monitor {
    /// A monitor is active iff its source is attached and drives a real mode
    ///
    /// The synthetic monitor is always active; it exists precisely so that
    /// callers in a displayless session still see a plausible desktop.
    pub fn is_active(&self) -> bool {
        match &self.source {
            Some(source) => source.is_attached() && !source.current_mode().is_detached(),
            None => true,
        }
    }

    /// True if this monitor belongs to the primary source
    pub fn is_primary(&self) -> bool {
        self.source.as_ref().is_none_or(|s| s.is_primary())
    }

    /// Effective DPI of this monitor
    pub fn dpi(&self) -> u32 {
        self.source
            .as_ref()
            .map_or(crate::dpi::USER_DEFAULT_SCREEN_DPI, |s| s.dpi)
    }

    /// Scale ratio between this monitor's virtual and physical spaces
    pub fn virt_to_raw_ratio(&self) -> ScaleRatio {
        match &self.source {
            Some(source) => virt_to_raw_ratio(&source.physical_mode(), &source.current_mode()),
            None => ScaleRatio::ONE,
        }
    }

    /// Monitor rectangle in the physical (raw) coordinate space
    pub fn raw_rect(&self) -> Rect {
        let Some(source) = &self.source else {
            return self.rc_monitor;
        };
        let physical = source.physical_mode();
        let origin = self.rc_monitor.origin();
        Rect::from_origin_size(
            origin,
            i32::try_from(physical.width.unwrap_or(0)).unwrap_or(0),
            i32::try_from(physical.height.unwrap_or(0)).unwrap_or(0),
        )
    }

    pub(crate) fn save(&self, store: &RegistryStore, source_name: &str, edid_bytes: &[u8]) -> Result<()> {
        let key = format!("{MONITORS_KEY}\\{source_name}\\{:02}", self.id);
        store.set(&key, "Source", Value::Sz(source_name.to_string()))?;
        store.set(&key, "Output", Value::Dword(self.output_id))?;
        store.set(&key, "WorkArea", Value::Binary(rect_to_blob(&self.rc_work)))?;
        store.set(&key, "MonitorRect", Value::Binary(rect_to_blob(&self.rc_monitor)))?;
        store.set(&key, "Edid", Value::Binary(edid_bytes.to_vec()))?;
        Ok(())
    }

    pub(crate) fn load(
        store: &RegistryStore,
        source: &Arc<Source>,
        source_name: &str,
        id: u32,
    ) -> Result<Self> {
        let key = format!("{MONITORS_KEY}\\{source_name}\\{id:02}");
        let missing =
            |value: &str| WinDisplayError::StoreUnavailable(format!("{key} missing {value}"));
        let output_id = store.get_dword(&key, "Output").ok_or_else(|| missing("Output"))?;
        let work_blob = store
            .get_binary(&key, "WorkArea")
            .ok_or_else(|| missing("WorkArea"))?;
        let rc_work = rect_from_blob(&work_blob).ok_or_else(|| missing("WorkArea"))?;
        let edid = parse_edid(&store.get_binary(&key, "Edid").unwrap_or_default());

        // The monitor rectangle follows the source's current mode; the
        // persisted one only matters while the source is detached
        let current = source.current_mode();
        let rc_monitor = if current.is_detached() {
            Rect::default()
        } else {
            current.rect()
        };
        let rc_work = rc_work.intersect(&rc_monitor).unwrap_or(rc_monitor);

        Ok(Self {
            id,
            output_id,
            source: Some(Arc::clone(source)),
            rc_monitor,
            rc_work,
            is_clone: false,
            edid,
            handle: MonitorHandle::from_ids(source.id, id),
        })
    }
}

pub(crate) fn rect_to_blob(rect: &Rect) -> Vec<u8> {
    let mut blob = Vec::with_capacity(16);
    for edge in [rect.left, rect.top, rect.right, rect.bottom] {
        blob.extend_from_slice(&edge.to_le_bytes());
    }
    blob
}

pub(crate) fn rect_from_blob(blob: &[u8]) -> Option<Rect> {
    if blob.len() < 16 {
        return None;
    }
    let edge = |i: usize| i32::from_le_bytes(blob[i * 4..i * 4 + 4].try_into().unwrap_or_default());
    Some(Rect::new(edge(0), edge(1), edge(2), edge(3)))
}
