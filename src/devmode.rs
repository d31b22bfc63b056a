//! Display device modes with explicit field presence
//!
//! A device mode is a value type describing one way a source can be driven:
//! resolution, color depth, refresh rate, orientation, scan/scaling flags
//! and desktop position. Each field is optional; a field that was never
//! requested or reported must not be read as zero, so presence is a
//! type-level question (`Option<T>`) rather than a manual bitmask check.
//!
//! At the persistence boundary modes are stored bit-compatibly with the
//! external `DEVMODE` structure's `dmFields`-onward tail, written and read
//! verbatim as a 116-byte little-endian range.

use crate::error::{Result, WinDisplayError};
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Refresh-rate sentinel meaning "any rate" in a mode request
pub const REFRESH_ANY: u32 = 1;

/// Size in bytes of the persisted `DEVMODE` tail (`dmFields` onward)
pub const DEVMODE_TAIL_LEN: usize = 116;

// DEVMODE dmFields bits for the display-relevant members
const DM_POSITION: u32 = 0x0000_0020;
const DM_DISPLAYORIENTATION: u32 = 0x0000_0080;
const DM_BITSPERPEL: u32 = 0x0004_0000;
const DM_PELSWIDTH: u32 = 0x0008_0000;
const DM_PELSHEIGHT: u32 = 0x0010_0000;
const DM_DISPLAYFLAGS: u32 = 0x0020_0000;
const DM_DISPLAYFREQUENCY: u32 = 0x0040_0000;
const DM_DISPLAYFIXEDOUTPUT: u32 = 0x2000_0000;

// dmDisplayFlags bits
const DMDF_INTERLACED: u32 = 0x0000_0002;

/// Display orientation in 90-degree steps
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Orientation {
    /// Natural orientation
    #[default]
    Default,
    /// Rotated 90 degrees
    Rotate90,
    /// Rotated 180 degrees
    Rotate180,
    /// Rotated 270 degrees
    Rotate270,
}

impl Orientation {
    /// Raw `DMDO_*` value
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::Rotate90 => 1,
            Self::Rotate180 => 2,
            Self::Rotate270 => 3,
        }
    }

    /// Decode a raw `DMDO_*` value
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Default),
            1 => Some(Self::Rotate90),
            2 => Some(Self::Rotate180),
            3 => Some(Self::Rotate270),
            _ => None,
        }
    }

    /// True if width and height are swapped relative to the natural orientation
    pub const fn is_rotated(self) -> bool {
        matches!(self, Self::Rotate90 | Self::Rotate270)
    }
}

/// How a mode smaller than the panel's native resolution is presented
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FixedOutput {
    /// Driver default
    #[default]
    Default,
    /// Stretch to fill the panel
    Stretch,
    /// Center with borders
    Center,
}

impl FixedOutput {
    /// Raw `DMDFO_*` value
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Default => 0,
            Self::Stretch => 1,
            Self::Center => 2,
        }
    }

    /// Decode a raw `DMDFO_*` value
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Default),
            1 => Some(Self::Stretch),
            2 => Some(Self::Center),
            _ => None,
        }
    }
}

/// One way a source can be driven
///
/// The detached sentinel (position present, width and height present and
/// both zero) signals "this source drives no physical output".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMode {
    /// Horizontal resolution in pixels
    pub width: Option<u32>,
    /// Vertical resolution in pixels
    pub height: Option<u32>,
    /// Color depth in bits per pixel
    pub bits_per_pixel: Option<u32>,
    /// Vertical refresh rate in Hz; [`REFRESH_ANY`] in a request matches any rate
    pub refresh: Option<u32>,
    /// Display orientation
    pub orientation: Option<Orientation>,
    /// Interlaced scan
    pub interlaced: Option<bool>,
    /// Fixed-output (stretch/center) behavior
    pub fixed_output: Option<FixedOutput>,
    /// Position of the top-left corner in virtual-desktop space
    pub position: Option<Point>,
}

impl DeviceMode {
    /// Build a fully specified active mode, the common case for host-reported
    /// mode lists
    pub fn active(width: u32, height: u32, bits_per_pixel: u32, refresh: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            bits_per_pixel: Some(bits_per_pixel),
            refresh: Some(refresh),
            orientation: Some(Orientation::Default),
            ..Self::default()
        }
    }

    /// The detached-mode sentinel at the given position
    pub fn detached(position: Point) -> Self {
        Self {
            width: Some(0),
            height: Some(0),
            position: Some(position),
            ..Self::default()
        }
    }

    /// True if this is the detached-mode sentinel
    pub fn is_detached(&self) -> bool {
        self.position.is_some() && self.width == Some(0) && self.height == Some(0)
    }

    /// Width and height normalized to landscape
    ///
    /// Rotated orientations report swapped dimensions; normalizing makes the
    /// pair comparable across orientations when sorting mode lists.
    pub fn landscape_size(&self) -> (u32, u32) {
        let w = self.width.unwrap_or(0);
        let h = self.height.unwrap_or(0);
        if self.orientation.unwrap_or_default().is_rotated() {
            (h, w)
        } else {
            (w, h)
        }
    }

    /// Rectangle covered by this mode in virtual-desktop space
    ///
    /// Missing position or size fields contribute zero, so a detached mode
    /// yields an empty rectangle.
    pub fn rect(&self) -> Rect {
        let pos = self.position.unwrap_or_default();
        let w = i32::try_from(self.width.unwrap_or(0)).unwrap_or(i32::MAX);
        let h = i32::try_from(self.height.unwrap_or(0)).unwrap_or(i32::MAX);
        Rect::from_origin_size(pos, w, h)
    }

    /// True if any of the matchable fields carries a concrete request
    pub fn has_concrete_fields(&self) -> bool {
        self.width.is_some()
            || self.height.is_some()
            || self.bits_per_pixel.is_some()
            || self.refresh.is_some()
    }

    /// Serialize to the `DEVMODE` `dmFields`-onward tail
    ///
    /// Members without a presence bit are written as zero, matching how the
    /// external structure is initialized before use.
    pub fn to_tail(&self) -> [u8; DEVMODE_TAIL_LEN] {
        let mut buf = [0u8; DEVMODE_TAIL_LEN];
        let mut fields = 0u32;

        if let Some(pos) = self.position {
            fields |= DM_POSITION;
            buf[4..8].copy_from_slice(&pos.x.to_le_bytes());
            buf[8..12].copy_from_slice(&pos.y.to_le_bytes());
        }
        if let Some(orientation) = self.orientation {
            fields |= DM_DISPLAYORIENTATION;
            buf[12..16].copy_from_slice(&orientation.as_raw().to_le_bytes());
        }
        if let Some(fixed) = self.fixed_output {
            fields |= DM_DISPLAYFIXEDOUTPUT;
            buf[16..20].copy_from_slice(&fixed.as_raw().to_le_bytes());
        }
        // bytes 20..94: printer-only members (dmColor..dmLogPixels), left zero
        if let Some(bpp) = self.bits_per_pixel {
            fields |= DM_BITSPERPEL;
            buf[96..100].copy_from_slice(&bpp.to_le_bytes());
        }
        if let Some(width) = self.width {
            fields |= DM_PELSWIDTH;
            buf[100..104].copy_from_slice(&width.to_le_bytes());
        }
        if let Some(height) = self.height {
            fields |= DM_PELSHEIGHT;
            buf[104..108].copy_from_slice(&height.to_le_bytes());
        }
        if let Some(interlaced) = self.interlaced {
            fields |= DM_DISPLAYFLAGS;
            let flags = if interlaced { DMDF_INTERLACED } else { 0 };
            buf[108..112].copy_from_slice(&flags.to_le_bytes());
        }
        if let Some(refresh) = self.refresh {
            fields |= DM_DISPLAYFREQUENCY;
            buf[112..116].copy_from_slice(&refresh.to_le_bytes());
        }
        buf[0..4].copy_from_slice(&fields.to_le_bytes());
        buf
    }

    /// Deserialize from a `DEVMODE` `dmFields`-onward tail
    ///
    /// A blob shorter than the required tail is malformed and reported as
    /// [`WinDisplayError::BadMode`], matching how undersized structure
    /// claims are rejected at the API boundary.
    pub fn from_tail(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < DEVMODE_TAIL_LEN {
            return Err(WinDisplayError::BadMode);
        }
        let dword = |off: usize| u32::from_le_bytes(bytes[off..off + 4].try_into().unwrap_or([0; 4]));
        let long = |off: usize| i32::from_le_bytes(bytes[off..off + 4].try_into().unwrap_or([0; 4]));
        let fields = dword(0);

        let mut mode = Self::default();
        if fields & DM_POSITION != 0 {
            mode.position = Some(Point::new(long(4), long(8)));
        }
        if fields & DM_DISPLAYORIENTATION != 0 {
            mode.orientation = Some(Orientation::from_raw(dword(12)).ok_or(WinDisplayError::BadMode)?);
        }
        if fields & DM_DISPLAYFIXEDOUTPUT != 0 {
            mode.fixed_output = Some(FixedOutput::from_raw(dword(16)).ok_or(WinDisplayError::BadMode)?);
        }
        if fields & DM_BITSPERPEL != 0 {
            mode.bits_per_pixel = Some(dword(96));
        }
        if fields & DM_PELSWIDTH != 0 {
            mode.width = Some(dword(100));
        }
        if fields & DM_PELSHEIGHT != 0 {
            mode.height = Some(dword(104));
        }
        if fields & DM_DISPLAYFLAGS != 0 {
            mode.interlaced = Some(dword(108) & DMDF_INTERLACED != 0);
        }
        if fields & DM_DISPLAYFREQUENCY != 0 {
            mode.refresh = Some(dword(112));
        }
        Ok(mode)
    }
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_detached() {
            return write!(f, "detached");
        }
        write!(
            f,
            "{}x{}",
            self.width.unwrap_or(0),
            self.height.unwrap_or(0)
        )?;
        if let Some(bpp) = self.bits_per_pixel {
            write!(f, "x{bpp}")?;
        }
        if let Some(refresh) = self.refresh {
            write!(f, " @{refresh}Hz")?;
        }
        if let Some(pos) = self.position {
            write!(f, " at ({},{})", pos.x, pos.y)?;
        }
        Ok(())
    }
}
