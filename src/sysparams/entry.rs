//! Typed system-parameter entries
//!
//! Each parameter the `SystemParametersInfo` surface exposes is described
//! by a static [`ParamEntry`]: the store key and value it lives under plus
//! a tagged [`ParamKind`] carrying the default. One dispatch function per
//! kind replaces the per-entry function-pointer tables of classic
//! implementations while keeping the extensible table-of-typed-entries
//! structure.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Twips per logical inch (1/1440 inch units used by legacy metric values)
const TWIPS_PER_INCH: i32 = 1440;

/// Convert a possibly-twips metric to pixels
///
/// Negative stored values are twips; positive values are already pixels.
/// This matches the legacy convention for metric registry values.
pub fn metric_to_pixels(value: i32, dpi: u32) -> i32 {
    if value < 0 {
        let dpi = i64::from(dpi);
        let scaled = i64::from(-value) * dpi + i64::from(TWIPS_PER_INCH) / 2;
        i32::try_from(scaled / i64::from(TWIPS_PER_INCH)).unwrap_or(i32::MAX)
    } else {
        value
    }
}

/// An RGB color triple
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red component
    pub r: u8,
    /// Green component
    pub g: u8,
    /// Blue component
    pub b: u8,
}

impl Rgb {
    /// Create a color from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Render in the legacy "r g b" string form
    pub fn to_store_string(self) -> String {
        format!("{} {} {}", self.r, self.g, self.b)
    }

    /// Parse the legacy "r g b" string form
    pub fn from_store_string(s: &str) -> Option<Self> {
        let mut parts = s.split_whitespace().map(str::parse::<u8>);
        let r = parts.next()?.ok()?;
        let g = parts.next()?.ok()?;
        let b = parts.next()?.ok()?;
        Some(Self { r, g, b })
    }
}

/// A logical font description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFont {
    /// Character height; negative values select by character height
    pub height: i32,
    /// Font weight (400 = normal, 700 = bold)
    pub weight: u32,
    /// Italic flag
    pub italic: bool,
    /// Face name
    pub face: String,
}

impl LogFont {
    /// Serialize to the persisted binary layout
    pub fn to_blob(&self) -> Vec<u8> {
        let mut blob = Vec::with_capacity(9 + self.face.len() + 2);
        blob.extend_from_slice(&self.height.to_le_bytes());
        blob.extend_from_slice(&self.weight.to_le_bytes());
        blob.push(u8::from(self.italic));
        let face = self.face.as_bytes();
        blob.extend_from_slice(&u16::try_from(face.len()).unwrap_or(0).to_le_bytes());
        blob.extend_from_slice(face);
        blob
    }

    /// Deserialize from the persisted binary layout
    pub fn from_blob(blob: &[u8]) -> Option<Self> {
        if blob.len() < 11 {
            return None;
        }
        let height = i32::from_le_bytes(blob[0..4].try_into().ok()?);
        let weight = u32::from_le_bytes(blob[4..8].try_into().ok()?);
        let italic = blob[8] != 0;
        let len = usize::from(u16::from_le_bytes(blob[9..11].try_into().ok()?));
        let face = std::str::from_utf8(blob.get(11..11 + len)?).ok()?.to_string();
        Some(Self {
            height,
            weight,
            italic,
            face,
        })
    }
}

/// Static description of a default font
#[derive(Debug, Clone, Copy)]
pub struct FontSpec {
    /// Default character height at 96 DPI
    pub height: i32,
    /// Default weight
    pub weight: u32,
    /// Default face name
    pub face: &'static str,
}

impl FontSpec {
    /// Materialize the default font
    pub fn to_font(self) -> LogFont {
        LogFont {
            height: self.height,
            weight: self.weight,
            italic: false,
            face: self.face.to_string(),
        }
    }
}

/// The typed kind of a parameter entry, carrying its default
#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    /// Unsigned integer stored as a decimal string
    UInt(u32),
    /// Boolean stored as "1"/"0"
    Bool(bool),
    /// Boolean stored as "Yes"/"No"
    YesNo(bool),
    /// 32-bit value stored natively
    Dword(u32),
    /// Color stored as "r g b"
    Rgb(Rgb),
    /// Metric stored as a decimal string, negative values meaning twips;
    /// reads convert to pixels at the caller's DPI
    Twips(i32),
    /// Font stored as a binary blob
    Font(FontSpec),
    /// Opaque binary value
    Binary(&'static [u8]),
    /// A single bit inside the parent binary value of `parent_entry`
    PrefBit {
        /// Byte offset inside the parent value
        byte: usize,
        /// Bit mask inside that byte
        mask: u8,
    },
}

/// One row of the parameter table
#[derive(Debug, Clone, Copy)]
pub struct ParamEntry {
    /// Store key path
    pub key: &'static str,
    /// Value name under the key
    pub name: &'static str,
    /// Typed kind with default
    pub kind: ParamKind,
}

/// A runtime parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Unsigned integer (also carries pixel results of metric reads)
    UInt(u32),
    /// Boolean
    Bool(bool),
    /// Color
    Rgb(Rgb),
    /// Font
    Font(LogFont),
    /// Opaque bytes
    Binary(Vec<u8>),
    /// Rectangle (only produced by derived parameters such as the work area)
    Rect(Rect),
}

impl ParamValue {
    /// Unsigned content, if any
    pub fn as_uint(&self) -> Option<u32> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Bool(b) => Some(u32::from(*b)),
            _ => None,
        }
    }

    /// Boolean content, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::UInt(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Rectangle content, if any
    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Self::Rect(r) => Some(*r),
            _ => None,
        }
    }
}
