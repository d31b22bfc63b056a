//! Mode negotiation
//!
//! Turns a partial requested mode into a definite mode the source can
//! actually display. The core never coerces a request to a nearby mode:
//! either a supported entry is compatible with every field the caller
//! specified, or the request is rejected with `BadMode` and the calling
//! layer is free to retry with a relaxed request.

use crate::devmode::{DeviceMode, REFRESH_ANY};
use crate::error::{Result, WinDisplayError};

/// One entry in a source's supported-mode list
///
/// Entries flagged unsupported stay enumerable through raw enumeration but
/// are never negotiable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMode {
    /// The mode itself
    pub mode: DeviceMode,
    /// Excluded from negotiation and default enumeration
    pub unsupported: bool,
}

impl SourceMode {
    /// A plain supported entry
    pub const fn supported(mode: DeviceMode) -> Self {
        Self {
            mode,
            unsupported: false,
        }
    }
}

/// Options controlling negotiation
#[derive(Debug, Clone, Copy, Default)]
pub struct NegotiateOptions {
    /// Consider entries flagged unsupported (raw/unfiltered enumeration)
    pub include_unsupported: bool,
}

fn refresh_matches(requested: u32, candidate: u32) -> bool {
    // 0 and the documented sentinel 1 both mean "any rate"
    requested == 0 || requested == REFRESH_ANY || requested == candidate
}

fn is_compatible(request: &DeviceMode, candidate: &DeviceMode) -> bool {
    if let Some(bpp) = request.bits_per_pixel {
        if bpp != 0 && candidate.bits_per_pixel != Some(bpp) {
            return false;
        }
    }
    if let Some(width) = request.width {
        if candidate.width != Some(width) {
            return false;
        }
    }
    if let Some(height) = request.height {
        if candidate.height != Some(height) {
            return false;
        }
    }
    if let Some(refresh) = request.refresh {
        if !refresh_matches(refresh, candidate.refresh.unwrap_or(0)) {
            return false;
        }
    }
    if let Some(orientation) = request.orientation {
        if candidate.orientation.unwrap_or_default() != orientation {
            return false;
        }
    }
    // Interlace and fixed-output constrain the match only when the
    // candidate itself specifies a value
    if let (Some(requested), Some(supported)) = (request.interlaced, candidate.interlaced) {
        if requested != supported {
            return false;
        }
    }
    if let (Some(requested), Some(supported)) = (request.fixed_output, candidate.fixed_output) {
        if requested != supported {
            return false;
        }
    }
    true
}

/// Resolve a partial request against a source's supported-mode list
///
/// `registry_mode` is the persisted mode to restore when no explicit
/// request is given; `current_mode` supplies any missing size and position
/// fields. `supported` must be sorted under [`super::mode_compare`] so the
/// first compatible entry is the best one.
pub fn resolve_mode(
    requested: Option<&DeviceMode>,
    registry_mode: &DeviceMode,
    current_mode: &DeviceMode,
    supported: &[SourceMode],
    options: NegotiateOptions,
) -> Result<DeviceMode> {
    let mut request = *requested.unwrap_or(registry_mode);

    // The detached sentinel is always accepted verbatim, no matching needed
    if request.is_detached() {
        return Ok(request);
    }

    if !request.has_concrete_fields() {
        return Err(WinDisplayError::BadMode);
    }

    if request.width.is_none() {
        request.width = current_mode.width;
    }
    if request.height.is_none() {
        request.height = current_mode.height;
    }
    if request.position.is_none() {
        request.position = current_mode.position;
    }

    for entry in supported {
        if entry.unsupported && !options.include_unsupported {
            continue;
        }
        if is_compatible(&request, &entry.mode) {
            // Adopt the matched mode wholesale, but keep the caller's position
            let mut resolved = entry.mode;
            resolved.position = request.position;
            return Ok(resolved);
        }
    }
    Err(WinDisplayError::BadMode)
}
